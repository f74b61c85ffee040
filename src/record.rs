/// Three-letter lowercase month names indexed by calendar month; index 0 is
/// unused so `chrono`'s 1-based months can index directly.
pub(crate) const MONTH_ABBR: [&str; 13] = [
    "", "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// One bibliographic entry scraped from a result block.
///
/// `id` is the first author's surname concatenated with the submission year.
/// It doubles as the BibTeX citation key and is not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: Option<String>,
    /// `"Last, First"` names joined with `" AND "`.
    pub authors: String,
    pub r#abstract: Option<String>,
    /// Secondary comment text, empty if the listing carries none.
    pub note: String,
    pub year: i32,
    /// Lowercase three-letter abbreviation of the submission month.
    pub month: &'static str,
    pub doi: String,
    /// Direct PDF link, possibly empty.
    pub pdf: String,
    pub entry_type: &'static str,
    pub id: String,
}

impl Record {
    /// The `howpublished` value: the PDF link wrapped in a `\url{}` macro.
    pub fn howpublished(&self) -> String {
        format!("\\url{{{}}}", self.pdf)
    }
}

pub(crate) fn month_abbr(month: u32) -> &'static str {
    MONTH_ABBR[month as usize]
}
