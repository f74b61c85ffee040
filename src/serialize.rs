use tokio::{fs::File, io::AsyncWriteExt};

use crate::process::OutputMode;
use crate::record::Record;
use crate::Result;

/// Column order of the CSV output; also the field order of BibTeX entries
/// (where `ENTRYTYPE` and `ID` form the entry head instead).
const FIELDS: [&str; 10] = [
    "title",
    "author",
    "abstract",
    "note",
    "year",
    "month",
    "doi",
    "howpublished",
    "ENTRYTYPE",
    "ID",
];

/// Writes the whole corpus to `{title}.bib` or `{title}.csv`, replacing any
/// previous contents. Called once per scraped page, so the file on disk
/// always reflects everything collected so far.
pub(crate) async fn write(records: &[Record], mode: OutputMode, title: &str) -> Result<()> {
    let contents = match mode {
        OutputMode::Bibtex => to_bibtex(records),
        OutputMode::Csv => to_csv(records),
    };
    let mut file = File::create(format!("{title}.{}", mode.extension())).await?;
    file.write_all(contents.as_bytes()).await?;
    Ok(())
}

fn to_bibtex(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&format!("@{}{{{},\n", record.entry_type, record.id));
        push_field(&mut out, "title", record.title.as_deref().unwrap_or_default());
        push_field(&mut out, "author", &record.authors);
        push_field(
            &mut out,
            "abstract",
            record.r#abstract.as_deref().unwrap_or_default(),
        );
        push_field(&mut out, "note", &record.note);
        push_field(&mut out, "year", &record.year.to_string());
        push_field(&mut out, "month", record.month);
        push_field(&mut out, "doi", &record.doi);
        push_field(&mut out, "howpublished", &record.howpublished());
        out.push_str("}\n\n");
    }
    out
}

fn push_field(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("  {name} = {{{value}}},\n"));
}

fn to_csv(records: &[Record]) -> String {
    let mut out = String::new();
    out.push_str(&FIELDS.join(","));
    out.push('\n');
    for record in records {
        let row = [
            csv_escape(record.title.as_deref().unwrap_or_default()),
            csv_escape(&record.authors),
            csv_escape(record.r#abstract.as_deref().unwrap_or_default()),
            csv_escape(&record.note),
            record.year.to_string(),
            record.month.to_string(),
            csv_escape(&record.doi),
            csv_escape(&record.howpublished()),
            record.entry_type.to_string(),
            csv_escape(&record.id),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Quotes a value when it contains a comma, a quote, or a line break.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<Record> {
        vec![
            Record {
                title: Some("Stochastic Parrots Revisited".into()),
                authors: "Doe, Jane AND Smith, John".into(),
                r#abstract: Some("We revisit stochastic parrots at scale.".into()),
                note: "12 pages, 3 figures".into(),
                year: 2023,
                month: "mar",
                doi: "https://doi.org/10.48550/arXiv.2301.01234".into(),
                pdf: "https://arxiv.org/pdf/2301.01234".into(),
                entry_type: "ARTICLE",
                id: "Doe2023".into(),
            },
            Record {
                title: None,
                authors: "Lovelace, Ada".into(),
                r#abstract: None,
                note: String::new(),
                year: 2022,
                month: "dec",
                doi: "https://doi.org/10.48550/arXiv.2212.00001".into(),
                pdf: String::new(),
                entry_type: "ARTICLE",
                id: "Lovelace2022".into(),
            },
        ]
    }

    /// Pulls `(title, author, year, doi)` back out of the BibTeX text.
    fn reparse_bibtex(bib: &str) -> Vec<(String, String, String, String)> {
        let field = |entry: &str, name: &str| {
            entry
                .lines()
                .find_map(|line| {
                    line.trim()
                        .strip_prefix(&format!("{name} = {{"))
                        .and_then(|rest| rest.strip_suffix("},"))
                })
                .unwrap_or_default()
                .to_string()
        };
        bib.split("@ARTICLE{")
            .skip(1)
            .map(|entry| {
                (
                    field(entry, "title"),
                    field(entry, "author"),
                    field(entry, "year"),
                    field(entry, "doi"),
                )
            })
            .collect()
    }

    /// Minimal RFC-4180 row splitter for checking our own output.
    fn split_csv_row(row: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut chars = row.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn bibtex_entries_are_keyed_by_type_and_id() {
        let bib = to_bibtex(&sample_records());
        assert!(bib.starts_with("@ARTICLE{Doe2023,\n"));
        assert!(bib.contains("@ARTICLE{Lovelace2022,\n"));
        assert!(bib.contains("  howpublished = {\\url{https://arxiv.org/pdf/2301.01234}},\n"));
        assert!(bib.contains("  month = {mar},\n"));
    }

    #[test]
    fn absent_fields_serialize_as_empty_values() {
        let bib = to_bibtex(&sample_records());
        let lovelace = bib.split("@ARTICLE{Lovelace2022,").nth(1).unwrap();
        assert!(lovelace.contains("  title = {},\n"));
        assert!(lovelace.contains("  abstract = {},\n"));
        assert!(lovelace.contains("  howpublished = {\\url{}},\n"));
    }

    #[test]
    fn csv_has_a_header_and_one_row_per_record() {
        let csv = to_csv(&sample_records());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("title,author,abstract,note,year,month,doi,howpublished,ENTRYTYPE,ID")
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn csv_quotes_values_containing_commas() {
        let csv = to_csv(&sample_records());
        let row = csv.lines().nth(1).unwrap();
        let fields = split_csv_row(row);
        assert_eq!(fields[1], "Doe, Jane AND Smith, John");
        assert_eq!(fields[3], "12 pages, 3 figures");
        assert_eq!(fields[8], "ARTICLE");
        assert_eq!(fields[9], "Doe2023");
    }

    #[test]
    fn both_modes_round_trip_the_core_tuple() {
        let records = sample_records();
        let expected: Vec<_> = records
            .iter()
            .map(|r| {
                (
                    r.title.clone().unwrap_or_default(),
                    r.authors.clone(),
                    r.year.to_string(),
                    r.doi.clone(),
                )
            })
            .collect();

        assert_eq!(reparse_bibtex(&to_bibtex(&records)), expected);

        let csv = to_csv(&records);
        let from_csv: Vec<_> = csv
            .lines()
            .skip(1)
            .map(|row| {
                let fields = split_csv_row(row);
                (
                    fields[0].clone(),
                    fields[1].clone(),
                    fields[4].clone(),
                    fields[6].clone(),
                )
            })
            .collect();
        assert_eq!(from_csv, expected);
    }

    #[tokio::test]
    async fn rewrites_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let title = dir.path().join("out").display().to_string();
        let records = sample_records();

        write(&records, OutputMode::Bibtex, &title).await.unwrap();
        let first = std::fs::read(dir.path().join("out.bib")).unwrap();
        write(&records, OutputMode::Bibtex, &title).await.unwrap();
        let second = std::fs::read(dir.path().join("out.bib")).unwrap();
        assert_eq!(first, second);

        write(&records, OutputMode::Csv, &title).await.unwrap();
        let first = std::fs::read(dir.path().join("out.csv")).unwrap();
        write(&records, OutputMode::Csv, &title).await.unwrap();
        let second = std::fs::read(dir.path().join("out.csv")).unwrap();
        assert_eq!(first, second);
    }
}
