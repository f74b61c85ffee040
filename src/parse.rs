use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::record::{month_abbr, Record};
use crate::{Error, Result, ARXIV_DOI_PREFIX, DEFAULT_ENTRY_TYPE};

const SUBMITTED_KEYWORD: &str = "Submitted";
const ANNOUNCED_LABEL: &str = "originally announced";
/// Trailing "show less" toggle the site appends to the full abstract.
const ABSTRACT_SUFFIX: &str = "△ Less";
const DATE_FORMAT: &str = "%d %B, %Y";

/// Attempts to parse the page, extracting all `li.arxiv-result` blocks.
/// Returns an empty `Vec` for a page without result blocks, which is the
/// signal for pagination to stop.
pub(crate) fn parse_page(html: &str) -> Result<Vec<Record>> {
    let doc = Html::parse_document(html);
    let selectors = Selectors::new()?;

    let mut records = Vec::new();
    for (i, block) in doc.select(&selectors.result).enumerate() {
        let record = parse_result_block(block, &selectors)?;
        debug!(
            n = i + 1,
            title = record.title.as_deref().unwrap_or(""),
            "parsed result block"
        );
        records.push(record);
    }
    Ok(records)
}

/// Extracts one [`Record`] from a result block.
///
/// Title, abstract, note and PDF link may be absent; the submission date and
/// the detail-page link are required since the citation key, year, month and
/// DOI derive from them.
fn parse_result_block(block: ElementRef<'_>, selectors: &Selectors) -> Result<Record> {
    let title = extract_text(block, &selectors.title);

    let authors = block
        .select(&selectors.author_links)
        .map(|a| reorder_name(&a.text().collect::<String>()))
        .collect::<Vec<_>>()
        .join(" AND ");

    let r#abstract = extract_text(block, &selectors.abstract_full)
        .map(|text| strip_abstract_suffix(&text).to_string());

    let note = extract_text(block, &selectors.comments).unwrap_or_default();

    let (date, _announced) = find_submission(block, &selectors.paragraph)?
        .ok_or_else(|| Error::MissingSubmission(title.clone().unwrap_or_default()))?;

    // Citation key: first author's surname + submission year. An empty author
    // list degenerates to the bare year.
    let surname = authors.split(',').next().unwrap_or_default();
    let id = format!("{surname}{}", date.year());

    let link = block
        .select(&selectors.detail_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| Error::MissingDetailLink(title.clone().unwrap_or_default()))?;
    let arxiv_id = link.rsplit('/').next().unwrap_or_default();
    let doi = format!("{ARXIV_DOI_PREFIX}/arXiv.{arxiv_id}");

    let pdf = block
        .select(&selectors.pdf_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .to_string();

    Ok(Record {
        title,
        authors,
        r#abstract,
        note,
        year: date.year(),
        month: month_abbr(date.month()),
        doi,
        pdf,
        entry_type: DEFAULT_ENTRY_TYPE,
        id,
    })
}

/// Returns the trimmed text of the first element matching `selector` under
/// `block`, or `None` if nothing matches.
fn extract_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

/// Locates the submission paragraph and splits it into the submission date
/// and the "originally announced" annotation.
///
/// Returns `Ok(None)` when no paragraph starts with the keyword. A matched
/// paragraph whose date does not parse is an error: without the date neither
/// the citation key nor the year can be built.
fn find_submission(
    block: ElementRef<'_>,
    paragraph: &Selector,
) -> Result<Option<(NaiveDate, String)>> {
    for p in block.select(paragraph) {
        let text = p.text().collect::<String>();
        let text = text.trim();
        if !text.starts_with(SUBMITTED_KEYWORD) {
            continue;
        }

        let first = text.split(';').next().unwrap_or_default().trim();
        let last = text.rsplit(';').next().unwrap_or_default().trim();

        let date_text = first.strip_prefix(SUBMITTED_KEYWORD).unwrap_or(first).trim();
        let annotation = last.strip_prefix(ANNOUNCED_LABEL).unwrap_or(last).trim();

        let date = NaiveDate::parse_from_str(date_text, DATE_FORMAT).map_err(|source| {
            Error::SubmissionDate {
                text: date_text.to_string(),
                source,
            }
        })?;
        return Ok(Some((date, annotation.to_string())));
    }
    Ok(None)
}

/// Reorders `"First Middle Last"` to `"Last, Middle, First"`.
fn reorder_name(name: &str) -> String {
    let mut parts: Vec<&str> = name.split_whitespace().collect();
    parts.reverse();
    parts.join(", ")
}

fn strip_abstract_suffix(text: &str) -> &str {
    text.strip_suffix(ABSTRACT_SUFFIX).unwrap_or(text).trim_end()
}

/// The fixed selector set for one listing page.
struct Selectors {
    result: Selector,
    title: Selector,
    author_links: Selector,
    abstract_full: Selector,
    comments: Selector,
    detail_link: Selector,
    pdf_link: Selector,
    paragraph: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            result: create_selector("li.arxiv-result")?,
            title: create_selector("p.title")?,
            author_links: create_selector("p.authors > a")?,
            abstract_full: create_selector("span.abstract-full")?,
            comments: create_selector("p.comments > span:nth-of-type(2)")?,
            detail_link: create_selector("p.list-title > a")?,
            pdf_link: create_selector(r#"p.list-title > span > a[href*="pdf"]"#)?,
            paragraph: create_selector("p")?,
        })
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::Selector(sel_str.into()))
}
