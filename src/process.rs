use std::str::FromStr;
use std::time::Duration;

use chrono::Local;
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::parse::parse_page;
use crate::{request, serialize};
use crate::{Error, Record, Result, MAX_ATTEMPTS, PAGE_SIZE, REQUEST_TIMEOUT_SECS, USER_AGENT};

/// Output file format. Anything but the two recognized names is rejected
/// before any network activity happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Bibtex,
    Csv,
}

impl OutputMode {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            OutputMode::Bibtex => "bib",
            OutputMode::Csv => "csv",
        }
    }
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bibtex" => Ok(OutputMode::Bibtex),
            "csv" => Ok(OutputMode::Csv),
            other => Err(Error::Mode(other.to_string())),
        }
    }
}

/// Walks a search-results listing page by page and owns the records
/// accumulated along the way.
///
/// One HTTP client is built at construction and reused for every request of
/// the run. Each page is fetched, parsed and appended to the corpus, and the
/// whole corpus is rewritten to disk, before the next page is requested.
pub struct Collector {
    client: Client,
    mode: OutputMode,
    title: String,
    page_size: usize,
    records: Vec<Record>,
}

impl Collector {
    /// Creates a collector for the given output mode. The output title
    /// defaults to the current local time.
    pub fn new(mode: OutputMode) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            mode,
            title: Local::now().format("%Y-%m-%d_%H:%M:%S").to_string(),
            page_size: PAGE_SIZE,
            records: Vec::new(),
        })
    }

    /// Sets the output file title (`{title}.bib` / `{title}.csv`).
    /// Must be called before [`run`](Self::run).
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Overrides the number of results expected per page. Must match the
    /// `size` parameter of the search URL and be set before
    /// [`run`](Self::run).
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
    }

    /// The records accumulated by the last [`run`](Self::run).
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Scrapes every page of `url`, advancing the `start` offset by the page
    /// size until a page yields fewer records than the page size.
    ///
    /// The corpus is rewritten to the output file after every page. A page
    /// that stays unanswered after all retries fails the run with
    /// [`Error::RetriesExhausted`]; whatever was serialized before the
    /// failure remains on disk.
    pub async fn run(&mut self, url: &str) -> Result<()> {
        self.records.clear();

        let mut page = 0;
        loop {
            let page_url = page_url(url, page * self.page_size)?;
            let Some(html) = request::send(&self.client, page_url.as_str()).await else {
                return Err(Error::RetriesExhausted {
                    url: page_url.into(),
                    attempts: MAX_ATTEMPTS,
                });
            };

            let results = parse_page(&html)?;
            let count = results.len();
            self.records.extend(results);
            info!(
                "Scraped abstracts {} - {}",
                page * self.page_size,
                self.records.len()
            );

            serialize::write(&self.records, self.mode, &self.title).await?;

            page += 1;
            if count < self.page_size {
                break;
            }
        }
        Ok(())
    }
}

/// Rebuilds the search URL for one page: `start` is replaced with the given
/// offset and an empty `advanced` marker is prepended when missing, which the
/// advanced-search endpoint requires. All other parameters pass through.
fn page_url(url: &str, offset: usize) -> Result<Url> {
    let mut parsed = Url::parse(url)?;

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "start")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    params.push(("start".to_string(), offset.to_string()));
    if !params.iter().any(|(key, _)| key == "advanced") {
        params.insert(0, ("advanced".to_string(), String::new()));
    }

    parsed.query_pairs_mut().clear().extend_pairs(params);
    Ok(parsed)
}
