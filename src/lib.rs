//! Scrapes arXiv advanced-search result listings into a growing set of
//! bibliographic records and writes them out as BibTeX or CSV.
//!
//! Pages are fetched, parsed and persisted strictly one after another; the
//! output files are fully rewritten after every page so a partial harvest
//! survives an aborted run.

mod error;
mod parse;
mod process;
mod record;
mod request;
mod serialize;

pub use error::{Error, Result};
pub use process::{Collector, OutputMode};
pub use record::Record;

/// Default number of result blocks per page. Must match the `size` parameter
/// baked into the search URL, otherwise pagination terminates early.
const PAGE_SIZE: usize = 50;
/// Total request attempts before a page is given up on.
const MAX_ATTEMPTS: usize = 3;
const REQUEST_TIMEOUT_SECS: u64 = 15;
const ARXIV_DOI_PREFIX: &str = "https://doi.org/10.48550";
const DEFAULT_ENTRY_TYPE: &str = "ARTICLE";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64)AppleWebKit/537.36 (KHTML, like Gecko) Chrome/106.0.0.0 Safari/537.36";
