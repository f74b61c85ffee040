use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("The mode parameter must be either 'bibtex' or 'csv', got {0:?}.")]
    Mode(String),

    #[error("Result block {0:?} has no submission metadata paragraph.")]
    MissingSubmission(String),

    #[error("Couldn't parse submission date {text:?}: {source}")]
    SubmissionDate {
        text: String,
        source: chrono::ParseError,
    },

    #[error("Result block {0:?} has no detail-page link.")]
    MissingDetailLink(String),

    #[error("No response from {url} after {attempts} attempts.")]
    RetriesExhausted { url: String, attempts: usize },

    #[error("Invalid search URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
