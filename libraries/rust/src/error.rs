use polars::prelude::PolarsError;
use reqwest::Error as ReqwestError;
use serde_json::Error as SerdeError;
use thiserror::Error as ThisError;
use url::ParseError as UrlError;

/// The one failure kind surfaced by every request function.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("An error occurred: HTTP Error. Code: {status}. Reason: {reason}\n{body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },
    #[error("An error occurred: Request error: {0}")]
    Request(#[from] ReqwestError),
    #[error("An error occurred: JSON error: {0}")]
    Serde(#[from] SerdeError),
    #[error("An error occurred: URL error: {0}")]
    Url(#[from] UrlError),
    #[error("An error occurred: Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("An error occurred: {0}")]
    Other(String),
}
