//! Error types of the calendar pipeline.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors which abort a whole request.
#[derive(Error, Debug)]
pub enum Error {
    #[error("fetching the upstream calendar failed: {0}")]
    Fetch(#[from] FetchError),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Fetch(FetchError::from(error))
    }
}

/// The upstream feed could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("upstream responded with status {0}")]
    Status(StatusCode),

    /// The wrapped error never carries the request URL, it contains the auth token.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => Self::Status(status),
            None => Self::Transport(error.without_url()),
        }
    }
}

/// A date or date-time token could not be decoded.
///
/// The parser contains these per event, they never abort a feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed date token {token:?}")]
    Malformed { token: String },

    #[error("date token {token:?} is out of range")]
    OutOfRange { token: String },
}

/// The configured upstream URL is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid feed URL: {reason}")]
pub struct InvalidFeedUrl {
    pub reason: String,
}

pub type Result<T> = std::result::Result<T, Error>;
