//! Fetch error type
//!
//! Failures a profile source can report. The demo stub never produces one,
//! but the cache, the view composer and the HTTP source all carry it.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request could not be sent or the server answered with a failure status
    Network(String),
    /// The source did not answer in time
    Timeout,
    /// The response body was not a valid profile
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Decode(msg) => write!(f, "Invalid profile data: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}
