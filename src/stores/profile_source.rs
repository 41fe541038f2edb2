//! Profile data sources
//!
//! Everything above this module only sees the [`ProfileSource`] trait, so the
//! demo stub and a real HTTP backend are interchangeable.

use async_trait::async_trait;
use futures::future::{select, Either};
use std::cell::Cell;
use std::time::Duration;

use crate::stores::errors::FetchError;
use crate::stores::profiles::Profile;
use crate::utils::time;

/// Delay the stub waits before answering
pub const STUB_DELAY: Duration = Duration::from_millis(2000);

/// Default request timeout for the HTTP source
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Where profiles come from
#[async_trait(?Send)]
pub trait ProfileSource {
    async fn fetch_profile(&self) -> Result<Profile, FetchError>;
}

/// Stand-in backend: waits a fixed delay and returns the demo profile
pub struct StubProfileSource {
    delay: Duration,
    calls: Cell<u32>,
}

impl StubProfileSource {
    pub fn new() -> Self {
        Self::with_delay(STUB_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            calls: Cell::new(0),
        }
    }

    /// Number of times `fetch_profile` has been invoked
    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl Default for StubProfileSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl ProfileSource for StubProfileSource {
    async fn fetch_profile(&self) -> Result<Profile, FetchError> {
        self.calls.set(self.calls.get() + 1);
        log::debug!("Stub profile fetch #{} ({:?} delay)", self.calls.get(), self.delay);

        time::sleep(self.delay).await;
        Ok(Profile::demo())
    }
}

/// Fetches a JSON-encoded [`Profile`] from an HTTP endpoint
#[allow(dead_code)]
pub struct HttpProfileSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[allow(dead_code)]
impl HttpProfileSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout: HTTP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait(?Send)]
impl ProfileSource for HttpProfileSource {
    async fn fetch_profile(&self) -> Result<Profile, FetchError> {
        log::info!("Fetching profile from {}", self.url);

        let request = async {
            let response = self
                .client
                .get(&self.url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(map_request_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Network(format!("HTTP {}", status)));
            }

            let body = response.text().await.map_err(map_request_error)?;
            decode_profile(&body)
        };

        // Browser fetch has no client-side timeout, so race a timer on every target
        let timer = time::sleep(self.timeout);
        match select(Box::pin(request), Box::pin(timer)).await {
            Either::Left((result, _)) => result.map_err(|e| {
                log::warn!("Profile fetch from {} failed: {}", self.url, e);
                e
            }),
            Either::Right(_) => {
                log::warn!("Profile fetch from {} timed out after {:?}", self.url, self.timeout);
                Err(FetchError::Timeout)
            }
        }
    }
}

fn map_request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_decode() {
        FetchError::Decode(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Parse a response body into a profile
pub fn decode_profile(body: &str) -> Result<Profile, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}
