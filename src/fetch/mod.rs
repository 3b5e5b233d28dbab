//! Page-fetch layer shared by the resolver, dictionary and download modules.
//!
//! Every network call in the crate goes through a [`PageFetcher`], which is
//! constructed once by the caller and passed in explicitly. Production code
//! uses [`HttpFetcher`]; tests substitute scripted fetchers.
//!
//! # Example
//!
//! ```no_run
//! use datos_core::fetch::{FetchOptions, HttpFetcher, PageFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::new()?;
//! let response = fetcher
//!     .fetch("https://datosabiertos.gob.pe/dataset/example", &FetchOptions::default())
//!     .await?;
//! println!("status {} ({} bytes)", response.status, response.body.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

pub use client::HttpFetcher;
pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::FetchError;

/// Per-request options threaded through to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Extra request headers as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Verify TLS certificates.
    pub verify_ssl: bool,
    /// Whole-request timeout; `None` uses the client default.
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            verify_ssl: true,
            timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

impl FetchOptions {
    /// Returns a copy with the given timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns a copy with TLS verification toggled.
    #[must_use]
    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    /// Returns a copy with an extra header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A completed response: status plus the full body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Bytes,
}

impl FetchResponse {
    /// Creates a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Result of a metadata-only (HEAD) probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    /// HTTP status code.
    pub status: u16,
    /// Declared `Content-Length`, when the server sent one.
    pub content_length: Option<u64>,
}

/// Transport collaborator: retrieves bytes for a URL.
///
/// Implementations must not panic on transport problems; every failure comes
/// back as a [`FetchError`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a GET request and returns the full response.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, FetchError>;

    /// Issues a HEAD request and returns the declared size.
    async fn probe(&self, url: &str, options: &FetchOptions) -> Result<ProbeResult, FetchError>;
}
