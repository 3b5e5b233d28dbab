//! Error types for the download module.
//!
//! A [`DownloadError`] never escapes [`super::Downloader::download`]; it is
//! reported and recorded in the resource's outcome.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Why one resource was not written to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        #[source]
        source: FetchError,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The resource has no URL.
    #[error("resource '{name}' has no URL")]
    MissingUrl {
        /// Resource display name.
        name: String,
    },

    /// The body exceeded the size ceiling after the probe let it through.
    #[error("{url} is {actual_bytes} bytes, above the {max_bytes} byte limit")]
    TooLarge {
        url: String,
        max_bytes: u64,
        actual_bytes: u64,
    },

    /// File system error while writing the resource or side-car.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a network error.
    #[must_use]
    pub fn network(url: impl Into<String>, source: FetchError) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    #[must_use]
    pub fn missing_url(name: impl Into<String>) -> Self {
        Self::MissingUrl { name: name.into() }
    }

    #[must_use]
    pub fn too_large(url: impl Into<String>, max_bytes: u64, actual_bytes: u64) -> Self {
        Self::TooLarge {
            url: url.into(),
            max_bytes,
            actual_bytes,
        }
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
