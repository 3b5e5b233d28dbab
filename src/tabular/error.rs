//! Error types for tabular loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`super::load`] and [`super::load_resource`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The declared (or inferred) format has no loading strategy.
    #[error("unsupported format '{format}' for {origin}")]
    FormatUnsupported {
        /// Format as declared or inferred.
        format: String,
        /// Path, URL or buffer name being loaded.
        origin: String,
    },

    /// Every encoding and delimiter candidate failed.
    #[error("could not decode {origin} with any encoding/delimiter combination")]
    DecodeExhaustion {
        /// Path, URL or buffer name being loaded.
        origin: String,
    },

    /// Reading the source or writing the decoded copy failed.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook could not be opened or has no sheet.
    #[error("could not read spreadsheet {origin}: {reason}")]
    Spreadsheet { origin: String, reason: String },

    /// The JSON document is invalid or not table-shaped.
    #[error("could not read JSON table {origin}: {reason}")]
    Json { origin: String, reason: String },

    /// The Parquet file could not be read.
    #[error("could not read parquet file {origin}: {reason}")]
    Columnar { origin: String, reason: String },

    /// The record lists no loadable resource.
    #[error("dataset {dataset} has no data resources")]
    NoResources { dataset: String },

    /// The resource could not be fetched.
    #[error("could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

impl LoadError {
    pub(crate) fn format_unsupported(format: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::FormatUnsupported {
            format: format.into(),
            origin: origin.into(),
        }
    }

    pub(crate) fn decode_exhaustion(origin: impl Into<String>) -> Self {
        Self::DecodeExhaustion {
            origin: origin.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn spreadsheet(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Spreadsheet {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn json(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Json {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn columnar(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Columnar {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
