//! Failure descriptors for metadata resolution.
//!
//! None of these escape as `Err`: a resolution that hits one returns the
//! input record unchanged together with the failure.

use thiserror::Error;

/// Why a resolution stopped before producing a new record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveFailure {
    /// The detail page could not be fetched or answered with an error status.
    #[error("could not fetch dataset page {url}: {reason}")]
    PageUnavailable {
        /// Detail page URL.
        url: String,
        /// Transport error or status description.
        reason: String,
    },

    /// The detail page has no "json view of content" link.
    #[error("no machine-readable view found on {url}")]
    NoMachineReadableView {
        /// Detail page URL.
        url: String,
    },

    /// The structured metadata endpoint could not be fetched.
    #[error("could not fetch structured metadata {url}: {reason}")]
    MetadataUnavailable {
        /// Metadata endpoint URL.
        url: String,
        /// Transport error or status description.
        reason: String,
    },

    /// The structured metadata endpoint did not return the expected JSON shape.
    #[error("malformed structured metadata at {url}: {reason}")]
    MetadataMalformed {
        /// Metadata endpoint URL.
        url: String,
        /// Parser error.
        reason: String,
    },
}

impl ResolveFailure {
    pub(crate) fn page_unavailable(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::PageUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn no_machine_readable_view(url: impl Into<String>) -> Self {
        Self::NoMachineReadableView { url: url.into() }
    }

    pub(crate) fn metadata_unavailable(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MetadataUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn metadata_malformed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MetadataMalformed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for failures caused by missing markup or data rather than transport.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NoMachineReadableView { .. } | Self::MetadataMalformed { .. }
        )
    }
}
