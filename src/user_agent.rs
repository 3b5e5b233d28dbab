//! Shared User-Agent string for portal page, metadata and resource requests.
//!
//! Single source for project URL and UA format so every request made by the
//! fetcher identifies the tool the same way.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/datos";

/// Default User-Agent for all portal requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("datos/{version} (open-data-client; +{PROJECT_UA_URL})")
}
