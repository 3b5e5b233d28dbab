//! Dataset reference normalization.
//!
//! A reference is either a bare slug (`padron-nominal`) or an absolute URL to
//! the portal (`https://www.datosabiertos.gob.pe/dataset/padron-nominal`).
//! Both normalize to the detail-page path `/dataset/padron-nominal`.

use regex::Regex;
use url::Url;

/// Path segment prefixed to bare slugs.
pub const DATASET_PATH_PREFIX: &str = "/dataset/";

/// Normalizes `reference` to a detail-page path on the portal at `base_url`.
///
/// URLs pointing at other hosts are returned unchanged.
#[must_use]
pub fn normalize_reference(reference: &str, base_url: &str) -> String {
    let reference = reference.trim();
    let stripped = strip_origin(reference, base_url);

    if stripped.starts_with('/') || is_absolute_url(&stripped) {
        stripped
    } else {
        format!("{DATASET_PATH_PREFIX}{stripped}")
    }
}

/// Joins a path (or passes through an absolute URL) against the portal origin.
#[must_use]
pub fn absolutize(path_or_url: &str, base_url: &str) -> String {
    if is_absolute_url(path_or_url) {
        return path_or_url.to_string();
    }
    if let Ok(base) = Url::parse(base_url)
        && let Ok(joined) = base.join(path_or_url)
    {
        return joined.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if path_or_url.starts_with('/') {
        format!("{base}{path_or_url}")
    } else {
        format!("{base}/{path_or_url}")
    }
}

fn is_absolute_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn strip_origin(reference: &str, base_url: &str) -> String {
    let Some(host) = portal_host(base_url) else {
        return reference.to_string();
    };
    let pattern = format!(r"(?i)^https?://(www\.)?{}(:\d+)?", regex::escape(&host));
    match Regex::new(&pattern) {
        Ok(origin) => origin.replace(reference, "").into_owned(),
        Err(_) => reference.to_string(),
    }
}

fn portal_host(base_url: &str) -> Option<String> {
    let url = Url::parse(base_url).ok()?;
    let host = url.host_str()?;
    Some(host.trim_start_matches("www.").to_ascii_lowercase())
}
