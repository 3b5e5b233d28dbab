//! Target filenames for downloaded resources.
//!
//! The preferred name is the resource URL's last path segment,
//! percent-decoded and sanitized. When the URL has no usable segment the name
//! falls back to `"{resource name}.{format}"`.

use std::path::{Component, Path};

use url::Url;

use crate::record::Resource;

/// Name used when neither the URL nor the resource metadata yields one.
pub const FALLBACK_FILENAME: &str = "resource";

/// File name a resource is stored under inside its dataset directory.
#[must_use]
pub fn resource_filename(resource: &Resource) -> String {
    if let Some(segment) = last_url_segment(&resource.url) {
        let sanitized = sanitize_filename(&segment);
        if !sanitized.trim_matches('_').is_empty() {
            return sanitized;
        }
    }
    fallback_filename(resource)
}

/// Last non-empty path segment of `url`, percent-decoded.
pub(crate) fn last_url_segment(url: &str) -> Option<String> {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
            .map(str::to_string)?,
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .map(str::to_string)?,
    };
    let decoded = urlencoding::decode(&raw).map_or(raw.clone(), |d| d.into_owned());
    let decoded = decoded.trim().to_string();
    (!decoded.is_empty()).then_some(decoded)
}

fn fallback_filename(resource: &Resource) -> String {
    let stem = sanitize_filename_component(&resource.name);
    let stem = if stem.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        stem
    };
    match resource.declared_format() {
        Some(format) => {
            let format = sanitize_filename_component(&format);
            if format.is_empty() {
                stem
            } else {
                format!("{stem}.{format}")
            }
        }
        None => stem,
    }
}

/// Collapses anything but alphanumerics, `-`, `_` and `.` into single
/// underscores.
pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = match ch {
            c if c.is_alphanumeric() || matches!(c, '-' | '.') => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    out.trim_matches('_').to_string()
}

/// Sanitizes filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
