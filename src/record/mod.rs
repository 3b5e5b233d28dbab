//! Dataset record model.
//!
//! A [`DatasetRecord`] is the normalized view of one catalog entry. It keeps
//! the origin's structured metadata verbatim in `raw_metadata`, so fields the
//! crate does not model are never lost, and exposes the resource list through
//! [`DatasetRecord::resources`].

mod builder;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use builder::RecordBuilder;

/// Cached data-dictionary state.
///
/// Distinguishes "never looked" from "looked, nothing there".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum DataDictionary {
    /// Resolution has not been attempted (or failed transiently).
    #[default]
    Unresolved,
    /// Resolution ran and the dataset has no dictionary resource.
    Absent,
    /// Flattened dictionary text.
    Present(String),
}

impl DataDictionary {
    /// Returns the text when present.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            Self::Unresolved | Self::Absent => None,
        }
    }

    /// Returns true once resolution produced a definitive answer.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// One downloadable file attached to a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Download URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Declared format, free text (`"CSV"`, `"xlsx"`, `""`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub format: String,
}

impl Resource {
    /// Creates a resource from its three modelled fields.
    pub fn new(name: impl Into<String>, format: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            format: format.into(),
        }
    }

    /// Declared format, lowercased and trimmed, with any leading dot removed.
    #[must_use]
    pub fn declared_format(&self) -> Option<String> {
        let format = self.format.trim().trim_start_matches('.').to_lowercase();
        (!format.is_empty()).then_some(format)
    }

    /// Extension of the URL's last path segment, lowercased.
    #[must_use]
    pub fn url_extension(&self) -> Option<String> {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        let last = path.rsplit('/').next()?;
        let (_, ext) = last.rsplit_once('.')?;
        (!ext.is_empty() && ext.len() <= 8).then(|| ext.to_lowercase())
    }

    /// Declared format, else the URL extension.
    #[must_use]
    pub fn effective_format(&self) -> Option<String> {
        self.declared_format().or_else(|| self.url_extension())
    }
}

/// Normalized representation of one catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Opaque identifier; empty until resolved.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Category identifiers (topic slugs or group names).
    #[serde(default)]
    pub categories: Vec<String>,
    /// Canonical detail-page path or URL.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub modified_date: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub publisher: String,
    /// Structured metadata exactly as returned by the origin.
    #[serde(default)]
    pub raw_metadata: Value,
    #[serde(default)]
    pub data_dictionary: DataDictionary,
}

impl DatasetRecord {
    /// Creates an unresolved record pointing at a detail-page path.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns true once metadata resolution has assigned an id.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.id.is_empty()
    }

    /// The single metadata result object, if the origin returned one.
    #[must_use]
    pub fn metadata_result(&self) -> Option<&Value> {
        self.raw_metadata
            .get("result")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
    }

    /// Machine name (`result[0].name`) from the raw metadata.
    #[must_use]
    pub fn machine_name(&self) -> Option<&str> {
        self.metadata_result()
            .and_then(|result| result.get("name"))
            .and_then(Value::as_str)
    }

    /// Resources listed in the raw metadata, in origin order.
    ///
    /// Entries that are not objects are skipped.
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        self.metadata_result()
            .and_then(|result| result.get("resources"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.is_object())
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Treats JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
