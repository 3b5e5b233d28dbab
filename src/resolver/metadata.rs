//! Structured metadata endpoint response.

use serde::Deserialize;
use serde_json::Value;

use crate::record::{DatasetRecord, RecordBuilder, null_as_default};

/// Envelope returned by the JSON view: `{"result": [ ... ]}`.
#[derive(Debug, Default, Deserialize)]
pub struct MetadataEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: Vec<MetadataResult>,
}

/// The fields of `result[0]` mapped onto a record.
#[derive(Debug, Default, Deserialize)]
pub struct MetadataResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata_modified: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata_created: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<Group>,
}

/// A publishing group; the first one names the publisher.
#[derive(Debug, Default, Deserialize)]
pub struct Group {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

impl Group {
    fn identifier(&self) -> Option<&str> {
        [self.name.trim(), self.title.trim()]
            .into_iter()
            .find(|value| !value.is_empty())
    }
}

/// Parses the raw body into both the typed envelope and the verbatim value.
///
/// # Errors
///
/// Returns the parser error when the body is not JSON or `result` is not a list.
pub fn parse_metadata(body: &[u8]) -> Result<(MetadataEnvelope, Value), serde_json::Error> {
    let raw: Value = serde_json::from_slice(body)?;
    let envelope = MetadataEnvelope::deserialize(&raw)?;
    Ok((envelope, raw))
}

/// Builds the next record snapshot from `previous` and the parsed metadata.
///
/// An empty `result` list resets every mapped field, `url` included, to its
/// default.
pub fn apply_metadata(
    previous: &DatasetRecord,
    envelope: &MetadataEnvelope,
    raw: Value,
) -> DatasetRecord {
    let fallback = MetadataResult::default();
    let result = envelope.result.first().unwrap_or(&fallback);

    let publisher = result
        .groups
        .first()
        .map(|group| group.title.trim().to_string())
        .unwrap_or_default();
    let categories: Vec<String> = result
        .groups
        .iter()
        .filter_map(Group::identifier)
        .map(str::to_string)
        .collect();
    RecordBuilder::from_record(previous)
        .id(result.id.clone())
        .title(result.title.clone())
        .description(result.notes.clone())
        .url(result.url.clone())
        .modified_date(result.metadata_modified.clone())
        .release_date(result.metadata_created.clone())
        .publisher(publisher)
        .categories(categories)
        .raw_metadata(raw)
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_are_mapped() {
        let body = json!({
            "result": [{
                "id": "9f1c",
                "name": "padron-nominal",
                "title": "Padrón nominal",
                "notes": "Registro de niños",
                "url": "https://portal/dataset/padron-nominal",
                "metadata_modified": "2024-03-01T10:00:00",
                "metadata_created": "2021-06-15T08:30:00",
                "groups": [
                    { "name": "minsa", "title": "Ministerio de Salud" },
                    { "name": null, "title": "Reniec" }
                ],
                "extra": { "kept": true }
            }]
        });
        let (envelope, raw) = parse_metadata(body.to_string().as_bytes()).unwrap();
        let record = apply_metadata(&DatasetRecord::from_url("/dataset/padron"), &envelope, raw);

        assert_eq!(record.id, "9f1c");
        assert_eq!(record.title, "Padrón nominal");
        assert_eq!(record.description, "Registro de niños");
        assert_eq!(record.url, "https://portal/dataset/padron-nominal");
        assert_eq!(record.modified_date, "2024-03-01T10:00:00");
        assert_eq!(record.release_date, "2021-06-15T08:30:00");
        assert_eq!(record.publisher, "Ministerio de Salud");
        assert_eq!(record.categories, vec!["minsa".to_string(), "Reniec".to_string()]);
        assert_eq!(record.raw_metadata["result"][0]["extra"]["kept"], json!(true));
    }

    #[test]
    fn test_empty_result_resets_to_defaults() {
        let previous = DatasetRecord {
            title: "stale".into(),
            ..DatasetRecord::from_url("/dataset/x")
        };
        let (envelope, raw) = parse_metadata(br#"{"result": []}"#).unwrap();
        let record = apply_metadata(&previous, &envelope, raw);
        assert_eq!(record.title, "");
        assert_eq!(record.id, "");
        assert_eq!(record.url, "");
        assert!(record.categories.is_empty());
        assert_eq!(record.raw_metadata, json!({ "result": [] }));
    }

    #[test]
    fn test_missing_url_falls_back_to_empty() {
        let body = br#"{"result": [{"id": "7", "title": "Ventas"}]}"#;
        let (envelope, raw) = parse_metadata(body).unwrap();
        let record = apply_metadata(&DatasetRecord::from_url("/dataset/ventas"), &envelope, raw);
        assert_eq!(record.id, "7");
        assert_eq!(record.url, "");
    }

    #[test]
    fn test_null_fields_are_absent() {
        let body = br#"{"result": [{"id": "1", "title": null, "notes": null, "groups": null}]}"#;
        let (envelope, raw) = parse_metadata(body).unwrap();
        let record = apply_metadata(&DatasetRecord::default(), &envelope, raw);
        assert_eq!(record.id, "1");
        assert_eq!(record.title, "");
        assert_eq!(record.publisher, "");
    }

    #[test]
    fn test_non_list_result_is_malformed() {
        assert!(parse_metadata(br#"{"result": "nope"}"#).is_err());
        assert!(parse_metadata(b"<html>").is_err());
    }
}
