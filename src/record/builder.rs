//! Stage-by-stage record construction.
//!
//! Each resolution stage starts from a snapshot of the previous record and
//! produces a fresh one; nothing mutates a shared record halfway through. A
//! stage that fails simply never calls [`RecordBuilder::build`], leaving the
//! caller with the previous snapshot.

use serde_json::Value;

use super::{DataDictionary, DatasetRecord};

/// Builder producing a new [`DatasetRecord`].
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct RecordBuilder {
    record: DatasetRecord,
}

impl RecordBuilder {
    /// Starts from an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a copy of `record`.
    pub fn from_record(record: &DatasetRecord) -> Self {
        Self {
            record: record.clone(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.record.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.record.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.record.description = description.into();
        self
    }

    pub fn categories(mut self, categories: Vec<String>) -> Self {
        self.record.categories = categories;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.record.url = url.into();
        self
    }

    pub fn modified_date(mut self, date: impl Into<String>) -> Self {
        self.record.modified_date = date.into();
        self
    }

    pub fn release_date(mut self, date: impl Into<String>) -> Self {
        self.record.release_date = date.into();
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.record.publisher = publisher.into();
        self
    }

    pub fn raw_metadata(mut self, raw_metadata: Value) -> Self {
        self.record.raw_metadata = raw_metadata;
        self
    }

    pub fn data_dictionary(mut self, data_dictionary: DataDictionary) -> Self {
        self.record.data_dictionary = data_dictionary;
        self
    }

    /// Finishes the stage.
    #[must_use]
    pub fn build(self) -> DatasetRecord {
        self.record
    }
}
