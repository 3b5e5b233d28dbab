//! Resource classification.
//!
//! Sorts a record's resources into data files, data dictionaries and
//! everything else. Dictionary detection is by name only, so a CSV named
//! "Diccionario de datos" lands in the dictionary bucket and nowhere else.

use crate::record::{DatasetRecord, Resource};
use crate::tabular::TableFormat;

/// Name keywords marking a data dictionary, already accent-folded.
pub const DICTIONARY_KEYWORDS: [&str; 2] = ["diccionario", "dictionary"];

/// Bucket a resource falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Data,
    Dictionary,
    Other,
}

/// Resources split by kind, each list in origin order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub data: Vec<Resource>,
    pub dictionary: Vec<Resource>,
    pub other: Vec<Resource>,
}

impl Classification {
    /// Total number of classified resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() + self.dictionary.len() + self.other.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies one resource.
#[must_use]
pub fn classify_resource(resource: &Resource) -> ResourceKind {
    let name = fold_accents(&resource.name);
    if DICTIONARY_KEYWORDS
        .iter()
        .any(|keyword| name.contains(keyword))
    {
        return ResourceKind::Dictionary;
    }
    if resource.declared_format().as_deref() == Some("pdf") {
        return ResourceKind::Other;
    }
    match resource
        .effective_format()
        .and_then(|format| TableFormat::from_name(&format))
    {
        Some(format) if format.is_tabular() => ResourceKind::Data,
        _ => ResourceKind::Other,
    }
}

/// Classifies every resource in order.
#[must_use]
pub fn classify(resources: &[Resource]) -> Classification {
    let mut classification = Classification::default();
    for resource in resources {
        let bucket = match classify_resource(resource) {
            ResourceKind::Data => &mut classification.data,
            ResourceKind::Dictionary => &mut classification.dictionary,
            ResourceKind::Other => &mut classification.other,
        };
        bucket.push(resource.clone());
    }
    classification
}

/// Classifies the resources listed in a record's raw metadata.
#[must_use]
pub fn classify_record(record: &DatasetRecord) -> Classification {
    classify(&record.resources())
}

/// Lowercases and strips Spanish and common Latin diacritics.
#[must_use]
pub fn fold_accents(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
