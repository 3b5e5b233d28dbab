//! On-disk persistence of dataset records.
//!
//! Layout under a root directory (default `datasets/`):
//!
//! ```text
//! {root}/{dir}/{dir}.json      record side-car
//! {root}/{dir}/<resource files>
//! ```
//!
//! `{dir}` is the record id; records without one fall back to the machine
//! name, then to the last segment of the detail-page path.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::download::filename::{last_url_segment, sanitize_filename_component};
use crate::record::DatasetRecord;

/// Default root directory for saved datasets.
pub const DEFAULT_ROOT: &str = "datasets";

/// Directory name for records that carry no identifying field at all.
pub const UNRESOLVED_DIR: &str = "unresolved";

/// Errors produced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a side-car failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A side-car could not be serialized or parsed.
    #[error("invalid record JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The root directory does not exist.
    #[error("dataset directory not found: {root}")]
    RootMissing { root: PathBuf },

    /// No record matches the id or machine name.
    #[error("no dataset found with id or name: {name}")]
    NotFound { name: String },
}

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Directory name a record is stored under.
#[must_use]
pub fn dataset_dir_name(record: &DatasetRecord) -> String {
    let candidates = [
        Some(record.id.clone()),
        record.machine_name().map(str::to_string),
        last_url_segment(&record.url),
    ];
    candidates
        .into_iter()
        .flatten()
        .map(|value| sanitize_filename_component(&value))
        .find(|value| !value.is_empty() && value.chars().any(|c| c != '.'))
        .unwrap_or_else(|| UNRESOLVED_DIR.to_string())
}

/// `{root}/{dir}` for `record`.
#[must_use]
pub fn dataset_dir(root: &Path, record: &DatasetRecord) -> PathBuf {
    root.join(dataset_dir_name(record))
}

/// `{root}/{dir}/{dir}.json` for `record`.
#[must_use]
pub fn sidecar_path(root: &Path, record: &DatasetRecord) -> PathBuf {
    let name = dataset_dir_name(record);
    root.join(&name).join(format!("{name}.json"))
}

/// Writes the record side-car, replacing any previous one.
///
/// # Errors
///
/// Returns [`StoreError`] when the directory or file cannot be written.
#[instrument(skip(record), fields(root = %root.display(), id = %record.id))]
pub fn save_record(root: &Path, record: &DatasetRecord) -> Result<PathBuf, StoreError> {
    let path = sidecar_path(root, record);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }
    let file = fs::File::create(&path).map_err(|e| StoreError::io(&path, e))?;
    let write_result = {
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, record)
    };
    if let Err(err) = write_result {
        let _ = fs::remove_file(&path);
        return Err(StoreError::json(&path, err));
    }
    debug!(path = %path.display(), "record saved");
    Ok(path)
}

/// Saves every record, stopping at the first failure.
///
/// # Errors
///
/// Returns the first [`StoreError`] encountered.
pub fn save_records(root: &Path, records: &[DatasetRecord]) -> Result<Vec<PathBuf>, StoreError> {
    records
        .iter()
        .map(|record| save_record(root, record))
        .collect()
}

/// Loads one record by directory name (normally the id) or machine name.
///
/// # Errors
///
/// Returns [`StoreError::RootMissing`] when `root` does not exist,
/// [`StoreError::NotFound`] when nothing matches, or the read error of a
/// directly matched side-car.
pub fn load_record(root: &Path, id_or_name: &str) -> Result<DatasetRecord, StoreError> {
    if !root.is_dir() {
        return Err(StoreError::RootMissing {
            root: root.to_path_buf(),
        });
    }

    let direct = root.join(id_or_name).join(format!("{id_or_name}.json"));
    if direct.is_file() {
        return read_sidecar(&direct);
    }

    load_all(root)?
        .into_iter()
        .find(|record| record.machine_name() == Some(id_or_name))
        .ok_or_else(|| StoreError::NotFound {
            name: id_or_name.to_string(),
        })
}

/// Loads every record under `root`, ordered by directory name.
///
/// A missing root yields an empty list. Unreadable side-cars are logged and
/// skipped.
///
/// # Errors
///
/// Returns [`StoreError::Io`] when `root` exists but cannot be listed.
pub fn load_all(root: &Path) -> Result<Vec<DatasetRecord>, StoreError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| StoreError::io(root, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let mut records = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let path = dir.join(format!("{name}.json"));
        if !path.is_file() {
            continue;
        }
        match read_sidecar(&path) {
            Ok(record) => records.push(record),
            Err(error) => warn!(path = %path.display(), %error, "skipping unreadable record"),
        }
    }
    Ok(records)
}

fn read_sidecar(path: &Path) -> Result<DatasetRecord, StoreError> {
    let file = fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::json(path, e))
}
