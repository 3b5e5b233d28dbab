//! Tabular loading: local files or byte buffers into a [`Table`].
//!
//! The format comes from the declared format when one is given, otherwise
//! from the path or buffer name suffix, otherwise delimited text is assumed.
//! Delimited text goes through an ordered encoding/delimiter search (see
//! [`candidate_plan`]); spreadsheet, JSON and Parquet use a single strategy
//! each and surface their errors directly.
//!
//! # Example
//!
//! ```no_run
//! use datos_core::tabular::{LoadOptions, TabularSource, load};
//!
//! # fn example() -> Result<(), datos_core::tabular::LoadError> {
//! let table = load(&TabularSource::path("datasets/abc/ventas.csv"), &LoadOptions::default())?;
//! println!("{} columns, {} rows", table.column_count(), table.row_count());
//! # Ok(())
//! # }
//! ```

mod columnar;
mod delimited;
mod encoding;
mod error;
mod format;
mod json;
mod remote;
mod spreadsheet;

pub use delimited::{Candidate, Delimiter, candidate_plan, parse_strict, sniff_delimiter};
pub use encoding::{TextEncoding, latin1_to_string};
pub use error::LoadError;
pub use format::TableFormat;
pub use remote::{RemoteLoadOptions, ResourceSelector, load_resource};
pub use spreadsheet::{cell_text, first_sheet_rows};

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

/// A loaded table; every cell is text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of the named column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|column| column == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str))
                .collect(),
        )
    }
}

/// Where table bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabularSource {
    Path(PathBuf),
    /// In-memory buffer; `name` supplies the suffix and error context.
    Bytes { data: Bytes, name: String },
}

impl TabularSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(data: impl Into<Bytes>, name: impl Into<String>) -> Self {
        Self::Bytes {
            data: data.into(),
            name: name.into(),
        }
    }

    /// Human-readable origin used in errors and logs.
    #[must_use]
    pub fn origin(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    fn suffix_format(&self) -> Option<TableFormat> {
        match self {
            Self::Path(path) => TableFormat::from_path(path),
            Self::Bytes { name, .. } => {
                let path = name.split(['?', '#']).next().unwrap_or_default();
                TableFormat::from_path(Path::new(path))
            }
        }
    }

    fn read(&self) -> Result<Bytes, LoadError> {
        match self {
            Self::Path(path) => std::fs::read(path)
                .map(Bytes::from)
                .map_err(|e| LoadError::io(path, e)),
            Self::Bytes { data, .. } => Ok(data.clone()),
        }
    }
}

/// Options for [`load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Declared format; overrides the suffix.
    pub declared_format: Option<String>,
    /// Where to write the lossy-decoded text if delimited loading reaches its
    /// last resort.
    pub materialize_to: Option<PathBuf>,
}

impl LoadOptions {
    #[must_use]
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            declared_format: Some(format.into()),
            ..Self::default()
        }
    }
}

/// Chooses the loading strategy for `source`.
///
/// # Errors
///
/// Returns [`LoadError::FormatUnsupported`] for an unknown declared format or
/// a PDF.
pub fn select_format(
    source: &TabularSource,
    declared_format: Option<&str>,
) -> Result<TableFormat, LoadError> {
    let declared = declared_format.map(str::trim).filter(|f| !f.is_empty());
    let format = match declared {
        Some(declared) => TableFormat::from_name(declared)
            .ok_or_else(|| LoadError::format_unsupported(declared, source.origin()))?,
        None => source.suffix_format().unwrap_or(TableFormat::Delimited),
    };
    if !format.is_tabular() {
        return Err(LoadError::format_unsupported(format.to_string(), source.origin()));
    }
    Ok(format)
}

/// Loads `source` into a table.
///
/// # Errors
///
/// See [`LoadError`]; delimited text fails only with
/// [`LoadError::DecodeExhaustion`] once every fallback is spent.
pub fn load(source: &TabularSource, options: &LoadOptions) -> Result<Table, LoadError> {
    let format = select_format(source, options.declared_format.as_deref())?;
    let origin = source.origin();
    debug!(origin = %origin, format = %format, "loading table");
    let bytes = source.read()?;

    match format {
        TableFormat::Delimited => {
            delimited::load_delimited(&bytes, &origin, options.materialize_to.as_deref())
        }
        TableFormat::Spreadsheet => spreadsheet::load_spreadsheet(&bytes, &origin),
        TableFormat::Json => json::load_json(&bytes, &origin),
        TableFormat::Columnar => columnar::load_parquet(bytes, &origin),
        TableFormat::Pdf => Err(LoadError::format_unsupported(format.to_string(), origin)),
    }
}
