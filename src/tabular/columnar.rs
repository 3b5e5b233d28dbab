//! Parquet loading.

use bytes::Bytes;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;

use super::Table;
use super::error::LoadError;

/// Loads every row group of a Parquet file into a table of strings.
///
/// # Errors
///
/// Returns [`LoadError::Columnar`] when the footer or any row cannot be read.
pub fn load_parquet(bytes: Bytes, origin: &str) -> Result<Table, LoadError> {
    let reader = SerializedFileReader::new(bytes).map_err(|e| LoadError::columnar(origin, e))?;

    let columns: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields()
        .iter()
        .map(|field| field.name().to_string())
        .collect();

    let mut rows = Vec::new();
    let row_iter = reader
        .get_row_iter(None)
        .map_err(|e| LoadError::columnar(origin, e))?;
    for row in row_iter {
        let row = row.map_err(|e| LoadError::columnar(origin, e))?;
        rows.push(
            row.get_column_iter()
                .map(|(_, field)| field_text(field))
                .collect(),
        );
    }
    Ok(Table { columns, rows })
}

fn field_text(field: &Field) -> String {
    match field {
        Field::Null => String::new(),
        Field::Str(s) => s.clone(),
        other => other.to_string(),
    }
}
