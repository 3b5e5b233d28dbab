//! JSON table loading.
//!
//! Accepted shapes:
//! - array of objects (`[{"a": 1}, {"a": 2, "b": 3}]`), columns are the union
//!   of keys in first-seen order;
//! - object of arrays (`{"a": [1, 2], "b": [3, 4]}`), one column per key;
//! - object of objects (`{"r1": {"a": 1}, "r2": {"a": 2}}`), one row per entry.

use serde_json::{Map, Value};

use super::Table;
use super::error::LoadError;

/// Loads a JSON document as a table.
///
/// # Errors
///
/// Returns [`LoadError::Json`] for invalid JSON or an unsupported shape.
pub fn load_json(bytes: &[u8], origin: &str) -> Result<Table, LoadError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let value: Value = serde_json::from_slice(bytes).map_err(|e| LoadError::json(origin, e))?;
    match value {
        Value::Array(items) => records_table(&items, origin),
        Value::Object(map) if map.values().all(Value::is_array) => Ok(columns_table(&map)),
        Value::Object(map) if map.values().all(Value::is_object) => {
            let items: Vec<Value> = map.into_iter().map(|(_, row)| row).collect();
            records_table(&items, origin)
        }
        _ => Err(LoadError::json(origin, "expected an array or object of records")),
    }
}

fn records_table(items: &[Value], origin: &str) -> Result<Table, LoadError> {
    let mut columns: Vec<String> = Vec::new();
    let mut objects: Vec<&Map<String, Value>> = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(LoadError::json(origin, "array items must be objects"));
        };
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(object);
    }

    let rows = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|column| object.get(column).map(value_text).unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(Table { columns, rows })
}

fn columns_table(map: &Map<String, Value>) -> Table {
    let columns: Vec<String> = map.keys().cloned().collect();
    let height = map
        .values()
        .filter_map(Value::as_array)
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    let rows = (0..height)
        .map(|index| {
            map.values()
                .map(|values| {
                    values
                        .get(index)
                        .map(value_text)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    Table { columns, rows }
}

/// Cell text: strings unquoted, `null` empty, everything else as JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
