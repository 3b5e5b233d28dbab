//! Workbook loading through `calamine` (xls, xlsx, xlsm, xlsb, ods).

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::Table;
use super::error::LoadError;

/// Cell rows of the first sheet, header row included.
///
/// # Errors
///
/// Returns the reader error when the bytes are not a workbook or it has no
/// sheets.
pub fn first_sheet_rows(bytes: &[u8]) -> Result<Vec<Vec<Data>>, String> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())?;
    Ok(range.rows().map(<[Data]>::to_vec).collect())
}

/// Text of one cell; empty cells become empty strings.
#[must_use]
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loads the first sheet as a table, using its first row as the header.
///
/// # Errors
///
/// Returns [`LoadError::Spreadsheet`] when the workbook cannot be read.
pub fn load_spreadsheet(bytes: &[u8], origin: &str) -> Result<Table, LoadError> {
    let rows = first_sheet_rows(bytes).map_err(|reason| LoadError::spreadsheet(origin, reason))?;
    let mut rows = rows.into_iter();
    let columns: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(cell_text).collect())
        .unwrap_or_default();
    let width = columns.len();
    let rows = rows
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();
    Ok(Table { columns, rows })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "region").unwrap();
        sheet.write_string(0, 1, "casos").unwrap();
        sheet.write_string(1, 0, "Cusco").unwrap();
        sheet.write_number(1, 1, 12.0).unwrap();
        sheet.write_string(2, 0, "Puno").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_first_sheet_loaded_with_header() {
        let table = load_spreadsheet(&workbook_bytes(), "casos.xlsx").unwrap();
        assert_eq!(table.columns, vec!["region", "casos"]);
        assert_eq!(table.rows[0], vec!["Cusco", "12"]);
        assert_eq!(table.rows[1], vec!["Puno", ""]);
    }

    #[test]
    fn test_not_a_workbook_is_spreadsheet_error() {
        let err = load_spreadsheet(b"region,casos\n", "casos.xlsx").unwrap_err();
        assert!(matches!(err, LoadError::Spreadsheet { .. }));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
    }
}
