//! Container format detection.

use std::fmt;
use std::path::Path;

/// Loading strategy family for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    /// CSV, TSV and other delimited text.
    Delimited,
    /// Excel or OpenDocument workbooks.
    Spreadsheet,
    Json,
    /// Parquet.
    Columnar,
    Pdf,
}

impl TableFormat {
    /// Maps a declared format, extension or MIME type to a family.
    ///
    /// Matching is case-insensitive and ignores a leading dot.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('.').to_lowercase();
        let format = match name.as_str() {
            "csv" | "tsv" | "txt" | "tab" | "text/csv" | "text/plain" | "text/tab-separated-values" => {
                Self::Delimited
            }
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" | "excel" | "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Self::Spreadsheet
            }
            "json" | "application/json" => Self::Json,
            "parquet" | "pq" | "application/vnd.apache.parquet" => Self::Columnar,
            "pdf" | "application/pdf" => Self::Pdf,
            _ => return None,
        };
        Some(format)
    }

    /// Family of a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Returns true for formats the tabular loader turns into a table.
    #[must_use]
    pub fn is_tabular(self) -> bool {
        !matches!(self, Self::Pdf)
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delimited => "delimited text",
            Self::Spreadsheet => "spreadsheet",
            Self::Json => "json",
            Self::Columnar => "parquet",
            Self::Pdf => "pdf",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(TableFormat::from_name("CSV"), Some(TableFormat::Delimited));
        assert_eq!(TableFormat::from_name(".XLSX"), Some(TableFormat::Spreadsheet));
        assert_eq!(TableFormat::from_name("Parquet"), Some(TableFormat::Columnar));
        assert_eq!(TableFormat::from_name("application/json"), Some(TableFormat::Json));
        assert_eq!(TableFormat::from_name("docx"), None);
        assert_eq!(TableFormat::from_name(""), None);
    }

    #[test]
    fn test_from_path_uses_extension() {
        assert_eq!(
            TableFormat::from_path(Path::new("data/ventas.ods")),
            Some(TableFormat::Spreadsheet)
        );
        assert_eq!(TableFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_pdf_is_not_tabular() {
        assert!(!TableFormat::Pdf.is_tabular());
        assert!(TableFormat::Json.is_tabular());
    }
}
