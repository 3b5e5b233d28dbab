//! Data-dictionary resolution.
//!
//! Finds the first dictionary-classified resource of a record, downloads it
//! and flattens it to `term\tdefinition` lines. The result is cached on the
//! record: once [`DataDictionary::Present`] or [`DataDictionary::Absent`] is
//! set, later calls return it without touching the network. Transport and
//! parse failures are reported and leave the record
//! [`DataDictionary::Unresolved`] so a later call can retry.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::catalog::classify_record;
use crate::fetch::{FetchOptions, PageFetcher};
use crate::record::{DataDictionary, DatasetRecord, Resource};
use crate::report::{Reporter, emit};
use crate::tabular::{TableFormat, cell_text, first_sheet_rows, latin1_to_string};

/// Text stored when the dictionary is a PDF document.
#[must_use]
pub fn pdf_placeholder(url: &str) -> String {
    format!("Data dictionary is a PDF document, see {url}")
}

/// Text stored when the dictionary is neither a workbook nor readable text.
#[must_use]
pub fn binary_placeholder(url: &str) -> String {
    format!("Data dictionary is not readable text, see {url}")
}

/// Options for [`DictionaryResolver`].
#[derive(Debug, Clone)]
pub struct DictionaryOptions {
    pub fetch: FetchOptions,
    /// Send failures to the reporter instead of only logging them.
    pub report_errors: bool,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            report_errors: true,
        }
    }
}

/// Resolves and caches a record's data dictionary.
#[derive(Clone)]
pub struct DictionaryResolver {
    fetcher: Arc<dyn PageFetcher>,
    reporter: Arc<dyn Reporter>,
    options: DictionaryOptions,
}

impl std::fmt::Debug for DictionaryResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryResolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl DictionaryResolver {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        reporter: Arc<dyn Reporter>,
        options: DictionaryOptions,
    ) -> Self {
        Self {
            fetcher,
            reporter,
            options,
        }
    }

    /// Returns the dictionary text, resolving it on first use.
    ///
    /// `None` means the record has no dictionary (state `Absent`) or the
    /// attempt failed (state stays `Unresolved`).
    #[instrument(skip(self, record), fields(dataset = %record.id))]
    pub async fn resolve_dictionary(&self, record: &mut DatasetRecord) -> Option<String> {
        match &record.data_dictionary {
            DataDictionary::Present(text) => return Some(text.clone()),
            DataDictionary::Absent => return None,
            DataDictionary::Unresolved => {}
        }

        let classification = classify_record(record);
        let Some(resource) = classification.dictionary.into_iter().next() else {
            debug!("no dictionary resource");
            record.data_dictionary = DataDictionary::Absent;
            return None;
        };

        let text = self.fetch_dictionary(&resource).await?;
        info!(url = %resource.url, lines = text.lines().count(), "data dictionary resolved");
        record.data_dictionary = DataDictionary::Present(text.clone());
        Some(text)
    }

    async fn fetch_dictionary(&self, resource: &Resource) -> Option<String> {
        let url = resource.url.trim();
        let format = resource
            .effective_format()
            .and_then(|format| TableFormat::from_name(&format));

        if format == Some(TableFormat::Pdf) {
            return Some(pdf_placeholder(url));
        }
        if url.is_empty() {
            self.report(&format!("dictionary resource '{}' has no URL", resource.name));
            return None;
        }

        let response = match self.fetcher.fetch(url, &self.options.fetch).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                self.report(&format!(
                    "could not download data dictionary {url}: HTTP {}",
                    response.status
                ));
                return None;
            }
            Err(e) => {
                self.report(&format!("could not download data dictionary {url}: {e}"));
                return None;
            }
        };

        if format == Some(TableFormat::Spreadsheet) {
            return match flatten_spreadsheet(&response.body) {
                Ok(text) => Some(text),
                Err(reason) => {
                    self.report(&format!("could not read data dictionary {url}: {reason}"));
                    None
                }
            };
        }
        Some(decode_text(&response.body).unwrap_or_else(|| binary_placeholder(url)))
    }

    fn report(&self, message: &str) {
        emit(self.reporter.as_ref(), self.options.report_errors, message);
    }
}

/// Flattens the first sheet of a workbook to `term\tdefinition` lines.
///
/// The header row is skipped, only the first two columns are kept, rows with
/// a blank cell in either are dropped, and cells are trimmed.
///
/// # Errors
///
/// Returns the reader error when the bytes are not a workbook.
pub fn flatten_spreadsheet(bytes: &[u8]) -> Result<String, String> {
    let rows = first_sheet_rows(bytes)?;
    let lines: Vec<String> = rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let term = cell_text(row.first()?).trim().to_string();
            let definition = cell_text(row.get(1)?).trim().to_string();
            (!term.is_empty() && !definition.is_empty()).then(|| format!("{term}\t{definition}"))
        })
        .collect();
    Ok(lines.join("\n"))
}

/// UTF-8, else Latin-1; `None` for binary content.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if bytes.contains(&0) {
        return None;
    }
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(_) => Some(latin1_to_string(bytes)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use serde_json::json;

    use crate::record::RecordBuilder;
    use crate::report::tests::RecordingReporter;
    use crate::test_support::stub_fetcher::StubFetcher;

    fn record_with(resources: serde_json::Value) -> DatasetRecord {
        RecordBuilder::new()
            .id("ds")
            .raw_metadata(json!({ "result": [{ "resources": resources }] }))
            .build()
    }

    fn resolver(fetcher: &Arc<StubFetcher>, reporter: &Arc<RecordingReporter>) -> DictionaryResolver {
        DictionaryResolver::new(
            Arc::clone(fetcher) as Arc<dyn PageFetcher>,
            Arc::clone(reporter) as Arc<dyn Reporter>,
            DictionaryOptions::default(),
        )
    }

    fn dictionary_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Variable").unwrap();
        sheet.write_string(0, 1, "Descripción").unwrap();
        sheet.write_string(0, 2, "Tipo").unwrap();
        sheet.write_string(1, 0, " edad ").unwrap();
        sheet.write_string(1, 1, "Años cumplidos").unwrap();
        sheet.write_string(1, 2, "int").unwrap();
        sheet.write_string(2, 0, "sin_definicion").unwrap();
        sheet.write_string(3, 0, "ubigeo").unwrap();
        sheet.write_string(3, 1, "Código de distrito ").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[tokio::test]
    async fn test_spreadsheet_flattened_and_cached() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://f.test/dic.xlsx", 200, dictionary_workbook()),
        );
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([
            { "name": "Diccionario de datos", "url": "https://f.test/dic.xlsx", "format": "xlsx" },
            { "name": "datos", "url": "https://f.test/d.csv", "format": "csv" }
        ]));
        let resolver = resolver(&fetcher, &reporter);

        let first = resolver.resolve_dictionary(&mut record).await;
        let second = resolver.resolve_dictionary(&mut record).await;

        let expected = "edad\tAños cumplidos\nubigeo\tCódigo de distrito";
        assert_eq!(first.as_deref(), Some(expected));
        assert_eq!(second.as_deref(), Some(expected));
        assert_eq!(fetcher.fetch_calls(), 1);
        assert_eq!(record.data_dictionary, DataDictionary::Present(expected.into()));
    }

    #[tokio::test]
    async fn test_no_dictionary_marks_absent() {
        let fetcher = Arc::new(StubFetcher::new());
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([{ "name": "datos", "url": "https://f.test/d.csv" }]));

        assert_eq!(resolver(&fetcher, &reporter).resolve_dictionary(&mut record).await, None);
        assert_eq!(record.data_dictionary, DataDictionary::Absent);
        assert_eq!(fetcher.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_pdf_dictionary_is_placeholder_without_fetch() {
        let fetcher = Arc::new(StubFetcher::new());
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([
            { "name": "Diccionario", "url": "https://f.test/dic.pdf", "format": "PDF" }
        ]));

        let text = resolver(&fetcher, &reporter)
            .resolve_dictionary(&mut record)
            .await
            .unwrap();
        assert!(text.contains("https://f.test/dic.pdf"));
        assert_eq!(fetcher.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_latin1_text_dictionary() {
        let fetcher = Arc::new(StubFetcher::new().with_page(
            "https://f.test/dic.txt",
            200,
            b"a\xF1o\tA\xF1o de registro".to_vec(),
        ));
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([
            { "name": "diccionario", "url": "https://f.test/dic.txt", "format": "txt" }
        ]));

        let text = resolver(&fetcher, &reporter).resolve_dictionary(&mut record).await;
        assert_eq!(text.as_deref(), Some("año\tAño de registro"));
    }

    #[tokio::test]
    async fn test_binary_dictionary_is_placeholder() {
        let fetcher = Arc::new(
            StubFetcher::new().with_page("https://f.test/dic.bin", 200, vec![0x50, 0x4B, 0x00, 0x01]),
        );
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([
            { "name": "Data dictionary", "url": "https://f.test/dic.bin" }
        ]));

        let text = resolver(&fetcher, &reporter).resolve_dictionary(&mut record).await;
        assert_eq!(text, Some(binary_placeholder("https://f.test/dic.bin")));
    }

    #[tokio::test]
    async fn test_transport_failure_stays_unresolved() {
        let fetcher = Arc::new(StubFetcher::new().with_page("https://f.test/dic.xlsx", 503, ""));
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([
            { "name": "Diccionario", "url": "https://f.test/dic.xlsx", "format": "xlsx" }
        ]));
        let resolver = resolver(&fetcher, &reporter);

        assert_eq!(resolver.resolve_dictionary(&mut record).await, None);
        assert_eq!(record.data_dictionary, DataDictionary::Unresolved);
        assert_eq!(reporter.messages().len(), 1);

        assert_eq!(resolver.resolve_dictionary(&mut record).await, None);
        assert_eq!(fetcher.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_workbook_reported() {
        let fetcher =
            Arc::new(StubFetcher::new().with_page("https://f.test/dic.xlsx", 200, "not a workbook"));
        let reporter = Arc::new(RecordingReporter::default());
        let mut record = record_with(json!([
            { "name": "Diccionario", "url": "https://f.test/dic.xlsx", "format": "xlsx" }
        ]));

        assert_eq!(resolver(&fetcher, &reporter).resolve_dictionary(&mut record).await, None);
        assert!(reporter.messages()[0].contains("could not read data dictionary"));
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhola").as_deref(), Some("hola"));
        assert_eq!(decode_text(b"ni\xF1o").as_deref(), Some("niño"));
        assert_eq!(decode_text(b"\x00\x01"), None);
    }
}
