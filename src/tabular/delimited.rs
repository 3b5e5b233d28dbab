//! Delimited-text loading with an ordered encoding/delimiter search.
//!
//! Candidates are tried in a fixed order and the first one that decodes and
//! parses into a rectangular table wins:
//!
//! 1. every encoding with a comma,
//! 2. every encoding with every delimiter, skipping pairs from step 1,
//! 3. lossy Latin-1 with a sniffed delimiter and ragged rows padded.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::Table;
use super::encoding::{TextEncoding, latin1_to_string};
use super::error::LoadError;

/// Field delimiters in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    pub const PRIORITY: [Delimiter; 4] = [Self::Comma, Self::Semicolon, Self::Tab, Self::Pipe];

    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Tab => b'\t',
            Self::Pipe => b'|',
        }
    }

    fn as_char(self) -> char {
        char::from(self.byte())
    }
}

/// One `(encoding, delimiter)` attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub encoding: TextEncoding,
    pub delimiter: Delimiter,
}

/// The strict candidates in the order they are attempted.
#[must_use]
pub fn candidate_plan() -> Vec<Candidate> {
    let mut plan: Vec<Candidate> = TextEncoding::PRIORITY
        .iter()
        .map(|&encoding| Candidate {
            encoding,
            delimiter: Delimiter::Comma,
        })
        .collect();
    for encoding in TextEncoding::PRIORITY {
        for delimiter in Delimiter::PRIORITY {
            let candidate = Candidate {
                encoding,
                delimiter,
            };
            if !plan.contains(&candidate) {
                plan.push(candidate);
            }
        }
    }
    plan
}

/// Loads delimited text from `bytes`.
///
/// When every strict candidate fails and `materialize_to` is set, the lossy
/// decoded text is written there before parsing.
///
/// # Errors
///
/// Returns [`LoadError::DecodeExhaustion`] when even the lossy pass yields an
/// empty table, or [`LoadError::Io`] when the decoded copy cannot be written.
pub fn load_delimited(
    bytes: &[u8],
    origin: &str,
    materialize_to: Option<&Path>,
) -> Result<Table, LoadError> {
    for candidate in candidate_plan() {
        let Some(text) = candidate.encoding.decode(bytes) else {
            continue;
        };
        if let Some(table) = parse_strict(&text, candidate.delimiter) {
            debug!(
                origin,
                encoding = %candidate.encoding,
                delimiter = %candidate.delimiter.as_char().escape_default(),
                "delimited text parsed"
            );
            return Ok(table);
        }
    }

    info!(origin, "strict candidates exhausted, trying lossy decode");
    let text = latin1_to_string(bytes);
    if let Some(path) = materialize_to {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
        }
        fs::write(path, &text).map_err(|e| LoadError::io(path, e))?;
        debug!(path = %path.display(), "decoded copy written");
    }

    let delimiter = sniff_delimiter(&text);
    parse_lenient(&text, delimiter).ok_or_else(|| {
        warn!(origin, "no candidate produced a table");
        LoadError::decode_exhaustion(origin)
    })
}

/// Parses `text` requiring equal-length rows and a plausible header.
///
/// A single-column header that still contains another delimiter means the
/// wrong delimiter was used, so the parse is rejected.
#[must_use]
pub fn parse_strict(text: &str, delimiter: Delimiter) -> Option<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers().ok()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return None;
    }
    if columns.len() == 1 {
        let header = &columns[0];
        let foreign = Delimiter::PRIORITY
            .iter()
            .filter(|&&other| other != delimiter)
            .any(|other| header.contains(other.as_char()));
        if foreign {
            return None;
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Some(Table { columns, rows })
}

/// Parses `text` accepting ragged rows; short rows are padded, long rows
/// extend the header with positional names.
fn parse_lenient(text: &str, delimiter: Delimiter) -> Option<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut columns: Vec<String> = reader.headers().ok()?.iter().map(str::to_string).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        rows.push(record.iter().map(str::to_string).collect());
    }
    if columns.iter().all(String::is_empty) && rows.is_empty() {
        return None;
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(columns.len());
    while columns.len() < width {
        columns.push(format!("column_{}", columns.len() + 1));
    }
    for row in &mut rows {
        row.resize(width, String::new());
    }
    Some(Table { columns, rows })
}

/// Picks the delimiter whose per-line count is most consistent over the
/// first ten non-empty lines. Ties go to the earlier delimiter; text with no
/// delimiter at all is read as a single comma-separated column.
#[must_use]
pub fn sniff_delimiter(text: &str) -> Delimiter {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    let mut best: Option<(usize, usize, Delimiter)> = None;
    for delimiter in Delimiter::PRIORITY {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| line.matches(delimiter.as_char()).count())
            .collect();
        let Some(mode) = most_common_nonzero(&counts) else {
            continue;
        };
        let agreeing = counts.iter().filter(|&&count| count == mode).count();
        let score = (agreeing, mode);
        if best.is_none_or(|(a, m, _)| score > (a, m)) {
            best = Some((agreeing, mode, delimiter));
        }
    }
    best.map_or(Delimiter::Comma, |(_, _, delimiter)| delimiter)
}

fn most_common_nonzero(counts: &[usize]) -> Option<usize> {
    let mut tally: Vec<(usize, usize)> = Vec::new();
    for &count in counts.iter().filter(|&&count| count > 0) {
        match tally.iter_mut().find(|(value, _)| *value == count) {
            Some((_, seen)) => *seen += 1,
            None => tally.push((count, 1)),
        }
    }
    tally
        .into_iter()
        .max_by(|(va, sa), (vb, sb)| sa.cmp(sb).then(va.cmp(vb)))
        .map(|(value, _)| value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plan_order_and_no_duplicates() {
        let plan = candidate_plan();
        assert_eq!(plan.len(), 16);
        assert!(plan[..4].iter().all(|c| c.delimiter == Delimiter::Comma));
        assert_eq!(
            plan[4],
            Candidate {
                encoding: TextEncoding::Utf8,
                delimiter: Delimiter::Semicolon
            }
        );
        for (i, a) in plan.iter().enumerate() {
            assert!(!plan[i + 1..].contains(a));
        }
    }

    #[test]
    fn test_utf8_comma_loads_first() {
        let table = load_delimited("a,b\n1,2\n".as_bytes(), "mem", None).unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_latin1_semicolon_loads_with_correct_width() {
        let bytes = b"a\xF1o;regi\xF3n;monto\n2020;Cusco;10\n2021;Jun\xEDn;20\n";
        let table = load_delimited(bytes, "ventas.csv", None).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.columns[0], "año");
        assert_eq!(table.rows[1][1], "Junín");
    }

    #[test]
    fn test_wrong_delimiter_single_column_rejected() {
        assert!(parse_strict("a;b\n1;2\n", Delimiter::Comma).is_none());
        assert!(parse_strict("a;b\n1;2\n", Delimiter::Semicolon).is_some());
        let single = parse_strict("nombre\nAna\n", Delimiter::Comma).unwrap();
        assert_eq!(single.column_count(), 1);
    }

    #[test]
    fn test_ragged_rows_fail_strict_but_load_lenient() {
        let text = "a|b|c\n1|2\n3|4|5|6\n";
        assert!(parse_strict(text, Delimiter::Pipe).is_none());
        let table = load_delimited(text.as_bytes(), "ragged.txt", None).unwrap();
        assert_eq!(table.columns, vec!["a", "b", "c", "column_4"]);
        assert_eq!(table.rows[0], vec!["1", "2", "", ""]);
    }

    #[test]
    fn test_lossy_pass_materializes_decoded_text() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("decoded").join("out.csv");
        let bytes = b"x;y\n1;\x002\n3;4;5\n";
        let table = load_delimited(bytes, "mem", Some(&target)).unwrap();
        assert_eq!(table.columns[..2], ["x".to_string(), "y".to_string()]);
        assert!(target.exists());
    }

    #[test]
    fn test_empty_input_exhausts() {
        let err = load_delimited(b"", "vacio.csv", None).unwrap_err();
        assert!(matches!(err, LoadError::DecodeExhaustion { ref origin } if origin == "vacio.csv"));
    }

    #[test]
    fn test_sniff_prefers_consistent_delimiter() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2,5;3\n4;5;6\n"), Delimiter::Semicolon);
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), Delimiter::Tab);
        assert_eq!(sniff_delimiter("solo\nvalores\n"), Delimiter::Comma);
    }
}
