//! Passage extraction from uploaded files.
//!
//! A file is a flat text blob in which passages are separated by one or more
//! blank lines. Spreadsheets are flattened first: one line per row of the
//! first sheet, taken from the first column, with blank rows kept as blank
//! lines.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Any whitespace run containing at least two linefeeds.
static PASSAGE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// File extensions accepted by the upload surfaces.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "txt"];

/// Parser failure. Both variants end the current run.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no valid text found: passages must be separated by a blank line")]
    NoValidText,

    #[error("failed to read file")]
    Unreadable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// How the raw bytes of a file are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.xlsx` / `.xls` workbook
    Spreadsheet,
    /// Anything else, read as UTF-8 text
    Text,
}

impl FileFormat {
    /// Pick the format from the file name suffix alone.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Self::Spreadsheet
        } else {
            Self::Text
        }
    }
}

/// Whether the upload surfaces accept a file with this name.
pub fn is_supported_file_name(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Extract the ordered passages of a file.
pub fn parse_content(file_name: &str, bytes: &[u8]) -> Result<Vec<String>, ParseError> {
    let format = FileFormat::from_file_name(file_name);
    let blob = match format {
        FileFormat::Spreadsheet => spreadsheet_text(bytes)?,
        FileFormat::Text => decode_text(bytes),
    };

    let passages = split_passages(&blob);
    tracing::debug!(
        file_name,
        ?format,
        bytes = bytes.len(),
        passages = passages.len(),
        "Parsed file"
    );

    if passages.is_empty() {
        return Err(ParseError::NoValidText);
    }
    Ok(passages)
}

/// Read a file from disk and extract its passages.
pub async fn parse_file(path: &Path) -> Result<Vec<String>, ParseError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ParseError::Unreadable(Box::new(e)))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    parse_content(&file_name, &bytes)
}

/// Split a text blob into trimmed, non-empty passages.
pub fn split_passages(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    PASSAGE_SEPARATOR
        .split(&normalized)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(String::from)
        .collect()
}

/// UTF-8 with replacement characters; a leading byte-order mark is dropped.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

fn spreadsheet_text(bytes: &[u8]) -> Result<String, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ParseError::Unreadable(e.to_string().into()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::Unreadable("workbook has no sheets".into()))?
        .map_err(|e| ParseError::Unreadable(e.to_string().into()))?;

    Ok(first_column_text(&range))
}

/// One line per row of the used range, taken from its first column.
fn first_column_text(range: &Range<Data>) -> String {
    range
        .rows()
        .map(|row| row.first().map(cell_text).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Falsy cells (empty, zero, `false`, empty string, errors) read as blank.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) | Data::Bool(false) | Data::Int(0) => String::new(),
        Data::Float(f) if *f == 0.0 || f.is_nan() => String::new(),
        other => other.to_string(),
    }
}
