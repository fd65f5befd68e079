//! CSV and spreadsheet export of list rows.
//!
//! Exports are user-initiated conveniences: asking to export an empty list is
//! not an error, it logs a warning and does nothing.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};

use crate::error::ExportError;

/// A flat record as returned by the API.
pub type Record = Map<String, Value>;

/// Formats one cell value for export.
pub type ValueFormatter = Box<dyn Fn(&Value) -> String + Send + Sync>;

pub const CSV_MIME: &str = "text/csv;charset=utf-8";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Projection of a source field into an output column.
pub struct ExportColumn {
    /// Source field name.
    pub key: String,
    /// Output header.
    pub label: String,
    pub format: Option<ValueFormatter>,
}

impl std::fmt::Debug for ExportColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportColumn")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("format", &self.format.is_some())
            .finish()
    }
}

impl ExportColumn {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            format: None,
        }
    }

    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.format = Some(Box::new(format));
        self
    }
}

/// Where finished exports go. The console writes files; tests record calls.
pub trait Download {
    fn download(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Download for FileDownloader {
    fn download(&mut self, filename: &str, mime: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(filename);
        fs::write(&path, bytes).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), mime, bytes = bytes.len(), "export written");
        Ok(path)
    }
}

/// Projects records through `columns`, keying the output by column label.
///
/// Without columns the data is returned unchanged.
pub fn format_data_for_export(data: &[Record], columns: Option<&[ExportColumn]>) -> Vec<Record> {
    let Some(columns) = columns else {
        return data.to_vec();
    };
    data.iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| {
                    let raw = record.get(&col.key).cloned().unwrap_or(Value::Null);
                    let value = match &col.format {
                        Some(format) => Value::String(format(&raw)),
                        None => raw,
                    };
                    (col.label.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Text form of a cell value.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn headers_for(rows: &[Record], columns: Option<&[ExportColumn]>) -> Vec<String> {
    match columns {
        Some(columns) => columns.iter().map(|c| c.label.clone()).collect(),
        None => rows
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default(),
    }
}

/// Renders records as CSV text. Fields with a comma, quote or newline are
/// quoted with inner quotes doubled; rows are joined by `\n`.
pub fn render_csv(data: &[Record], columns: Option<&[ExportColumn]>) -> Result<String, ExportError> {
    let rows = format_data_for_export(data, columns);
    let headers = headers_for(&rows, columns);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in &rows {
        writer.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map(stringify_value).unwrap_or_default()),
        )?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Builds a single-sheet workbook with a header row.
pub fn build_workbook(
    data: &[Record],
    sheet_name: &str,
    columns: Option<&[ExportColumn]>,
) -> Result<Vec<u8>, ExportError> {
    let rows = format_data_for_export(data, columns);
    let headers = headers_for(&rows, columns);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    if !sheet_name.is_empty() {
        sheet.set_name(sheet_name)?;
    }
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, header.as_str())?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        for (col, header) in headers.iter().enumerate() {
            let c = col as u16;
            match row.get(header) {
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => {
                        sheet.write_number(r, c, f)?;
                    }
                    None => {
                        sheet.write_string(r, c, n.to_string())?;
                    }
                },
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(r, c, *b)?;
                }
                Some(Value::Null) | None => {}
                Some(other) => {
                    sheet.write_string(r, c, stringify_value(other))?;
                }
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Exports records as CSV through `sink`.
///
/// Returns `Ok(None)` without touching the sink when there is nothing to
/// export.
pub fn export_to_csv(
    data: &[Record],
    filename: &str,
    columns: Option<&[ExportColumn]>,
    sink: &mut dyn Download,
) -> Result<Option<PathBuf>, ExportError> {
    if data.is_empty() {
        tracing::warn!(filename, "No data to export");
        return Ok(None);
    }
    let csv = render_csv(data, columns)?;
    sink.download(filename, CSV_MIME, csv.as_bytes()).map(Some)
}

/// Exports records as an `.xlsx` workbook through `sink`.
pub fn export_to_excel(
    data: &[Record],
    filename: &str,
    sheet_name: &str,
    columns: Option<&[ExportColumn]>,
    sink: &mut dyn Download,
) -> Result<Option<PathBuf>, ExportError> {
    if data.is_empty() {
        tracing::warn!(filename, "No data to export");
        return Ok(None);
    }
    let bytes = build_workbook(data, sheet_name, columns)?;
    let filename = if filename.ends_with(".xlsx") {
        filename.to_string()
    } else {
        format!("{}.xlsx", filename)
    };
    sink.download(&filename, XLSX_MIME, &bytes).map(Some)
}
