//! # Tabular Parser
//!
//! Turns an uploaded file into a [`Table`]. The format is decided by the file
//! extension alone:
//!
//! - `.csv`: comma separated text
//! - `.txt`: tab separated text
//! - `.xlsx`: first worksheet of an Office Open XML workbook
//!
//! Every failure surfaces as [`TimesheetError::ParseError`] carrying the text
//! of the stage that failed. Column names are not checked here.
pub(crate) mod cell;
pub(crate) mod delimited;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

use crate::error::ResultMessage;
use crate::error::TimesheetError;
use crate::helpers::reader::Upload;
use crate::spreadsheet::delimited::DelimitedReader;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::table::Table;
use std::fmt::Display;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported file '{0}': expected .csv, .xlsx or .txt")]
    UnsupportedFileError(String),

    #[error("Spreadsheet '{0}' is password protected")]
    SpreadsheetPasswordProtectedError(String),

    #[error("Spreadsheet '{0}' has no worksheet")]
    SpreadsheetEmptyError(String),

    #[error("Sheet '{1}' in '{0}' has no data")]
    SheetEmptyError(String, String),

    #[error("Part '{0}' is missing from the workbook")]
    FileError(String),

    #[error("Invalid cell value in '{0}' sheet '{1}' at {2}: '{3}'")]
    CellValueError(String, String, String, String),

    #[error("Serial date '{0}' is out of range")]
    SerialOutOfRangeError(String),

    #[error("Invalid cell reference in '{0}' sheet '{1}': '{2}'")]
    CellReferenceError(String, String, String),

    #[error("Missing header row in '{0}'")]
    MissingHeaderRow(String),

    #[error("Line {0}: expected {1} fields, saw {2}")]
    RaggedRowError(u64, usize, usize),
}

/// Upload formats, told apart by file extension only.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileFormat {
    /// `.csv`, comma separated
    Csv,
    /// `.xlsx`, spreadsheet binary
    Xlsx,
    /// `.txt`, tab separated
    Txt,
}

impl FileFormat {
    /// Detects the format from the extension of `file_name` (case-insensitive).
    pub fn detect(file_name: &str) -> Result<Self, TimesheetError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Xlsx),
            Some("txt") => Ok(Self::Txt),
            _ => Err(TimesheetError::ParseError(
                SpreadsheetError::UnsupportedFileError(file_name.to_owned()).to_string(),
            )),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Txt => "txt",
        }
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses an upload into a table, dispatching on its extension.
pub fn parse(upload: &Upload) -> Result<Table, TimesheetError> {
    let format = FileFormat::detect(&upload.name)?;
    parse_as(upload, format)
}

/// Parses an upload with an explicit format.
pub fn parse_as(upload: &Upload, format: FileFormat) -> Result<Table, TimesheetError> {
    let result = match format {
        FileFormat::Csv => DelimitedReader::comma().read(&upload.name, &upload.bytes),
        FileFormat::Txt => DelimitedReader::tab().read(&upload.name, &upload.bytes),
        FileFormat::Xlsx => XlsxWorkbook::open(&upload.name, &upload.bytes, upload.cursor())
            .and_then(|mut workbook| workbook.read_first_sheet())
            .with_prefix(&upload.name),
    };
    let table = result.map_err(TimesheetError::into_parse_error)?;
    tracing::debug!(file = %upload.name, %format, columns = table.columns.len(), rows = table.len(), "parsed upload");
    Ok(table)
}
