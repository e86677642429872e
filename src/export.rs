//! Export Serializer: a partition back to comma separated text with a date-stamped name.

use crate::error::TimesheetError;
use crate::table::Table;
use crate::timesheet::ProjectedTable;
use chrono::Local;
use chrono::NaiveDate;
use csv::QuoteStyle;
use csv::WriterBuilder;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Date stamp used in exported file names
pub const FILE_DATE_FORMAT: &str = "%d-%m-%Y";

/// A downloadable CSV produced on request, never kept by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    /// UTF-8 CSV text, header row first
    pub contents: String,
}

impl ExportArtifact {
    /// Writes the artifact into `dir`, creating the directory when needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, TimesheetError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, self.contents.as_bytes())?;
        tracing::info!(path = %path.display(), bytes = self.contents.len(), "saved export");
        Ok(path)
    }
}

/// Today's date from the local clock, the creation date of an artifact.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `{base_name}_{DD-MM-YYYY}.csv`
pub fn file_name(base_name: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", base_name, date.format(FILE_DATE_FORMAT))
}

/// Serializes a projected table, extra hours written as `HH:MM`.
pub fn export(table: &ProjectedTable, base_name: &str, date: NaiveDate) -> Result<ExportArtifact, TimesheetError> {
    let contents = write_csv(&table.columns, table.records.iter().map(|record| record.cells()))?;
    Ok(ExportArtifact {
        file_name: file_name(base_name, date),
        contents,
    })
}

/// Serializes a raw table under a caller chosen file name.
pub fn export_table(table: &Table, file_name: &str) -> Result<ExportArtifact, TimesheetError> {
    let contents = write_csv(&table.columns, table.rows.iter())?;
    Ok(ExportArtifact {
        file_name: file_name.to_owned(),
        contents,
    })
}

fn write_csv<H, R>(header: H, rows: impl Iterator<Item = R>) -> Result<String, TimesheetError>
where
    H: IntoIterator,
    H::Item: AsRef<[u8]>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| TimesheetError::IoError(error.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
