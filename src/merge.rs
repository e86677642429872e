//! Multi-file Concatenator: several CSV exports glued into one.

use crate::error::TimesheetError;
use crate::export::export_table;
use crate::export::ExportArtifact;
use crate::helpers::reader::Upload;
use crate::spreadsheet;
use crate::spreadsheet::FileFormat;
use crate::table::Table;
use std::path::PathBuf;

/// File name suggested for the combined output
pub const DEFAULT_OUTPUT_NAME: &str = "combinado.csv";

/// An input that could not be read, with the reason
#[derive(Debug)]
pub struct MergeFailure {
    pub file_name: String,
    pub error: TimesheetError,
}

/// Result of a concatenation: the combined file, if anything parsed, and every failure.
#[derive(Debug)]
pub struct MergeOutcome {
    pub artifact: Option<ExportArtifact>,
    pub failures: Vec<MergeFailure>,
    /// Number of inputs that made it into the output
    pub merged: usize,
}

impl MergeOutcome {
    /// The artifact, or `NoValidInputError` when no input parsed
    pub fn into_result(self) -> Result<ExportArtifact, TimesheetError> {
        self.artifact.ok_or(TimesheetError::NoValidInputError)
    }
}

/// Parses every upload as comma separated text and appends them in order.
///
/// A file that fails to parse is recorded in `failures` and skipped; the others
/// still go through.
pub fn concat_csv(uploads: &[Upload], output_name: &str) -> Result<MergeOutcome, TimesheetError> {
    let mut tables = Vec::<Table>::with_capacity(uploads.len());
    let mut failures = Vec::<MergeFailure>::new();
    for upload in uploads {
        match spreadsheet::parse_as(upload, FileFormat::Csv) {
            Ok(table) => tables.push(table),
            Err(error) => {
                tracing::warn!(file = %upload.name, %error, "skipping unreadable file");
                failures.push(MergeFailure {
                    file_name: upload.name.to_owned(),
                    error,
                });
            }
        }
    }

    let merged = tables.len();
    let artifact = if tables.is_empty() {
        None
    } else {
        let combined = Table::concat(&tables);
        tracing::info!(files = merged, rows = combined.len(), output = output_name, "merged csv files");
        Some(export_table(&combined, output_name)?)
    };
    Ok(MergeOutcome {
        artifact,
        failures,
        merged,
    })
}

/// Reads the files at `paths` and concatenates them.
///
/// A file that cannot be read from disk is a failure like one that does not
/// parse.
pub fn concat_files(paths: &[PathBuf], output_name: &str) -> Result<MergeOutcome, TimesheetError> {
    let mut uploads = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match Upload::open(path) {
            Ok(upload) => uploads.push(upload),
            Err(error) => {
                tracing::warn!(file = %path.display(), %error, "skipping unreadable file");
                unreadable.push(MergeFailure {
                    file_name: path.display().to_string(),
                    error,
                });
            }
        }
    }
    let mut outcome = concat_csv(&uploads, output_name)?;
    unreadable.append(&mut outcome.failures);
    outcome.failures = unreadable;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_malformed_file() {
        let uploads = [
            Upload::new("janeiro.csv", "Colaborador,CPF\nAna,111\nBia,222\n"),
            Upload::new("quebrado.csv", "Colaborador,CPF\nCaio,333,extra\n"),
            Upload::new("fevereiro.csv", "Colaborador,CPF\nDani,444\n"),
        ];
        let outcome = concat_csv(&uploads, DEFAULT_OUTPUT_NAME).unwrap();
        assert_eq!(outcome.merged, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_name, "quebrado.csv");
        assert!(matches!(outcome.failures[0].error, TimesheetError::ParseError(_)));

        let artifact = outcome.into_result().unwrap();
        assert_eq!(artifact.file_name, "combinado.csv");
        assert_eq!(artifact.contents, "Colaborador,CPF\nAna,111\nBia,222\nDani,444\n");
    }

    #[test]
    fn nothing_valid_is_an_error() {
        let uploads = [Upload::new("vazio.csv", ""), Upload::new("ruim.csv", "a\n1,2\n")];
        let outcome = concat_csv(&uploads, DEFAULT_OUTPUT_NAME).unwrap();
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(outcome.into_result(), Err(TimesheetError::NoValidInputError)));
    }

    #[test]
    fn differing_headers_are_unioned() {
        let uploads = [
            Upload::new("a.csv", "Colaborador,CPF\nAna,111\n"),
            Upload::new("b.csv", "Colaborador,Data\nBia,2024-01-02\n"),
        ];
        let artifact = concat_csv(&uploads, "saida.csv").unwrap().into_result().unwrap();
        assert_eq!(artifact.contents, "Colaborador,CPF,Data\nAna,111,\nBia,,2024-01-02\n");
    }

    #[test]
    fn inputs_are_read_as_csv_whatever_their_name() {
        let uploads = [Upload::new("exportado.txt", "a,b\n1,2\n")];
        let artifact = concat_csv(&uploads, "saida.csv").unwrap().into_result().unwrap();
        assert_eq!(artifact.contents, "a,b\n1,2\n");
    }

    #[test]
    fn missing_files_are_failures() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("janeiro.csv");
        std::fs::write(&present, "Colaborador,CPF\nAna,111\n").unwrap();
        let missing = dir.path().join("sumiu.csv");

        let outcome = concat_files(&[missing, present], DEFAULT_OUTPUT_NAME).unwrap();
        assert_eq!(outcome.merged, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].file_name.ends_with("sumiu.csv"));
        assert!(matches!(outcome.failures[0].error, TimesheetError::IoError(_)));
        assert_eq!(outcome.into_result().unwrap().contents, "Colaborador,CPF\nAna,111\n");
    }
}
