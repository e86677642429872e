use crate::error::TimesheetError;
use crate::helpers::string::decode_text;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Table;
use csv::ReaderBuilder;
use csv::Trim;

/// Delimited text reader; the first record is the header
pub(crate) struct DelimitedReader {
    /// Field separator
    delimiter: u8,
}

impl DelimitedReader {
    pub(crate) fn comma() -> Self {
        Self { delimiter: b',' }
    }

    pub(crate) fn tab() -> Self {
        Self { delimiter: b'\t' }
    }

    /// Parses the whole upload into a table
    ///
    /// Records shorter than the header are padded with empty cells;
    /// longer ones fail with the line they came from.
    pub(crate) fn read(&self, file_name: &str, bytes: &[u8]) -> Result<Table, TimesheetError> {
        let content = decode_text(bytes);
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        if columns.is_empty() {
            Err(SpreadsheetError::MissingHeaderRow(file_name.to_owned()))?
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() > columns.len() {
                let line = record.position().map(|position| position.line()).unwrap_or_default();
                Err(SpreadsheetError::RaggedRowError(line, columns.len(), record.len()))?
            }
            let mut row: Vec<String> = record.iter().map(str::to_owned).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }
        Ok(Table::new(columns, rows))
    }
}
