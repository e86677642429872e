use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::MAX_COLS;
use crate::spreadsheet::reference::MAX_ROWS;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Table;

/// Cells collected from one worksheet, in document order.
pub(crate) struct Sheet {
    /// Source file name
    pub(crate) file_name: String,
    /// Sheet name
    pub(crate) name: String,
    /// Non-empty cells
    pub(crate) cells: Vec<Cell>,
    /// Actual data range (determined from cell data)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(super) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Adds a cell and widens the data range around it.
    /// Cells beyond `XFD1048576` are refused.
    pub(super) fn push(&mut self, cell: Cell) -> Result<(), SpreadsheetError> {
        if cell.row >= MAX_ROWS || cell.col >= MAX_COLS {
            return Err(SpreadsheetError::CellReferenceError(
                self.file_name.to_owned(),
                self.name.to_owned(),
                index_to_reference(cell.row, cell.col),
            ));
        }
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
        Ok(())
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }

    /// Lays the cells out as a table.
    ///
    /// The first row holding data is the header; blank header cells are named
    /// `Unnamed: N` by their position. Rows without any cell are skipped.
    pub(crate) fn into_table(self) -> Result<Table, SpreadsheetError> {
        let (Some(row_lower), Some(col_lower), Some(col_upper)) =
            (self.row_lower_bound, self.col_lower_bound, self.col_upper_bound)
        else {
            return Err(SpreadsheetError::SheetEmptyError(self.file_name, self.name));
        };
        let width = col_upper - col_lower + 1;

        let mut columns: Vec<String> = (0..width).map(|index| format!("Unnamed: {index}")).collect();
        let mut rows = Vec::<Vec<String>>::new();
        let mut current = None::<usize>;
        for cell in self.cells {
            let col = cell.col - col_lower;
            if cell.row == row_lower {
                if !cell.value.is_empty() {
                    columns[col] = cell.value;
                }
                continue;
            }
            if current != Some(cell.row) {
                current = Some(cell.row);
                rows.push(vec![String::new(); width]);
            }
            if let Some(record) = rows.last_mut() {
                record[col] = cell.value;
            }
        }
        Ok(Table::new(columns, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
        sheet
            .push(Cell {
                row,
                col,
                value: value.to_owned(),
            })
            .unwrap();
    }

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("", "");

        assert!(sheet.cells.is_empty());
        assert_eq!(sheet.row_lower_bound, None);
        assert_eq!(sheet.row_upper_bound, None);
        assert_eq!(sheet.col_lower_bound, None);
        assert_eq!(sheet.col_upper_bound, None);
    }

    #[test]
    fn sheet_update() {
        let mut sheet = Sheet::new("", "");
        push(&mut sheet, 1, 1, "a");
        push(&mut sheet, 1, 3, "b");
        push(&mut sheet, 3, 1, "c");
        push(&mut sheet, 3, 3, "d");

        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.row_lower_bound, Some(1));
        assert_eq!(sheet.row_upper_bound, Some(3));
        assert_eq!(sheet.col_lower_bound, Some(1));
        assert_eq!(sheet.col_upper_bound, Some(3));
    }

    #[test]
    fn sheet_to_table() {
        let mut sheet = Sheet::new("", "");
        push(&mut sheet, 1, 1, "Colaborador");
        push(&mut sheet, 1, 3, "CPF");
        push(&mut sheet, 2, 1, "Ana");
        push(&mut sheet, 2, 3, "111");
        push(&mut sheet, 4, 2, "x");

        let table = sheet.into_table().unwrap();
        assert_eq!(table.columns, vec!["Colaborador", "Unnamed: 1", "CPF"]);
        assert_eq!(table.rows, vec![vec!["Ana", "", "111"], vec!["", "x", ""]]);
    }

    #[test]
    fn leading_blank_rows_are_skipped_before_the_header() {
        let mut sheet = Sheet::new("horas.xlsx", "Plan1");
        push(&mut sheet, 3, 0, "Colaborador");
        push(&mut sheet, 3, 1, "CPF");
        push(&mut sheet, 4, 0, "Ana");
        push(&mut sheet, 4, 1, "111");

        let table = sheet.into_table().unwrap();
        assert_eq!(table.columns, vec!["Colaborador", "CPF"]);
        assert_eq!(table.rows, vec![vec!["Ana", "111"]]);
    }

    #[test]
    fn cells_past_the_last_column_are_refused() {
        let mut sheet = Sheet::new("horas.xlsx", "Plan1");
        let error = sheet
            .push(Cell {
                row: 1,
                col: MAX_COLS,
                value: "x".to_owned(),
            })
            .unwrap_err();
        assert!(matches!(error, SpreadsheetError::CellReferenceError(_, _, reference) if reference == "XFE2"));
        assert!(sheet.cells.is_empty());
        assert_eq!(sheet.col_upper_bound, None);
    }

    #[test]
    fn empty_sheet_is_an_error() {
        let sheet = Sheet::new("horas.xlsx", "Plan1");
        let error = sheet.into_table().unwrap_err();
        assert!(matches!(error, SpreadsheetError::SheetEmptyError(_, _)));
    }
}
