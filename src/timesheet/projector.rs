use crate::error::TimesheetError;
use crate::table::Table;
use crate::timesheet::time::TimeOfDay;
use serde::Deserialize;
use serde::Serialize;

/// Names of the five columns the pipeline reads, matched exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub employee: String,
    pub role: String,
    pub date: String,
    pub extra_hours: String,
    pub id_number: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            employee: "Colaborador".to_owned(),
            role: "Função".to_owned(),
            date: "Data".to_owned(),
            extra_hours: "Horas Extr.".to_owned(),
            id_number: "CPF".to_owned(),
        }
    }
}

impl Columns {
    /// Names in projection order
    pub fn names(&self) -> [&str; 5] {
        [
            self.employee.as_str(),
            self.role.as_str(),
            self.date.as_str(),
            self.extra_hours.as_str(),
            self.id_number.as_str(),
        ]
    }
}

/// One row of the projected table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectedRecord {
    pub employee: String,
    pub role: String,
    pub date: String,
    /// `None` when the cell was empty
    pub extra_hours: Option<TimeOfDay>,
    pub id_number: String,
}

impl ProjectedRecord {
    /// Cells in projection order, extra hours as `HH:MM`
    pub fn cells(&self) -> [String; 5] {
        [
            self.employee.to_owned(),
            self.role.to_owned(),
            self.date.to_owned(),
            self.extra_hours.map(|time| time.to_string()).unwrap_or_default(),
            self.id_number.to_owned(),
        ]
    }
}

/// A table restricted to the five pipeline columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectedTable {
    /// Header, as named in the source
    pub columns: [String; 5],
    pub records: Vec<ProjectedRecord>,
}

impl ProjectedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A new table with the records matching `predicate`, order preserved
    pub fn filter<F>(&self, predicate: F) -> ProjectedTable
    where
        F: Fn(&ProjectedRecord) -> bool,
    {
        ProjectedTable {
            columns: self.columns.clone(),
            records: self.records.iter().filter(|record| predicate(record)).cloned().collect(),
        }
    }
}

/// Selects the five columns from `table`, in order, parsing the extra-hours cells.
///
/// Fails with `MissingColumnError` naming the first absent column, or with
/// `FormatError` on the first extra-hours cell that is not `HH:MM`.
pub fn project(table: &Table, columns: &Columns) -> Result<ProjectedTable, TimesheetError> {
    let mut indexes = [0usize; 5];
    for (slot, name) in indexes.iter_mut().zip(columns.names()) {
        *slot = table
            .column_index(name)
            .ok_or_else(|| TimesheetError::MissingColumnError(name.to_owned()))?;
    }
    let [employee, role, date, extra_hours, id_number] = indexes;

    let mut records = Vec::with_capacity(table.len());
    for (line, row) in table.rows.iter().enumerate() {
        let cell = |index: usize| row.get(index).cloned().unwrap_or_default();
        let hours = cell(extra_hours);
        let extra_hours = if hours.is_empty() {
            None
        } else {
            let time = TimeOfDay::parse(&hours).map_err(|error| {
                TimesheetError::FormatError(format!("{} (linha {})", error, line + 1))
            })?;
            Some(time)
        };
        records.push(ProjectedRecord {
            employee: cell(employee),
            role: cell(role),
            date: cell(date),
            extra_hours,
            id_number: cell(id_number),
        });
    }

    Ok(ProjectedTable {
        columns: columns.names().map(str::to_owned),
        records,
    })
}
