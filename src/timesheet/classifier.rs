use crate::error::TimesheetError;
use crate::table::Table;
use crate::timesheet::band::Band;
use crate::timesheet::projector::project;
use crate::timesheet::projector::Columns;
use crate::timesheet::projector::ProjectedTable;

/// The projected table and its three numbered partitions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    base: ProjectedTable,
    from_2_to_3: ProjectedTable,
    from_3_to_4: ProjectedTable,
    above_4: ProjectedTable,
}

impl Classification {
    /// The rows of one band
    pub fn partition(&self, band: Band) -> &ProjectedTable {
        match band {
            Band::All => &self.base,
            Band::From2To3 => &self.from_2_to_3,
            Band::From3To4 => &self.from_3_to_4,
            Band::Above4 => &self.above_4,
        }
    }

    pub fn base(&self) -> &ProjectedTable {
        &self.base
    }
}

/// Projects `table` and splits it by extra hours.
///
/// Pure function of its input: classifying the same table twice gives equal results.
pub fn classify(table: &Table, columns: &Columns) -> Result<Classification, TimesheetError> {
    let base = project(table, columns)?;
    let split = |band: Band| base.filter(|record| band.contains(record.extra_hours));
    let classification = Classification {
        from_2_to_3: split(Band::From2To3),
        from_3_to_4: split(Band::From3To4),
        above_4: split(Band::Above4),
        base,
    };
    tracing::debug!(
        rows = classification.base.len(),
        from_2_to_3 = classification.from_2_to_3.len(),
        from_3_to_4 = classification.from_3_to_4.len(),
        above_4 = classification.above_4.len(),
        "classified extra hours"
    );
    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timesheet::time::TimeOfDay;

    fn timesheet(hours: &[&str]) -> Table {
        let columns = ["Colaborador", "Função", "Data", "Horas Extr.", "CPF", "Setor"];
        Table::new(
            columns.iter().map(|column| column.to_string()).collect(),
            hours
                .iter()
                .enumerate()
                .map(|(index, hour)| {
                    vec![
                        format!("Pessoa {index}"),
                        "Motorista".to_owned(),
                        "2024-01-15".to_owned(),
                        hour.to_string(),
                        format!("{index:011}"),
                        "Logística".to_owned(),
                    ]
                })
                .collect(),
        )
    }

    fn hours_of(table: &ProjectedTable) -> Vec<String> {
        table.records.iter().map(|record| record.cells()[3].to_owned()).collect()
    }

    #[test]
    fn partitions_sample_timesheet() {
        let table = timesheet(&["01:30", "02:30", "03:30", "04:30", "05:00"]);
        let classification = classify(&table, &Columns::default()).unwrap();
        assert_eq!(classification.partition(Band::All).len(), 5);
        assert_eq!(hours_of(classification.partition(Band::From2To3)), vec!["02:30"]);
        assert_eq!(hours_of(classification.partition(Band::From3To4)), vec!["03:30"]);
        assert_eq!(hours_of(classification.partition(Band::Above4)), vec!["04:30", "05:00"]);
    }

    #[test]
    fn boundary_minutes_fall_in_no_band() {
        let table = timesheet(&["02:00", "02:59", "03:00", "03:59", "04:00", "04:01"]);
        let classification = classify(&table, &Columns::default()).unwrap();
        assert_eq!(classification.base().len(), 6);
        assert!(classification.partition(Band::From2To3).is_empty());
        assert!(classification.partition(Band::From3To4).is_empty());
        assert_eq!(hours_of(classification.partition(Band::Above4)), vec!["04:01"]);
    }

    #[test]
    fn classification_is_idempotent() {
        let table = timesheet(&["02:15", "", "03:45", "06:10"]);
        let first = classify(&table, &Columns::default()).unwrap();
        let second = classify(&table, &Columns::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_hours_stay_in_base_only() {
        let table = timesheet(&["", "04:30"]);
        let classification = classify(&table, &Columns::default()).unwrap();
        assert_eq!(classification.base().len(), 2);
        assert_eq!(classification.partition(Band::Above4).records[0].extra_hours, TimeOfDay::new(4, 30));
        assert_eq!(classification.partition(Band::Above4).len(), 1);
    }

    #[test]
    fn partitions_keep_projection_order() {
        let table = timesheet(&["05:00", "04:30", "07:15"]);
        let classification = classify(&table, &Columns::default()).unwrap();
        let names: Vec<&str> = classification
            .partition(Band::Above4)
            .records
            .iter()
            .map(|record| record.employee.as_str())
            .collect();
        assert_eq!(names, vec!["Pessoa 0", "Pessoa 1", "Pessoa 2"]);
    }

    #[test]
    fn one_bad_time_fails_everything() {
        let table = timesheet(&["02:30", "02:30:00"]);
        assert!(matches!(classify(&table, &Columns::default()), Err(TimesheetError::FormatError(_))));
    }

    #[test]
    fn increasing_times_cross_thresholds_in_order() {
        let mut previous = None::<usize>;
        for hour in 0..24u8 {
            for minute in 0..60u8 {
                let time = TimeOfDay::new(hour, minute);
                let rank = Band::ALL[1..].iter().position(|band| band.contains(time));
                if let (Some(previous), Some(rank)) = (previous, rank) {
                    assert!(previous <= rank, "{time:?} went back to band {rank}");
                }
                if rank.is_some() {
                    previous = rank;
                }
            }
        }
    }
}
