/// An ordered set of rows sharing one header, every cell kept as text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Header names in file order
    pub columns: Vec<String>,
    /// Rows, each exactly `columns.len()` cells long
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Index of a column by exact, case-sensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends tables one after another.
    ///
    /// The header is the union of all headers in first-seen order; a row from a
    /// table lacking some column gets an empty cell there.
    pub fn concat(tables: &[Table]) -> Table {
        let mut columns = Vec::<String>::new();
        for table in tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.to_owned());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(Table::len).sum());
        for table in tables {
            let mapping: Vec<Option<usize>> = columns
                .iter()
                .map(|column| table.column_index(column))
                .collect();
            for row in &table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|index| index.and_then(|index| row.get(index).cloned()).unwrap_or_default())
                        .collect(),
                );
            }
        }
        Table { columns, rows }
    }
}
