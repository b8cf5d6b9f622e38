//! The tables of a report, independently of the document they were read from.

/// A row is an ordered list of cleaned cell texts.
pub type Row = Vec<String>;

/// Read access to an ordered sequence of tables.
///
/// Readers of concrete documents (spreadsheets, CSV files, test fixtures) implement this
/// capability. Cells are expected to be cleaned already, see [clean_cell].
pub trait TabularSource {
    fn table_count(&self) -> usize;

    /// The rows of the table at `index`, or `None` past the end.
    fn table(&self, index: usize) -> Option<&[Row]>;
}

/// Report cells often carry regular spaces and non-breaking spaces around the text.
pub fn clean_cell(text: &str) -> String {
    text.trim_matches(|c| c == ' ' || c == '\u{00A0}').to_string()
}

/// All the tables held in memory.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Tables {
    tables: Vec<Vec<Row>>,
}

impl Tables {
    pub fn new() -> Tables {
        Tables { tables: Vec::new() }
    }

    /// Appends a table. Every cell goes through [clean_cell].
    pub fn push_table<R, C>(&mut self, rows: R)
    where
        R: IntoIterator<Item = Vec<C>>,
        C: AsRef<str>,
    {
        let table: Vec<Row> = rows
            .into_iter()
            .map(|row| row.iter().map(|c| clean_cell(c.as_ref())).collect())
            .collect();
        self.tables.push(table);
    }
}

impl TabularSource for Tables {
    fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn table(&self, index: usize) -> Option<&[Row]> {
        self.tables.get(index).map(|t| t.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_lose_surrounding_blanks() {
        assert_eq!(clean_cell("\u{00A0} 1185\u{00A0}"), "1185");
        assert_eq!(clean_cell("City of Milwaukee Ward 1 "), "City of Milwaukee Ward 1");
        assert_eq!(clean_cell("a\u{00A0}b"), "a\u{00A0}b");
    }

    #[test]
    fn tables_are_indexed_in_order() {
        let mut tables = Tables::new();
        tables.push_table(vec![vec!["x"]]);
        tables.push_table(vec![vec![" 1 ", "2\u{00A0}"], vec!["3", "4"]]);
        assert_eq!(tables.table_count(), 2);
        let second = tables.table(1).unwrap();
        assert_eq!(second[0], vec!["1".to_string(), "2".to_string()]);
        assert!(tables.table(2).is_none());
    }
}
