use crate::tables::{Table, ID_COLUMN};
use crate::types::{Case, LabelMap};
use std::collections::BTreeSet;

/// One case's row of a [`LabelTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub case_id: String,
    /// One value per column of the owning table, in column order
    pub values: Vec<bool>,
}

/// Wide table of labels across cases
///
/// Columns are the union of every diagnosis seen in any case, sorted by
/// name so the schema does not depend on the order cases were processed in.
/// A diagnosis missing from a case is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelTable {
    columns: Vec<String>,
    rows: Vec<LabelRow>,
}

impl LabelTable {
    /// Builds the table from `(case id, labels)` pairs; rows keep input order
    ///
    /// # Example
    ///
    /// ```
    /// use cxrprep_core::labels::LabelTable;
    /// use cxrprep_core::LabelMap;
    ///
    /// let a = LabelMap::from([("asthma".to_string(), true)]);
    /// let b = LabelMap::from([("fracture".to_string(), true)]);
    ///
    /// let table = LabelTable::unify([("A", &a), ("B", &b)]);
    /// assert_eq!(table.header(), vec!["ID", "asthma", "fracture"]);
    /// assert_eq!(table.rows()[0].values, vec![true, false]);
    /// assert_eq!(table.rows()[1].values, vec![false, true]);
    /// ```
    pub fn unify<'a, I>(cases: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a LabelMap)>,
    {
        let cases: Vec<_> = cases.into_iter().collect();

        let columns: Vec<String> = cases
            .iter()
            .flat_map(|(_, labels)| labels.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = cases
            .iter()
            .map(|(case_id, labels)| LabelRow {
                case_id: case_id.to_string(),
                values: columns
                    .iter()
                    .map(|diagnosis| labels.get(diagnosis).copied().unwrap_or(false))
                    .collect(),
            })
            .collect();

        Self { columns, rows }
    }

    /// Builds the table from the labels held by `cases`
    pub fn from_cases(cases: &[Case]) -> Self {
        Self::unify(cases.iter().map(|c| (c.id.as_str(), &c.labels)))
    }

    /// Diagnosis columns (without the id column)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[LabelRow] {
        &self.rows
    }

    /// Full header: `ID` followed by the diagnosis columns
    pub fn header(&self) -> Vec<String> {
        std::iter::once(ID_COLUMN.to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    /// Looks up one cell
    pub fn value(&self, case_id: &str, diagnosis: &str) -> Option<bool> {
        let column = self.columns.iter().position(|c| c == diagnosis)?;
        self.rows
            .iter()
            .find(|row| row.case_id == case_id)
            .map(|row| row.values[column])
    }

    /// Converts to a string table for CSV output
    pub fn to_table(&self) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(row.case_id.clone())
                    .chain(row.values.iter().map(|v| v.to_string()))
                    .collect()
            })
            .collect();
        Table::new(self.header(), rows)
    }
}
