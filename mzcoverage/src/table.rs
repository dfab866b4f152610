//! The in memory tables that flow between the stages of the pipeline
use std::borrow::Cow;

use context_error::*;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::helper_functions::similar_names;

/// A single cell in a [`Table`].
///
/// Values are totally ordered and hashable so they can be used directly as grouping keys. Floating
/// point values are wrapped in [`OrderedFloat`] for this reason.
#[derive(
    Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(untagged)]
pub enum Value {
    /// A missing value
    #[default]
    Null,
    /// A boolean
    Boolean(bool),
    /// A whole number
    Integer(i64),
    /// A floating point number
    Float(OrderedFloat<f64>),
    /// Any text
    Text(String),
}

impl Value {
    /// Check if this value is missing
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the text if this is a textual value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the whole number if this is an integer value
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Get a textual representation of this value, numbers and booleans are formatted, a missing
    /// value or the literal text `NA` gives `None`.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Text(text) if text == "NA" => None,
            Self::Text(text) => Some(Cow::Borrowed(text)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(OrderedFloat(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A table with named columns, the exchange format between the pipeline stages.
///
/// Every row has exactly as many values as there are columns. No stage ever changes a table it did
/// not create, each stage builds a new table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from rows that are known to have the right width
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self { columns, rows }
    }

    /// Add a row to this table.
    /// # Errors
    /// If the number of values does not match the number of columns.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), BoxedError<'static, BasicKind>> {
        if row.len() == self.columns.len() {
            self.rows.push(row);
            Ok(())
        } else {
            Err(BoxedError::new(
                BasicKind::Error,
                "Invalid row",
                format!(
                    "This row has {} values while the table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
                Context::show(row.iter().join("\t")),
            ))
        }
    }

    /// The column names, in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check if the table has a column with this name
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Get the index of the given column.
    /// # Errors
    /// If the column does not exist, the closest column names are given as suggestions.
    pub fn column_index(&self, name: &str) -> Result<usize, BoxedError<'static, BasicKind>> {
        self.columns.iter().position(|c| c == name).ok_or_else(|| {
            BoxedError::new(
                BasicKind::Error,
                "Missing column",
                format!("The column '{name}' does not exist in this table"),
                Context::show(self.columns.join(", ")),
            )
            .suggestions(similar_names(
                name,
                self.columns.iter().map(String::as_str),
            ))
        })
    }

    /// Make sure a column that is about to be added does not exist yet.
    /// # Errors
    /// If a column with this name already exists.
    pub(crate) fn check_new_column(
        &self,
        name: &str,
    ) -> Result<(), BoxedError<'static, BasicKind>> {
        if self.has_column(name) {
            Err(BoxedError::new(
                BasicKind::Error,
                "Duplicate column",
                format!("The column '{name}' would be added but already exists in this table, rename the existing column or choose another output name"),
                Context::show(self.columns.join(", ")),
            ))
        } else {
            Ok(())
        }
    }

    /// Get all values for the given column.
    /// # Errors
    /// If the column does not exist.
    pub fn column(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = &Value> + use<'_>, BoxedError<'static, BasicKind>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[index]))
    }

    /// Get a single value, if the row and column exist
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|row| &row[index])
    }

    /// Create a new table with only the given columns, in the given order.
    /// # Errors
    /// If any of the columns does not exist.
    pub fn select(
        &self,
        columns: &[impl AsRef<str>],
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            self.rows
                .iter()
                .map(|row| indices.iter().map(|i| row[*i].clone()).collect())
                .collect(),
        ))
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            writeln!(f, "{}", row.iter().join("\t"))?;
        }
        Ok(())
    }
}

/// Build a [`Table`] from literal values. The column names are given first, followed by a `;` and
/// the rows as arrays. Every value is converted with [`Value::from`].
/// ```rust
/// # use mzcoverage::{table, table::Value};
/// let table = table!("sequence", "condition"; ["PEPTIDE", "control"], ["PEPTIDER", Value::Null]);
/// assert_eq!(table.len(), 2);
/// ```
/// # Panics
/// If any row does not have as many values as there are columns.
#[macro_export]
macro_rules! table {
    ($($column:expr),+ $(,)?; $([$($value:expr),* $(,)?]),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut table = $crate::table::Table::new([$($column),+]);
        $(
            if let Err(error) = table.push_row(vec![$($crate::table::Value::from($value)),*]) {
                panic!("{error}");
            }
        )*
        table
    }};
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_suggests() {
        let table = table!("Peptide", "Condition"; ["AAK", "a"]);
        let error = table.column_index("peptide").unwrap_err();
        assert!(error.to_string().contains("Peptide"));
        assert_eq!(table.column_index("Condition").unwrap(), 1);
    }

    #[test]
    fn wrong_row_width() {
        let mut table = Table::new(["a", "b"]);
        assert!(table.push_row(vec![Value::Null]).is_err());
        assert!(table.push_row(vec![Value::Null, Value::from(1)]).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn select_reorders() {
        let table = table!("a", "b", "c"; [1, 2, 3], [4, 5, 6]);
        let selected = table.select(&["c", "a"]).unwrap();
        assert_eq!(selected.columns(), ["c", "a"]);
        assert_eq!(selected.rows()[1], vec![Value::from(6), Value::from(4)]);
        assert!(table.select(&["d"]).is_err());
    }

    #[test]
    fn text_of_values() {
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::from("NA").to_text(), None);
        assert_eq!(Value::from(42.0).to_text().as_deref(), Some("42"));
        assert_eq!(Value::from(-3).to_text().as_deref(), Some("-3"));
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Value::from(None::<&str>), Value::Null);
    }

    #[test]
    fn values_deserialise_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 2.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Boolean(true),
                Value::Integer(3),
                Value::from(2.5),
                Value::from("text")
            ]
        );
    }
}
