use std::collections::HashMap;

use context_error::*;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    helper_functions::canonical_mass_key,
    modification::ModificationFormat,
    table::{Table, Value},
};

/// The output column with the position of the modification on the stripped peptide
pub const PTM_POSITION: &str = "PTM_position";
/// The output column with the modification type, only present when annotating
pub const PTM_TYPE: &str = "PTM_type";
/// The output column with the number of rows an identification was expanded into
pub const REPS: &str = "reps";

/// The name of the output column that holds the modification mass, `PTM_mass` by default
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MassColumn(String);

impl MassColumn {
    /// Use the given column name for the modification mass
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The column name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MassColumn {
    fn default() -> Self {
        Self("PTM_mass".to_string())
    }
}

impl From<&str> for MassColumn {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MassColumn {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for MassColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The parameters for [`normalise`] and [`strip_sequence`]
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct NormaliseParameters {
    /// The column with the modified sequences (or the modification lists for list notations)
    pub modification_column: String,
    /// The notation of the modifications
    pub format: ModificationFormat,
    /// The column with the plain sequence, needed for [`ModificationFormat::requires_sequence`]
    pub sequence_column: Option<String>,
    /// Add a [`PTM_TYPE`] column by looking up the masses in the PTM table
    pub annotate: bool,
    /// The output column for the modification masses
    pub mass_column: MassColumn,
}

impl Default for NormaliseParameters {
    fn default() -> Self {
        Self {
            modification_column: "Peptide".to_string(),
            format: ModificationFormat::default(),
            sequence_column: None,
            annotate: false,
            mass_column: MassColumn::default(),
        }
    }
}

impl NormaliseParameters {
    /// Read the given column with the given format, without annotation
    pub fn new(modification_column: impl Into<String>, format: ModificationFormat) -> Self {
        Self {
            modification_column: modification_column.into(),
            format,
            ..Self::default()
        }
    }

    /// Set the column with the plain sequence
    #[must_use]
    pub fn with_sequence_column(self, column: impl Into<String>) -> Self {
        Self {
            sequence_column: Some(column.into()),
            ..self
        }
    }

    /// Set whether the modification types should be annotated
    #[must_use]
    pub fn with_annotation(self, annotate: bool) -> Self {
        Self { annotate, ..self }
    }

    /// Set the output column for the modification masses
    #[must_use]
    pub fn with_mass_column(self, column: impl Into<MassColumn>) -> Self {
        Self {
            mass_column: column.into(),
            ..self
        }
    }

    /// Find the modification and sequence columns in the data.
    /// # Errors
    /// If the format needs a sequence column but none is set, or if any column does not exist.
    fn resolve(
        &self,
        data: &Table,
    ) -> Result<(usize, Option<usize>), BoxedError<'static, BasicKind>> {
        if self.sequence_column.is_none() && self.format.requires_sequence() {
            return Err(BoxedError::new(
                BasicKind::Error,
                "Missing sequence column",
                format!(
                    "The {} format gives modification positions relative to the plain sequence, so a sequence column has to be set. A sequence column is needed for: {}",
                    self.format,
                    ModificationFormat::ALL
                        .iter()
                        .filter(|f| f.requires_sequence())
                        .map(|f| f.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                Context::show(self.format.name()),
            ));
        }
        let sequence = self
            .sequence_column
            .as_deref()
            .map(|column| data.column_index(column))
            .transpose()?;
        Ok((data.column_index(&self.modification_column)?, sequence))
    }
}

/// A lookup from modification mass (or engine specific code) to modification type.
///
/// Keys are stored canonically so `42`, `+42`, and `42.0` all find the same type.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PtmTable {
    types: HashMap<String, String>,
}

impl PtmTable {
    /// Create a table from pairs of mass and type. If a mass occurs more than once the first type
    /// is kept.
    pub fn new<K: AsRef<str>, T: Into<String>>(pairs: impl IntoIterator<Item = (K, T)>) -> Self {
        let mut types = HashMap::new();
        for (mass, kind) in pairs {
            let key = canonical_mass_key(mass.as_ref());
            let kind = kind.into();
            if let Some(existing) = types.get(&key) {
                log::warn!(
                    "PTM table contains mass '{key}' more than once, keeping type '{existing}' and ignoring '{kind}'"
                );
            } else {
                types.insert(key, kind);
            }
        }
        Self { types }
    }

    /// Create a table from two columns of a loaded table. Rows where either the mass or the type
    /// is missing are skipped.
    /// # Errors
    /// If either column does not exist.
    pub fn from_table(
        table: &Table,
        mass_column: &str,
        type_column: &str,
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        let pairs = table
            .column(mass_column)?
            .zip(table.column(type_column)?)
            .filter_map(|(mass, kind)| Some((mass.to_text()?, kind.to_text()?.into_owned())))
            .collect::<Vec<_>>();
        if pairs.len() < table.len() {
            log::debug!(
                "skipped {} PTM table rows without a mass or type",
                table.len() - pairs.len()
            );
        }
        Ok(Self::new(pairs))
    }

    /// Get the type for this mass
    pub fn get(&self, mass: &str) -> Option<&str> {
        self.types
            .get(&canonical_mass_key(mass))
            .map(String::as_str)
    }

    /// The number of distinct masses
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Expand every row into one row per modification. The output has all input columns followed by
/// [`PTM_POSITION`], the mass column, [`PTM_TYPE`] (only when annotating), and [`REPS`]. A row
/// without modifications gives a single row with missing position and mass and `reps` 1. When
/// annotating, masses that are not in the PTM table get a missing type.
/// # Errors
/// * If the format needs a sequence column and none is set.
/// * If any of the named columns does not exist.
/// * If any of the output columns already exists.
/// * If any modification does not follow the notation of the format.
pub fn normalise(
    data: &Table,
    parameters: &NormaliseParameters,
    ptm_table: Option<&PtmTable>,
) -> Result<Table, BoxedError<'static, BasicKind>> {
    let (modification_index, sequence_index) = parameters.resolve(data)?;

    let mut new_columns = vec![PTM_POSITION, parameters.mass_column.as_str()];
    if parameters.annotate {
        new_columns.push(PTM_TYPE);
        if ptm_table.is_none() {
            log::warn!("PTM annotation requested without a PTM table, all types will be missing");
        }
    }
    new_columns.push(REPS);
    let mut columns = data.columns().to_vec();
    for column in new_columns {
        data.check_new_column(column)?;
        columns.push(column.to_string());
    }

    let parser = parameters.format.parser();
    let annotate = parameters.annotate;
    let expand = |row: &Vec<Value>| -> Result<Vec<Vec<Value>>, BoxedError<'static, BasicKind>> {
        let modified = row[modification_index].to_text();
        let sequence = sequence_index.and_then(|index| row[index].to_text());
        let modifications = parser
            .parse(modified.as_deref().unwrap_or_default(), sequence.as_deref())
            .map_err(BoxedError::to_owned)?;
        log::trace!(
            "{}: {} modifications",
            modified.as_deref().unwrap_or_default(),
            modifications.len()
        );

        let reps = Value::from(modifications.len().max(1));
        if modifications.is_empty() {
            let mut output = row.clone();
            output.extend([Value::Null, Value::Null]);
            if annotate {
                output.push(Value::Null);
            }
            output.push(reps);
            return Ok(vec![output]);
        }
        Ok(modifications
            .into_iter()
            .map(|modification| {
                let kind = annotate.then(|| {
                    Value::from(ptm_table.and_then(|table| table.get(&modification.mass)))
                });
                let mut output = row.clone();
                output.push(Value::from(modification.position));
                output.push(Value::from(modification.mass));
                output.extend(kind);
                output.push(reps.clone());
                output
            })
            .collect())
    };

    #[cfg(feature = "rayon")]
    let expanded = data
        .rows()
        .par_iter()
        .map(expand)
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let expanded = data
        .rows()
        .iter()
        .map(expand)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = expanded.into_iter().flatten().collect::<Vec<_>>();
    log::debug!(
        "normalised {} {} rows into {} rows",
        data.len(),
        parameters.format,
        rows.len()
    );
    Ok(Table::from_parts(columns, rows))
}

/// Add a column with the stripped sequence, the peptide without any modification annotations. For
/// list notations this is the plain sequence. Rows without a modified sequence (or without a plain
/// sequence for list notations) get a missing value.
/// # Errors
/// * If the format needs a sequence column and none is set.
/// * If any of the named columns does not exist.
/// * If the output column already exists.
/// * If any modified sequence does not follow the notation of the format.
pub fn strip_sequence(
    data: &Table,
    parameters: &NormaliseParameters,
    output_column: &str,
) -> Result<Table, BoxedError<'static, BasicKind>> {
    let (modification_index, sequence_index) = parameters.resolve(data)?;
    data.check_new_column(output_column)?;

    let parser = parameters.format.parser();
    let strip = |row: &Vec<Value>| -> Result<Vec<Value>, BoxedError<'static, BasicKind>> {
        let modified = row[modification_index].to_text();
        let sequence = sequence_index.and_then(|index| row[index].to_text());
        let stripped = match (modified.as_deref(), sequence.as_deref()) {
            (_, None) if parser.requires_sequence() => Value::Null,
            (None, _) if !parser.requires_sequence() => Value::Null,
            (modified, sequence) => Value::from(
                parser
                    .strip(modified.unwrap_or_default(), sequence)
                    .map_err(BoxedError::to_owned)?,
            ),
        };
        let mut output = row.clone();
        output.push(stripped);
        Ok(output)
    };

    #[cfg(feature = "rayon")]
    let rows = data
        .rows()
        .par_iter()
        .map(strip)
        .collect::<Result<Vec<_>, _>>()?;
    #[cfg(not(feature = "rayon"))]
    let rows = data
        .rows()
        .iter()
        .map(strip)
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns = data.columns().to_vec();
    columns.push(output_column.to_string());
    Ok(Table::from_parts(columns, rows))
}
