use std::collections::{BTreeMap, BTreeSet, HashMap};

use context_error::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    matching::{END, REFERENCE, ReferenceIndex, START},
    normalise::{MassColumn, PTM_POSITION, PTM_TYPE, REPS},
    table::{Table, Value},
};

/// The output column with the count
pub const COUNT: &str = "count";
/// The output column with the 1-based residue number for [`coverage`]
pub const POSITION: &str = "position";
/// The output column with the residue for [`coverage`]
pub const RESIDUE: &str = "residue";

/// What is counted
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum QuantificationMethod {
    /// Every positioned row (peptide spectrum match) is counted
    #[default]
    #[serde(rename = "PSM", alias = "psm")]
    Psm,
    /// Every distinct stripped sequence is counted once
    #[serde(alias = "peptide")]
    Peptide,
}

/// The parameters for [`quantify`] and [`coverage`]
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct QuantificationParameters {
    /// What is counted
    pub method: QuantificationMethod,
    /// The column with the stripped sequence, used for [`QuantificationMethod::Peptide`]
    pub sequence_column: String,
    /// The columns to group by. Reference metadata columns take the value of the reference, all
    /// other columns take all values seen in the positioned rows.
    pub group_columns: Vec<String>,
    /// If not empty, count the distinct combinations of these columns instead
    pub distinct_columns: Vec<String>,
    /// Give separate counts for every modification state
    pub with_ptm: bool,
    /// Give separate counts for every replicate
    pub by_replicate: bool,
    /// The column with the replicate
    pub replicate_column: String,
    /// The column with the modification mass, used for modification states when there is no
    /// [`PTM_TYPE`] column. A pipeline run takes this from its normalise parameters.
    pub mass_column: MassColumn,
}

impl Default for QuantificationParameters {
    fn default() -> Self {
        Self {
            method: QuantificationMethod::default(),
            sequence_column: "Sequence".to_string(),
            group_columns: Vec::new(),
            distinct_columns: Vec::new(),
            with_ptm: false,
            by_replicate: false,
            replicate_column: "replicate".to_string(),
            mass_column: MassColumn::default(),
        }
    }
}

impl QuantificationParameters {
    /// Count with the given method, without grouping
    pub fn new(method: QuantificationMethod, sequence_column: impl Into<String>) -> Self {
        Self {
            method,
            sequence_column: sequence_column.into(),
            ..Self::default()
        }
    }

    /// Group by these columns
    #[must_use]
    pub fn with_group_columns(self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            group_columns: columns.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Count distinct combinations of these columns
    #[must_use]
    pub fn with_distinct_columns(
        self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            distinct_columns: columns.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Set whether modification states are counted separately
    #[must_use]
    pub fn with_ptm(self, with_ptm: bool) -> Self {
        Self { with_ptm, ..self }
    }

    /// Count every replicate in the given column separately
    #[must_use]
    pub fn by_replicate(self, column: impl Into<String>) -> Self {
        Self {
            by_replicate: true,
            replicate_column: column.into(),
            ..self
        }
    }
}

/// Where the value of a group column comes from
enum Source<'a> {
    Reference(&'a str),
    Observed(usize),
}

/// The group columns and their full domain
struct Grouping<'a> {
    index: &'a ReferenceIndex,
    columns: Vec<String>,
    sources: Vec<Source<'a>>,
    levels: Vec<Vec<Value>>,
    reference: usize,
}

type GroupKey = (usize, Vec<Value>);

impl<'a> Grouping<'a> {
    fn new(
        index: &'a ReferenceIndex,
        data: &Table,
        parameters: &'a QuantificationParameters,
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        let replicate = (parameters.by_replicate
            && !parameters.group_columns.contains(&parameters.replicate_column))
        .then_some(&parameters.replicate_column);
        let mut columns = Vec::new();
        let mut sources = Vec::new();
        let mut levels = Vec::new();
        for column in parameters
            .group_columns
            .iter()
            .filter(|c| *c != REFERENCE)
            .chain(replicate)
        {
            if index.metadata_columns().contains(column) {
                sources.push(Source::Reference(column.as_str()));
            } else {
                let position = data.column_index(column)?;
                let mut observed = data
                    .rows()
                    .iter()
                    .map(|row| row[position].clone())
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect::<Vec<_>>();
                if observed.is_empty() {
                    observed.push(Value::Null);
                }
                levels.push(observed);
                sources.push(Source::Observed(position));
            }
            columns.push(column.clone());
        }
        Ok(Self {
            index,
            columns,
            sources,
            levels,
            reference: data.column_index(REFERENCE)?,
        })
    }

    /// The reference and group values for a positioned row
    fn key(&self, row: &[Value]) -> Option<GroupKey> {
        let name = row[self.reference].to_text()?;
        let Some(reference) = self.index.position(&name) else {
            log::warn!("positioned row refers to unknown reference '{name}', it is not counted");
            return None;
        };
        let mut observed = self.sources.iter().filter_map(|source| match source {
            Source::Observed(index) => Some(row[*index].clone()),
            Source::Reference(_) => None,
        });
        Some((reference, self.values(reference, &mut observed)))
    }

    /// All combinations of reference and group values, in reference order
    fn domain(&self) -> Vec<GroupKey> {
        let combinations: Vec<Vec<Value>> = if self.levels.is_empty() {
            vec![Vec::new()]
        } else {
            self.levels
                .iter()
                .map(|level| level.iter().cloned())
                .multi_cartesian_product()
                .collect()
        };
        (0..self.index.references().len())
            .flat_map(|reference| {
                combinations.iter().map(move |combination| {
                    (
                        reference,
                        self.values(reference, &mut combination.iter().cloned()),
                    )
                })
            })
            .collect()
    }

    /// Fill in the group values, taking the reference metadata for reference columns
    fn values(&self, reference: usize, observed: &mut impl Iterator<Item = Value>) -> Vec<Value> {
        let reference = &self.index.references()[reference];
        self.sources
            .iter()
            .map(|source| match source {
                Source::Reference(column) => {
                    reference.metadata(column).cloned().unwrap_or_default()
                }
                Source::Observed(_) => observed.next().unwrap_or_default(),
            })
            .collect()
    }

    /// The output row start, the group values followed by the reference name
    fn row_start(&self, key: &GroupKey) -> Vec<Value> {
        let mut row = key.1.clone();
        row.push(Value::from(self.index.references()[key.0].name.as_str()));
        row
    }

    fn columns(&self) -> Vec<String> {
        let mut columns = self.columns.clone();
        columns.push(REFERENCE.to_string());
        columns
    }
}

/// What identifies a single counted unit within a group
enum Unit {
    /// Every positioned row, optionally with the column that says over how many rows the
    /// identification of this row was expanded
    Row(Option<usize>),
    Columns(Vec<usize>),
}

impl Unit {
    fn new(
        data: &Table,
        parameters: &QuantificationParameters,
        with_ptm: bool,
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        if !parameters.distinct_columns.is_empty() {
            return Ok(Self::Columns(
                parameters
                    .distinct_columns
                    .iter()
                    .map(|column| data.column_index(column))
                    .collect::<Result<_, _>>()?,
            ));
        }
        match parameters.method {
            QuantificationMethod::Peptide => Ok(Self::Columns(vec![
                data.column_index(&parameters.sequence_column)?,
            ])),
            QuantificationMethod::Psm if with_ptm => Ok(Self::Row(None)),
            QuantificationMethod::Psm => Ok(Self::Row(
                data.columns().iter().position(|column| column == REPS),
            )),
        }
    }

    /// The identity of the unit and the number of rows one identification is spread over
    fn key(&self, index: usize, row: &[Value]) -> (Vec<Value>, usize) {
        match self {
            Self::Row(reps) => (
                vec![Value::from(index)],
                reps.and_then(|column| row[column].as_integer())
                    .and_then(|reps| usize::try_from(reps).ok())
                    .filter(|reps| *reps > 0)
                    .unwrap_or(1),
            ),
            Self::Columns(columns) => (columns.iter().map(|c| row[*c].clone()).collect(), 1),
        }
    }
}

/// The number of identifications in a set of units, units spread over `reps` rows together count
/// as one
fn identifications(units: &HashMap<Vec<Value>, usize>) -> usize {
    units
        .values()
        .counts()
        .into_iter()
        .map(|(reps, rows)| rows.div_ceil(*reps))
        .sum()
}

/// Count the positioned rows per reference and group. Every combination of reference and group
/// values is present in the output, with a count of 0 if nothing was matched. The output has the
/// group columns, the replicate column (if by replicate and not already grouped on), [`REFERENCE`],
/// the modification state columns (if with PTM), and [`COUNT`].
///
/// The modification state is [`PTM_POSITION`] and [`PTM_TYPE`], or the mass column if the rows
/// were not annotated. Groups without any match get a missing modification state.
///
/// What is counted:
/// * With distinct columns: the distinct combinations of these columns.
/// * [`QuantificationMethod::Peptide`]: the distinct stripped sequences.
/// * [`QuantificationMethod::Psm`] with PTM: every positioned row.
/// * [`QuantificationMethod::Psm`] without PTM: every positioned row, with the rows expanded
///   from a single identification (see [`REPS`]) counted once together.
/// # Errors
/// If any of the needed columns does not exist.
pub fn quantify(
    index: &ReferenceIndex,
    positioned: &Table,
    parameters: &QuantificationParameters,
) -> Result<Table, BoxedError<'static, BasicKind>> {
    let grouping = Grouping::new(index, positioned, parameters)?;
    let unit = Unit::new(positioned, parameters, parameters.with_ptm)?;
    let state_columns = if parameters.with_ptm {
        let kind = if positioned.has_column(PTM_TYPE) {
            PTM_TYPE
        } else {
            parameters.mass_column.as_str()
        };
        vec![
            (positioned.column_index(PTM_POSITION)?, PTM_POSITION),
            (positioned.column_index(kind)?, kind),
        ]
    } else {
        Vec::new()
    };

    let mut counts: HashMap<GroupKey, BTreeMap<Vec<Value>, HashMap<Vec<Value>, usize>>> =
        HashMap::new();
    for (row_index, row) in positioned.rows().iter().enumerate() {
        let Some(key) = grouping.key(row) else {
            continue;
        };
        let state = state_columns
            .iter()
            .map(|(index, _)| row[*index].clone())
            .collect();
        let (identity, reps) = unit.key(row_index, row);
        counts
            .entry(key)
            .or_default()
            .entry(state)
            .or_default()
            .insert(identity, reps);
    }

    let mut columns = grouping.columns();
    columns.extend(state_columns.iter().map(|(_, name)| (*name).to_string()));
    columns.push(COUNT.to_string());

    let mut rows = Vec::new();
    for key in grouping.domain() {
        let start = grouping.row_start(&key);
        if let Some(states) = counts.get(&key) {
            for (state, units) in states {
                let mut row = start.clone();
                row.extend(state.iter().cloned());
                row.push(Value::from(identifications(units)));
                rows.push(row);
            }
        } else {
            let mut row = start;
            row.extend(state_columns.iter().map(|_| Value::Null));
            row.push(Value::from(0));
            rows.push(row);
        }
    }
    log::debug!(
        "counted {} positioned rows into {} groups",
        positioned.len(),
        rows.len()
    );
    Ok(Table::from_parts(columns, rows))
}

/// Count for every residue of every reference how many units cover it, per group. The groups and
/// units are the same as for [`quantify`] without PTM. A unit that matches a reference more than
/// once is counted once for every residue covered by any of its matches. The output has the group
/// columns, the replicate column (if by replicate and not already grouped on), [`REFERENCE`],
/// [`POSITION`] (1-based), [`RESIDUE`], and [`COUNT`].
/// # Errors
/// If any of the needed columns does not exist.
pub fn coverage(
    index: &ReferenceIndex,
    positioned: &Table,
    parameters: &QuantificationParameters,
) -> Result<Table, BoxedError<'static, BasicKind>> {
    let grouping = Grouping::new(index, positioned, parameters)?;
    let unit = Unit::new(positioned, parameters, false)?;
    let start = positioned.column_index(START)?;
    let end = positioned.column_index(END)?;

    let mut spans: HashMap<GroupKey, HashMap<Vec<Value>, (usize, Vec<(usize, usize)>)>> =
        HashMap::new();
    for (row_index, row) in positioned.rows().iter().enumerate() {
        let Some(key) = grouping.key(row) else {
            continue;
        };
        let (Some(first), Some(last)) = (
            row[start]
                .as_integer()
                .and_then(|v| usize::try_from(v).ok()),
            row[end].as_integer().and_then(|v| usize::try_from(v).ok()),
        ) else {
            log::trace!("positioned row {row_index} has no valid start and end");
            continue;
        };
        let (identity, reps) = unit.key(row_index, row);
        spans
            .entry(key)
            .or_default()
            .entry(identity)
            .or_insert_with(|| (reps, Vec::new()))
            .1
            .push((first, last));
    }

    let mut columns = grouping.columns();
    columns.extend([POSITION, RESIDUE, COUNT].map(ToString::to_string));

    let mut rows = Vec::new();
    for key in grouping.domain() {
        let sequence = &index.references()[key.0].sequence;
        let mut counts = vec![0_usize; sequence.len()];
        if let Some(units) = spans.get(&key) {
            let mut per_reps: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            for (reps, unit_spans) in units.values() {
                add_coverage(
                    per_reps
                        .entry(*reps)
                        .or_insert_with(|| vec![0; sequence.len()]),
                    unit_spans,
                );
            }
            for (reps, covered) in per_reps {
                for (count, covered) in counts.iter_mut().zip(covered) {
                    *count += covered.div_ceil(reps);
                }
            }
        }
        let start = grouping.row_start(&key);
        for (offset, (residue, count)) in sequence.chars().zip(counts).enumerate() {
            let mut row = start.clone();
            row.extend([
                Value::from(offset + 1),
                Value::from(residue.to_string()),
                Value::from(count),
            ]);
            rows.push(row);
        }
    }
    Ok(Table::from_parts(columns, rows))
}

/// Add one to every residue covered by any of the 1-based inclusive spans
fn add_coverage(counts: &mut [usize], spans: &[(usize, usize)]) {
    let mut covered = vec![false; counts.len()];
    for (start, end) in spans {
        covered
            .iter_mut()
            .take(*end)
            .skip(start.saturating_sub(1))
            .for_each(|residue| *residue = true);
    }
    for (count, covered) in counts.iter_mut().zip(covered) {
        if covered {
            *count += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::{matching::ReferenceSequence, table};

    fn index() -> ReferenceIndex {
        ReferenceIndex::new([
            ReferenceSequence::new("heavy", "PEPTIDEKAAAK").with_metadata("chain", "H"),
            ReferenceSequence::new("light", "LIGHTK").with_metadata("chain", "L"),
        ])
    }

    fn positioned() -> Table {
        table!("Sequence", "condition", "donor", REFERENCE, "chain", START, END;
            ["PEPTIDE", "a", "d1", "heavy", "H", 1, 7],
            ["PEPTIDE", "a", "d2", "heavy", "H", 1, 7],
            ["AAAK", "a", "d1", "heavy", "H", 9, 12],
            ["AAAK", "b", "d1", "heavy", "H", 9, 12],
        )
    }

    #[test]
    fn psm_counts_with_zero_groups() {
        let table = quantify(
            &index(),
            &positioned(),
            &QuantificationParameters::new(QuantificationMethod::Psm, "Sequence")
                .with_group_columns(["chain", "condition"]),
        )
        .unwrap();
        assert_eq!(table.columns(), ["chain", "condition", REFERENCE, COUNT]);
        assert_eq!(
            table.rows(),
            [
                vec![
                    Value::from("H"),
                    Value::from("a"),
                    Value::from("heavy"),
                    Value::from(3)
                ],
                vec![
                    Value::from("H"),
                    Value::from("b"),
                    Value::from("heavy"),
                    Value::from(1)
                ],
                vec![
                    Value::from("L"),
                    Value::from("a"),
                    Value::from("light"),
                    Value::from(0)
                ],
                vec![
                    Value::from("L"),
                    Value::from("b"),
                    Value::from("light"),
                    Value::from(0)
                ],
            ]
        );
    }

    #[test]
    fn peptides_are_counted_once() {
        let table = quantify(
            &index(),
            &positioned(),
            &QuantificationParameters::new(QuantificationMethod::Peptide, "Sequence"),
        )
        .unwrap();
        assert_eq!(
            table.column(COUNT).unwrap().cloned().collect::<Vec<_>>(),
            vec![Value::from(2), Value::from(0)]
        );
    }

    #[test]
    fn distinct_donors() {
        let table = quantify(
            &index(),
            &positioned(),
            &QuantificationParameters::new(QuantificationMethod::Psm, "Sequence")
                .with_distinct_columns(["donor"]),
        )
        .unwrap();
        assert_eq!(table.get(0, COUNT), Some(&Value::from(2)));
        assert_eq!(table.get(1, COUNT), Some(&Value::from(0)));
    }

    #[test]
    fn replicates() {
        let table = quantify(
            &index(),
            &positioned(),
            &QuantificationParameters::new(QuantificationMethod::Psm, "Sequence")
                .by_replicate("condition"),
        )
        .unwrap();
        assert_eq!(table.columns(), ["condition", REFERENCE, COUNT]);
        assert_eq!(table.len(), 4);
        assert!(
            quantify(
                &index(),
                &positioned(),
                &QuantificationParameters::new(QuantificationMethod::Psm, "Sequence")
                    .by_replicate("replicate"),
            )
            .is_err()
        );
    }

    #[test]
    fn modification_states() {
        let positioned = table!("Sequence", REFERENCE, START, END, PTM_POSITION, "PTM_mass", REPS;
            ["PEPTIDE", "heavy", 1, 7, 2, "42", 2],
            ["PEPTIDE", "heavy", 1, 7, 3, "-0.98", 2],
            ["PEPTIDE", "heavy", 1, 7, Value::Null, Value::Null, 1],
        );
        let table = quantify(
            &index(),
            &positioned,
            &QuantificationParameters::new(QuantificationMethod::Psm, "Sequence").with_ptm(true),
        )
        .unwrap();
        assert_eq!(table.columns(), [REFERENCE, PTM_POSITION, "PTM_mass", COUNT]);
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.rows()[1],
            vec![
                Value::from("heavy"),
                Value::from(2),
                Value::from("42"),
                Value::from(1)
            ]
        );
        assert_eq!(
            table.rows()[3],
            vec![Value::from("light"), Value::Null, Value::Null, Value::from(0)]
        );

        // The two rows with reps 2 are one identification, the unmodified row is another
        let table = quantify(
            &index(),
            &positioned,
            &QuantificationParameters::new(QuantificationMethod::Psm, "Sequence"),
        )
        .unwrap();
        assert_eq!(table.get(0, COUNT), Some(&Value::from(2)));
    }

    #[test]
    fn repeated_identifications_are_separate_psms() {
        let positioned = table!("Sequence", REFERENCE, START, END, PTM_POSITION, "PTM_mass", REPS;
            ["PEPTIDE", "heavy", 1, 7, Value::Null, Value::Null, 1],
            ["PEPTIDE", "heavy", 1, 7, Value::Null, Value::Null, 1],
            ["PEPTIDE", "heavy", 1, 7, 2, "42", 2],
            ["PEPTIDE", "heavy", 1, 7, 3, "-0.98", 2],
            ["PEPTIDE", "heavy", 1, 7, 2, "42", 2],
            ["PEPTIDE", "heavy", 1, 7, 3, "-0.98", 2],
        );
        let parameters = QuantificationParameters::new(QuantificationMethod::Psm, "Sequence");
        let table = quantify(&index(), &positioned, &parameters).unwrap();
        assert_eq!(table.get(0, COUNT), Some(&Value::from(4)));
        assert_eq!(table.get(1, COUNT), Some(&Value::from(0)));

        let table = coverage(&index(), &positioned, &parameters).unwrap();
        assert_eq!(table.get(0, COUNT), Some(&Value::from(4)));
        assert_eq!(table.get(7, COUNT), Some(&Value::from(0)));

        let table = quantify(
            &index(),
            &positioned,
            &QuantificationParameters::new(QuantificationMethod::Peptide, "Sequence"),
        )
        .unwrap();
        assert_eq!(table.get(0, COUNT), Some(&Value::from(1)));
    }

    #[test]
    fn residue_coverage() {
        let table = coverage(
            &index(),
            &positioned(),
            &QuantificationParameters::new(QuantificationMethod::Peptide, "Sequence"),
        )
        .unwrap();
        assert_eq!(table.columns(), [REFERENCE, POSITION, RESIDUE, COUNT]);
        assert_eq!(table.len(), 12 + 6);
        let counts = table
            .column(COUNT)
            .unwrap()
            .filter_map(Value::as_integer)
            .collect::<Vec<_>>();
        assert_eq!(
            counts,
            vec![1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(table.get(7, RESIDUE), Some(&Value::from("K")));
    }

    #[test]
    fn overlapping_spans_count_once() {
        let mut counts = vec![0; 6];
        add_coverage(&mut counts, &[(1, 3), (2, 4)]);
        add_coverage(&mut counts, &[(6, 9)]);
        assert_eq!(counts, vec![1, 1, 1, 1, 0, 1]);
    }
}
