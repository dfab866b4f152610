use std::collections::HashMap;

use context_error::*;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    helper_functions::similar_names,
    table::{Table, Value},
};

/// The output column with the name of the matched reference
pub const REFERENCE: &str = "reference";
/// The output column with the 1-based first residue of the match
pub const START: &str = "start";
/// The output column with the 1-based last residue of the match (inclusive)
pub const END: &str = "end";

/// A named full length sequence with its own metadata, for example the chain or epitope it
/// belongs to.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ReferenceSequence {
    /// The name, used in the [`REFERENCE`] column
    pub name: String,
    /// The full sequence
    pub sequence: String,
    /// Additional metadata, as column name and value
    #[serde(default)]
    pub metadata: Vec<(String, Value)>,
}

impl ReferenceSequence {
    /// Create a reference sequence without metadata
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            metadata: Vec::new(),
        }
    }

    /// Add a metadata value
    #[must_use]
    pub fn with_metadata(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.push((column.into(), value.into()));
        self
    }

    /// Get the metadata value for the given column
    pub fn metadata(&self, column: &str) -> Option<&Value> {
        self.metadata
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// A single occurrence of a peptide in a reference
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SequenceMatch<'a> {
    /// The reference the peptide was found in
    pub reference: &'a ReferenceSequence,
    /// The 1-based first residue
    pub start: usize,
    /// The 1-based last residue, inclusive
    pub end: usize,
}

/// A collection of reference sequences to match peptides against. It is built once and used for
/// both matching and quantification.
#[derive(Clone, Debug, Default)]
pub struct ReferenceIndex {
    references: Vec<ReferenceSequence>,
    names: HashMap<String, usize>,
    metadata_columns: Vec<String>,
}

impl ReferenceIndex {
    /// Create a new index, the metadata columns are all metadata columns used by any reference in
    /// order of first occurrence.
    pub fn new(references: impl IntoIterator<Item = ReferenceSequence>) -> Self {
        let references = references.into_iter().collect::<Vec<_>>();
        let mut names = HashMap::new();
        let mut metadata_columns: Vec<String> = Vec::new();
        for (index, reference) in references.iter().enumerate() {
            if names.contains_key(&reference.name) {
                log::warn!(
                    "reference '{}' is defined more than once, quantification will use the first",
                    reference.name
                );
            } else {
                names.insert(reference.name.clone(), index);
            }
            for (column, _) in &reference.metadata {
                if !metadata_columns.contains(column) {
                    metadata_columns.push(column.clone());
                }
            }
        }
        Self {
            references,
            names,
            metadata_columns,
        }
    }

    /// Create an index from a table with one reference per row. All other columns are used as
    /// metadata. Rows without a name or sequence are skipped.
    /// # Errors
    /// If the name or sequence column does not exist.
    pub fn from_table(
        table: &Table,
        name_column: &str,
        sequence_column: &str,
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        let name = table.column_index(name_column)?;
        let sequence = table.column_index(sequence_column)?;
        Ok(Self::new(table.rows().iter().filter_map(|row| {
            Some(ReferenceSequence {
                name: row[name].to_text()?.into_owned(),
                sequence: row[sequence].to_text()?.trim().to_string(),
                metadata: table
                    .columns()
                    .iter()
                    .zip(row)
                    .enumerate()
                    .filter(|(index, _)| *index != name && *index != sequence)
                    .map(|(_, (column, value))| (column.clone(), value.clone()))
                    .collect(),
            })
        })))
    }

    /// All references in order
    pub fn references(&self) -> &[ReferenceSequence] {
        &self.references
    }

    /// The metadata columns of all references
    pub fn metadata_columns(&self) -> &[String] {
        &self.metadata_columns
    }

    /// Get the index of the reference with this name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Get the reference with this name
    pub fn get(&self, name: &str) -> Option<&ReferenceSequence> {
        self.position(name).map(|index| &self.references[index])
    }

    /// Find all occurrences of the peptide in all references, overlapping occurrences included
    pub fn find<'a>(&'a self, peptide: &'a str) -> impl Iterator<Item = SequenceMatch<'a>> {
        self.find_filtered(peptide, |_| true)
    }

    /// Find all occurrences of the peptide in all references accepted by the filter
    pub fn find_filtered<'a>(
        &'a self,
        peptide: &'a str,
        filter: impl Fn(&ReferenceSequence) -> bool + 'a,
    ) -> impl Iterator<Item = SequenceMatch<'a>> {
        self.references
            .iter()
            .filter(move |reference| filter(reference))
            .flat_map(move |reference| {
                occurrences(&reference.sequence, peptide).map(move |offset| SequenceMatch {
                    reference,
                    start: offset + 1,
                    end: offset + peptide.len(),
                })
            })
    }
}

/// All 0-based offsets where the needle occurs in the haystack, including overlapping ones
fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let needle = needle.as_bytes();
    let windows = if needle.is_empty() || needle.len() > haystack.len() {
        [].windows(1)
    } else {
        haystack.as_bytes().windows(needle.len())
    };
    windows
        .enumerate()
        .filter(move |(_, window)| *window == needle)
        .map(|(offset, _)| offset)
}

/// The parameters for [`match_positions`]
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct MatchParameters {
    /// The column with the stripped peptide sequences
    pub sequence_column: String,
    /// Only match a row against references whose metadata has the same value for all these
    /// columns, if empty all references are tried
    pub match_columns: Vec<String>,
    /// Only keep peptides with a length in this inclusive range
    pub length_range: Option<(usize, usize)>,
    /// The input columns to keep in the output, if not set all input columns are kept
    pub keep_columns: Option<Vec<String>>,
}

impl Default for MatchParameters {
    fn default() -> Self {
        Self {
            sequence_column: "Sequence".to_string(),
            match_columns: Vec::new(),
            length_range: None,
            keep_columns: None,
        }
    }
}

impl MatchParameters {
    /// Match the given column against all references, keeping all columns
    pub fn new(sequence_column: impl Into<String>) -> Self {
        Self {
            sequence_column: sequence_column.into(),
            ..Self::default()
        }
    }

    /// Only match against references with the same metadata value for these columns
    #[must_use]
    pub fn with_match_columns(
        self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            match_columns: columns.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// Only keep peptides with a length in this inclusive range
    #[must_use]
    pub fn with_length_range(self, min: usize, max: usize) -> Self {
        Self {
            length_range: Some((min, max)),
            ..self
        }
    }

    /// Only keep these input columns
    #[must_use]
    pub fn with_keep_columns(self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keep_columns: Some(columns.into_iter().map(Into::into).collect()),
            ..self
        }
    }
}

/// All column indices and names needed to match rows, resolved once for a table
struct Matcher<'a> {
    index: &'a ReferenceIndex,
    sequence: usize,
    match_columns: Vec<(usize, &'a str)>,
    keep: Vec<usize>,
    metadata: Vec<&'a str>,
    length_range: Option<(usize, usize)>,
    columns: Vec<String>,
}

impl<'a> Matcher<'a> {
    fn new(
        data: &'a Table,
        index: &'a ReferenceIndex,
        parameters: &'a MatchParameters,
    ) -> Result<Self, BoxedError<'static, BasicKind>> {
        let sequence = data.column_index(&parameters.sequence_column)?;
        let match_columns = parameters
            .match_columns
            .iter()
            .map(|column| {
                if !index.metadata_columns().contains(column) {
                    return Err(BoxedError::new(
                        BasicKind::Error,
                        "Missing reference column",
                        format!("The match column '{column}' is not defined for any reference"),
                        Context::show(index.metadata_columns().join(", ")),
                    )
                    .suggestions(similar_names(
                        column,
                        index.metadata_columns().iter().map(String::as_str),
                    )));
                }
                Ok((data.column_index(column)?, column.as_str()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (keep, mut columns): (Vec<usize>, Vec<String>) = match &parameters.keep_columns {
            Some(keep) => keep
                .iter()
                .map(|column| Ok((data.column_index(column)?, column.clone())))
                .collect::<Result<Vec<_>, BoxedError<'static, BasicKind>>>()?
                .into_iter()
                .unzip(),
            None => data.columns().iter().cloned().enumerate().unzip(),
        };
        if let Some(column) = columns.iter().find(|column| {
            index.metadata_columns().contains(column) && !parameters.match_columns.contains(column)
        }) {
            return Err(BoxedError::new(
                BasicKind::Error,
                "Duplicate column",
                format!(
                    "The kept column '{column}' is also a reference metadata column, use it as a match column or leave it out of the kept columns"
                ),
                Context::show(columns.join(", ")),
            ));
        }
        let metadata = index
            .metadata_columns()
            .iter()
            .filter(|column| !columns.contains(column))
            .map(String::as_str)
            .collect::<Vec<_>>();

        let kept = Table::new(columns.iter());
        for column in [REFERENCE, START, END] {
            kept.check_new_column(column)?;
        }
        columns.push(REFERENCE.to_string());
        columns.extend(metadata.iter().map(ToString::to_string));
        columns.extend([START.to_string(), END.to_string()]);

        Ok(Self {
            index,
            sequence,
            match_columns,
            keep,
            metadata,
            length_range: parameters.length_range,
            columns,
        })
    }

    /// Give one output row for every occurrence of the peptide of this row
    fn match_row(&self, row: &[Value]) -> Vec<Vec<Value>> {
        let Some(peptide) = row[self.sequence].to_text() else {
            return Vec::new();
        };
        let peptide = peptide.trim();
        if peptide.is_empty() {
            return Vec::new();
        }
        if let Some((min, max)) = self.length_range
            && !(min..=max).contains(&peptide.len())
        {
            log::trace!("{peptide}: length outside of {min}..={max}");
            return Vec::new();
        }

        let matches = self
            .index
            .find_filtered(peptide, |reference| {
                self.match_columns.iter().all(|(index, column)| {
                    reference
                        .metadata(column)
                        .is_some_and(|value| same_value(value, &row[*index]))
                })
            })
            .map(|found| {
                let mut output = self
                    .keep
                    .iter()
                    .map(|index| row[*index].clone())
                    .collect::<Vec<_>>();
                output.push(Value::from(found.reference.name.as_str()));
                output.extend(self.metadata.iter().map(|column| {
                    found
                        .reference
                        .metadata(column)
                        .cloned()
                        .unwrap_or_default()
                }));
                output.push(Value::from(found.start));
                output.push(Value::from(found.end));
                output
            })
            .collect::<Vec<_>>();
        log::trace!("{peptide}: {} matches", matches.len());
        matches
    }

    fn finish(self, data: &Table, matched: Vec<Vec<Vec<Value>>>) -> Table {
        let unmatched = matched.iter().filter(|rows| rows.is_empty()).count();
        let rows = matched.into_iter().flatten().collect::<Vec<_>>();
        log::debug!(
            "matched {} of {} rows against {} references, giving {} positioned rows",
            data.len() - unmatched,
            data.len(),
            self.index.references().len(),
            rows.len()
        );
        Table::from_parts(self.columns, rows)
    }
}

/// Compare a reference metadata value with a table value, missing values never match
fn same_value(reference: &Value, value: &Value) -> bool {
    match (reference.to_text(), value.to_text()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Find all occurrences of the stripped peptides in the references. Every occurrence gives one
/// row with the kept columns, [`REFERENCE`], the metadata columns of the references (unless
/// already kept), [`START`], and [`END`]. Rows with a peptide that is not found, that is missing,
/// or that has a length outside of the length range are left out.
/// # Errors
/// * If any of the named columns does not exist.
/// * If a match column is not used by any reference.
/// * If any of the output columns is also a kept column.
/// * If a kept column is a reference metadata column but not a match column.
pub fn match_positions(
    data: &Table,
    index: &ReferenceIndex,
    parameters: &MatchParameters,
) -> Result<Table, BoxedError<'static, BasicKind>> {
    let matcher = Matcher::new(data, index, parameters)?;
    let matched = data
        .rows()
        .iter()
        .map(|row| matcher.match_row(row))
        .collect();
    Ok(matcher.finish(data, matched))
}

/// The same as [`match_positions`] but with the rows matched in parallel, the output is identical.
/// # Errors
/// See [`match_positions`].
#[cfg(feature = "rayon")]
pub fn par_match_positions(
    data: &Table,
    index: &ReferenceIndex,
    parameters: &MatchParameters,
) -> Result<Table, BoxedError<'static, BasicKind>> {
    let matcher = Matcher::new(data, index, parameters)?;
    let matched = data
        .rows()
        .par_iter()
        .map(|row| matcher.match_row(row))
        .collect();
    Ok(matcher.finish(data, matched))
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::table;

    fn index() -> ReferenceIndex {
        ReferenceIndex::new([
            ReferenceSequence::new("heavy", "EVQLVESGGGLVQPGGSLRLSCAASGFTFSSYAMS")
                .with_metadata("chain", "H"),
            ReferenceSequence::new("light", "DIQMTQSPSSLSASVGDRVTITCRASQSISSYLN")
                .with_metadata("chain", "L"),
        ])
    }

    #[test]
    fn single_occurrence() {
        let index = index();
        let found = index.find("LVESGGG").collect::<Vec<_>>();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference.name, "heavy");
        assert_eq!((found[0].start, found[0].end), (4, 10));
        assert!(found[0].end <= found[0].reference.sequence.len());
    }

    #[test]
    fn all_occurrences() {
        let index = ReferenceIndex::new([ReferenceSequence::new("repeat", "AAAKAAAK")]);
        let found = index
            .find("AAAK")
            .map(|m| (m.start, m.end))
            .collect::<Vec<_>>();
        assert_eq!(found, vec![(1, 4), (5, 8)]);
        let overlapping = index
            .find("AA")
            .map(|m| (m.start, m.end))
            .collect::<Vec<_>>();
        assert_eq!(overlapping, vec![(1, 2), (2, 3), (5, 6), (6, 7)]);
        assert_eq!(index.find("").count(), 0);
        assert_eq!(index.find("AAAKAAAKA").count(), 0);
    }

    #[test]
    fn metadata_columns() {
        let index = index();
        assert_eq!(index.metadata_columns(), ["chain"]);
        assert_eq!(
            index.get("light").and_then(|r| r.metadata("chain")),
            Some(&Value::from("L"))
        );
        assert_eq!(index.position("heavy"), Some(0));
        assert_eq!(index.get("kappa"), None);
    }

    #[test]
    fn match_table() {
        let data = table!("Sequence", "condition", "intensity";
            ["GLVQPGGS", "treated", 10],
            ["AATVTGKLVHANFGT", "treated", 20],
            [Value::Null, "control", 30],
        );
        let table = match_positions(
            &data,
            &index(),
            &MatchParameters::new("Sequence").with_keep_columns(["Sequence", "condition"]),
        )
        .unwrap();
        assert_eq!(
            table.columns(),
            ["Sequence", "condition", REFERENCE, "chain", START, END]
        );
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows()[0],
            vec![
                Value::from("GLVQPGGS"),
                Value::from("treated"),
                Value::from("heavy"),
                Value::from("H"),
                Value::from(10),
                Value::from(17)
            ]
        );
    }

    #[test]
    fn restrict_by_metadata() {
        let index = ReferenceIndex::new([
            ReferenceSequence::new("first", "PEPTIDEK").with_metadata("chain", "H"),
            ReferenceSequence::new("second", "KPEPTIDE").with_metadata("chain", "L"),
        ]);
        let data = table!("Sequence", "chain"; ["PEPTIDE", "L"], ["PEPTIDE", Value::Null]);
        let table = match_positions(
            &data,
            &index,
            &MatchParameters::new("Sequence").with_match_columns(["chain"]),
        )
        .unwrap();
        assert_eq!(table.columns(), ["Sequence", "chain", REFERENCE, START, END]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, REFERENCE), Some(&Value::from("second")));
        assert_eq!(table.get(0, START), Some(&Value::from(2)));

        let table = match_positions(&data, &index, &MatchParameters::new("Sequence")).unwrap();
        assert_eq!(table.len(), 4);

        let error = match_positions(
            &data,
            &index,
            &MatchParameters::new("Sequence").with_match_columns(["epitope"]),
        )
        .unwrap_err();
        assert!(error.to_string().contains("Missing reference column"));
    }

    #[test]
    fn length_filter() {
        let data = table!("Sequence"; ["LVESGGGLV"], ["LVESGGGLVQ"]);
        let table = match_positions(
            &data,
            &index(),
            &MatchParameters::new("Sequence").with_length_range(10, 30),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "Sequence"), Some(&Value::from("LVESGGGLVQ")));
    }

    #[test]
    fn reserved_output_columns() {
        let data = table!("Sequence", "start"; ["PEPTIDE", 1]);
        assert!(match_positions(&data, &index(), &MatchParameters::new("Sequence")).is_err());
        assert!(
            match_positions(
                &data,
                &index(),
                &MatchParameters::new("Sequence").with_keep_columns(["Sequence"])
            )
            .is_ok()
        );
    }

    #[test]
    fn kept_metadata_column() {
        let data = table!("Sequence", "chain"; ["PEPTIDE", "H"]);
        let index = ReferenceIndex::new([
            ReferenceSequence::new("second", "KPEPTIDE").with_metadata("chain", "L"),
        ]);
        let error = match_positions(&data, &index, &MatchParameters::new("Sequence")).unwrap_err();
        assert!(error.to_string().contains("Duplicate column"));

        let table = match_positions(
            &data,
            &index,
            &MatchParameters::new("Sequence").with_keep_columns(["Sequence"]),
        )
        .unwrap();
        assert_eq!(table.columns(), ["Sequence", REFERENCE, "chain", START, END]);
        assert_eq!(table.get(0, "chain"), Some(&Value::from("L")));
    }

    #[test]
    fn index_from_table() {
        let references = table!("Region_Sequence", "name", "Epitope";
            ["PEPTIDEK", "first", "A"],
            [Value::Null, "empty", "B"],
        );
        let index = ReferenceIndex::from_table(&references, "name", "Region_Sequence").unwrap();
        assert_eq!(index.references().len(), 1);
        assert_eq!(index.metadata_columns(), ["Epitope"]);
        assert_eq!(index.references()[0].sequence, "PEPTIDEK");
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn parallel_is_identical() {
        let data = table!("Sequence"; ["LVESGGG"], ["SSYAMS"], ["QSPSS"], ["NOTFOUND"]);
        let parameters = MatchParameters::new("Sequence");
        assert_eq!(
            match_positions(&data, &index(), &parameters).unwrap(),
            par_match_positions(&data, &index(), &parameters).unwrap()
        );
    }
}
