//! Run all stages in one go: strip, normalise, match, and quantify.
//!
//! All parameters can be stored as a single JSON document:
//! ```json
//! {
//!     "normalise": {"modification_column": "Peptide", "format": "PEAKS", "annotate": true},
//!     "matching": {"sequence_column": "Sequence", "length_range": [7, 30]},
//!     "quantification": {"method": "Peptide", "group_columns": ["chain", "condition"]}
//! }
//! ```
use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    matching::{MatchParameters, ReferenceIndex, match_positions},
    normalise::{NormaliseParameters, PtmTable, normalise, strip_sequence},
    quantification::{QuantificationParameters, quantify},
    table::Table,
};

/// The parameters for all stages
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct PipelineParameters {
    /// The parameters for [`normalise`]
    pub normalise: NormaliseParameters,
    /// The parameters for [`match_positions`]
    pub matching: MatchParameters,
    /// The parameters for [`quantify`]
    pub quantification: QuantificationParameters,
}

/// All intermediate tables of a pipeline run
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// One row per modification
    pub normalised: Table,
    /// One row per occurrence in the references
    pub positioned: Table,
    /// The counts per reference and group
    pub counts: Table,
}

impl PipelineParameters {
    /// Read the parameters from JSON, all missing fields take their default value.
    /// # Errors
    /// If the text is not valid JSON or does not describe pipeline parameters.
    pub fn from_json(text: &str) -> Result<Self, BoxedError<'_, BasicKind>> {
        serde_json::from_str(text).map_err(|err| {
            let line = text.lines().nth(err.line().saturating_sub(1));
            BoxedError::new(
                BasicKind::Error,
                "Invalid pipeline parameters",
                err.to_string(),
                line.map_or_else(
                    || Context::show(text),
                    |line| {
                        Context::line(
                            u32::try_from(err.line().saturating_sub(1)).ok(),
                            line,
                            err.column().saturating_sub(1),
                            1,
                        )
                    },
                ),
            )
        })
    }

    /// Write the parameters as JSON.
    /// # Errors
    /// If the parameters could not be serialised.
    pub fn to_json(&self) -> Result<String, BoxedError<'static, BasicKind>> {
        serde_json::to_string_pretty(self).map_err(|err| {
            BoxedError::new(
                BasicKind::Error,
                "Could not write pipeline parameters",
                err.to_string(),
                Context::none(),
            )
        })
    }

    /// Run all stages on the data. If the sequence column of the matcher does not exist yet, it is
    /// first filled with the stripped sequences. The mass column for quantification is the one
    /// written by normalisation.
    /// # Errors
    /// If any stage fails, see [`normalise`], [`strip_sequence`], [`match_positions`], and
    /// [`quantify`].
    pub fn run(
        &self,
        data: &Table,
        references: &ReferenceIndex,
        ptm_table: Option<&PtmTable>,
    ) -> Result<PipelineOutput, BoxedError<'static, BasicKind>> {
        let stripped;
        let data = if data.has_column(&self.matching.sequence_column) {
            data
        } else {
            log::debug!(
                "adding stripped sequences as column '{}'",
                self.matching.sequence_column
            );
            stripped = strip_sequence(data, &self.normalise, &self.matching.sequence_column)?;
            &stripped
        };
        let normalised = normalise(data, &self.normalise, ptm_table)?;
        let positioned = match_positions(&normalised, references, &self.matching)?;
        let quantification = QuantificationParameters {
            mass_column: self.normalise.mass_column.clone(),
            ..self.quantification.clone()
        };
        let counts = quantify(references, &positioned, &quantification)?;
        Ok(PipelineOutput {
            normalised,
            positioned,
            counts,
        })
    }
}
