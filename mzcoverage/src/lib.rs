#![doc = include_str!("../README.md")]

mod helper_functions;

/// Match stripped peptides to reference sequences
pub mod matching;
pub mod modification;
/// Expand identifications into one row per modification
pub mod normalise;
pub mod pipeline;
/// Count peptides and PSMs per reference region
pub mod quantification;
pub mod table;

/// A subset of the types and functions that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::matching::{
        END, MatchParameters, REFERENCE, ReferenceIndex, ReferenceSequence, START, SequenceMatch,
        match_positions,
    };
    #[cfg(feature = "rayon")]
    pub use crate::matching::par_match_positions;
    pub use crate::modification::{ModificationFormat, ModificationParser, PlacedModification};
    pub use crate::normalise::{
        MassColumn, NormaliseParameters, PTM_POSITION, PTM_TYPE, PtmTable, REPS, normalise,
        strip_sequence,
    };
    pub use crate::pipeline::{PipelineOutput, PipelineParameters};
    pub use crate::quantification::{
        COUNT, QuantificationMethod, QuantificationParameters, coverage, quantify,
    };
    pub use crate::table::{Table, Value};
}
