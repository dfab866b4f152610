use std::sync::LazyLock;

use context_error::*;
use regex::Regex;

use super::{ModificationParser, PlacedModification, listed};
use crate::helper_functions::strip_plus;

static MODIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|[NCnc](?:-term)?)_[A-Za-z]_([+-]?(?:\d+(?:\.\d*)?|\.\d+))(?:_.*)?$").unwrap()
});

/// Comet modifications, a comma separated list of `position_type_mass` with an optional trailing
/// annotation: `3_V_15.994900,N-term_V_42.010600`. The plain sequence is needed to place C
/// terminal modifications.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CometParser;

impl ModificationParser for CometParser {
    fn requires_sequence(&self) -> bool {
        true
    }

    fn parse<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<Vec<PlacedModification>, BoxedError<'a, BasicKind>> {
        let tokens = listed::tokens(modified, ',');
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let length = listed::sequence_length("Comet", modified, sequence)?;
        tokens
            .into_iter()
            .map(|(offset, token)| -> Result<PlacedModification, BoxedError<'a, BasicKind>> {
                let captures = MODIFICATION.captures(token).ok_or_else(|| {
                    BoxedError::new(
                        BasicKind::Error,
                        "Invalid Comet modification",
                        "The format `position_type_mass` could not be recognised, e.g. `3_V_15.994900`",
                        Context::line(None, modified, offset, token.len()),
                    )
                })?;
                let position =
                    listed::position("Comet", &captures[1], length, modified, offset)?;
                Ok(PlacedModification::new(position, strip_plus(&captures[2])))
            })
            .collect()
    }

    fn strip<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<String, BoxedError<'a, BasicKind>> {
        listed::strip("Comet", modified, sequence)
    }
}
