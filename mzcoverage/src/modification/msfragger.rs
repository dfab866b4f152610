use std::sync::LazyLock;

use context_error::*;
use regex::Regex;

use super::{ModificationParser, PlacedModification, listed};
use crate::helper_functions::strip_plus;

static MODIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)[A-Za-z]|([NCnc]-term))\s*\(\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*\)$")
        .unwrap()
});

/// MSFragger (FragPipe) assigned modifications, a comma separated list of residue number, residue,
/// and mass: `N-term(42.0106), 3M(15.9949)`. The plain sequence is needed to place C terminal
/// modifications.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MSFraggerParser;

impl ModificationParser for MSFraggerParser {
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
        let length = listed::sequence_length("MSFragger", modified, sequence)?;
        tokens
            .into_iter()
            .map(|(offset, token)| -> Result<PlacedModification, BoxedError<'a, BasicKind>> {
                let captures = MODIFICATION.captures(token).ok_or_else(|| {
                    BoxedError::new(
                        BasicKind::Error,
                        "Invalid MSFragger modification",
                        "The format `location(modification)` could not be recognised, e.g. `3M(15.9949)` or `N-term(42.0106)`",
                        Context::line(None, modified, offset, token.len()),
                    )
                })?;
                let (location, start) = captures
                    .get(1)
                    .or_else(|| captures.get(2))
                    .map_or((token, 0), |m| (m.as_str(), m.start()));
                let position =
                    listed::position("MSFragger", location, length, modified, offset + start)?;
                Ok(PlacedModification::new(position, strip_plus(&captures[3])))
            })
            .collect()
    }

    fn strip<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<String, BoxedError<'a, BasicKind>> {
        listed::strip("MSFragger", modified, sequence)
    }
}
