use std::sync::LazyLock;

use context_error::*;
use regex::Regex;

use super::{ModificationParser, PlacedModification, listed};

static MODIFICATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+|[NCnc]-term)\s*,\s*([^,;]*[^,;\s])$").unwrap());

/// pFind modifications, a semicolon separated list of position and modification name with its
/// site: `0,Acetyl[AnyN-term];3,Oxidation[M];`. The name is kept as the mass key. Position 0 is the
/// N terminus, C terminal modifications (written at length + 1 or with a C-term site) are placed at
/// the peptide length.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PFindParser;

impl ModificationParser for PFindParser {
    fn requires_sequence(&self) -> bool {
        true
    }

    fn parse<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<Vec<PlacedModification>, BoxedError<'a, BasicKind>> {
        let tokens = listed::tokens(modified, ';');
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let length = listed::sequence_length("pFind", modified, sequence)?;
        tokens
            .into_iter()
            .map(|(offset, token)| -> Result<PlacedModification, BoxedError<'a, BasicKind>> {
                let captures = MODIFICATION.captures(token).ok_or_else(|| {
                    BoxedError::new(
                        BasicKind::Error,
                        "Invalid pFind modification",
                        "The format `position,name` could not be recognised, e.g. `3,Oxidation[M]`",
                        Context::line(None, modified, offset, token.len()),
                    )
                })?;
                let code = &captures[2];
                let location = &captures[1];
                let position = if code.contains("C-term") || location == (length + 1).to_string() {
                    length
                } else {
                    listed::position("pFind", location, length, modified, offset)?
                };
                Ok(PlacedModification::new(position, code))
            })
            .collect()
    }

    fn strip<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<String, BoxedError<'a, BasicKind>> {
        listed::strip("pFind", modified, sequence)
    }
}
