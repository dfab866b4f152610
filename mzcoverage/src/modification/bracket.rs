use std::{ops::Range, sync::LazyLock};

use context_error::*;
use regex::Regex;

use crate::{
    helper_functions::{end_of_enclosure, strip_plus},
    modification::PlacedModification,
};

/// A signed decimal number as used for mass shifts, e.g. `+42`, `-0.98`, or `15.9949`
pub(super) static SIGNED_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)\s*$").unwrap());

/// Set up a bracket notation format: the parser type, its documentation, and the convention used.
macro_rules! bracket_format {
    ($(#[doc = $doc:expr])*
     $parser:ident, $name:expr, ($open:expr, $close:expr), flanking_underscores: $underscores:expr,
     $content:expr, $description:expr) => {
        static CONVENTION: super::bracket::BracketConvention = super::bracket::BracketConvention {
            name: $name,
            open: $open,
            close: $close,
            flanking_underscores: $underscores,
            content: $content,
            content_description: $description,
        };

        $(#[doc = $doc])*
        #[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub struct $parser;

        impl super::ModificationParser for $parser {
            fn requires_sequence(&self) -> bool {
                false
            }

            fn parse<'a>(
                &self,
                modified: &'a str,
                _sequence: Option<&'a str>,
            ) -> Result<Vec<super::PlacedModification>, context_error::BoxedError<'a, context_error::BasicKind>> {
                CONVENTION.parse(modified)
            }

            fn strip<'a>(
                &self,
                modified: &'a str,
                _sequence: Option<&'a str>,
            ) -> Result<String, context_error::BoxedError<'a, context_error::BasicKind>> {
                CONVENTION.strip(modified)
            }
        }
    };
}

/// A notation where modifications are written inline between delimiters directly after the
/// modified residue, or before the first residue for N terminal modifications.
#[derive(Debug)]
pub(super) struct BracketConvention {
    pub(super) name: &'static str,
    pub(super) open: u8,
    pub(super) close: u8,
    /// The sequence can be wrapped in underscores as in `_PEPTIDE_`
    pub(super) flanking_underscores: bool,
    pub(super) content: &'static LazyLock<Regex>,
    pub(super) content_description: &'static str,
}

impl BracketConvention {
    /// Find the sequence body (without flanking underscores) and all bracketed spans (including
    /// their delimiters) in order.
    fn spans<'a>(
        &self,
        line: &'a str,
    ) -> Result<(Range<usize>, Vec<Range<usize>>), BoxedError<'a, BasicKind>> {
        let bytes = line.as_bytes();
        let mut start = 0;
        let mut end = line.len();
        if self.flanking_underscores {
            while start < end && bytes[start] == b'_' {
                start += 1;
            }
            while end > start && bytes[end - 1] == b'_' {
                end -= 1;
            }
        }

        let mut spans = Vec::new();
        let mut index = start;
        while index < end {
            let ch = bytes[index];
            if ch == self.open {
                let close = end_of_enclosure(&line[..end], index + 1, self.open, self.close)
                    .ok_or_else(|| {
                        BoxedError::new(
                            BasicKind::Error,
                            "Invalid modification",
                            "No valid closing delimiter",
                            Context::line(None, line, index, 1),
                        )
                    })?;
                spans.push(index..close + 1);
                index = close + 1;
            } else if ch == self.close {
                return Err(BoxedError::new(
                    BasicKind::Error,
                    "Invalid modification",
                    "This closing delimiter does not have a matching opening delimiter",
                    Context::line(None, line, index, 1),
                ));
            } else {
                index += 1;
            }
        }
        Ok((start..end, spans))
    }

    /// Read all modifications. The position is the 0-based index of the residue preceding the
    /// bracket, this is the bracket offset minus the length of all preceding brackets. A bracket
    /// before the first residue gives 0.
    pub(super) fn parse<'a>(
        &self,
        line: &'a str,
    ) -> Result<Vec<PlacedModification>, BoxedError<'a, BasicKind>> {
        let (body, spans) = self.spans(line)?;
        let mut removed = 0;
        let mut modifications = Vec::with_capacity(spans.len());
        for span in spans {
            let content = &line[span.start + 1..span.end - 1];
            if !self.content.is_match(content) {
                return Err(BoxedError::new(
                    BasicKind::Error,
                    format!("Invalid {} modification", self.name),
                    self.content_description,
                    Context::line(None, line, span.start, span.len()),
                ));
            }
            let residues_before = span.start - body.start - removed;
            modifications.push(PlacedModification::new(
                residues_before.saturating_sub(1),
                strip_plus(content),
            ));
            removed += span.len();
        }
        Ok(modifications)
    }

    /// Remove all bracketed spans and flanking underscores
    pub(super) fn strip<'a>(&self, line: &'a str) -> Result<String, BoxedError<'a, BasicKind>> {
        let (body, spans) = self.spans(line)?;
        let mut stripped = String::with_capacity(body.len());
        let mut last = body.start;
        for span in spans {
            stripped.push_str(&line[last..span.start]);
            last = span.end;
        }
        stripped.push_str(&line[last..body.end]);
        Ok(stripped)
    }
}
