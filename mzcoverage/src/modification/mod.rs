//! Read the inline modification notations of the supported search engines.
//!
//! Every search engine has its own way of writing down where modifications sit on a peptide. Each
//! notation is handled by a separate [`ModificationParser`] and selected with the closed set of
//! [`ModificationFormat`]s.

use std::str::FromStr;

use context_error::*;
use serde::{Deserialize, Serialize};

use crate::helper_functions::similar_names;

#[macro_use]
mod bracket;
mod comet;
mod diann;
mod listed;
mod maxquant;
mod msfragger;
mod peaks;
mod pfind;
mod skyline;
mod spectronaut;

pub use comet::*;
pub use diann::*;
pub use maxquant::*;
pub use msfragger::*;
pub use peaks::*;
pub use pfind::*;
pub use skyline::*;
pub use spectronaut::*;

#[cfg(test)]
mod diann_tests;
#[cfg(test)]
mod msfragger_tests;
#[cfg(test)]
mod peaks_tests;
#[cfg(test)]
mod pfind_tests;
#[cfg(test)]
mod skyline_tests;

/// A modification as read from a modified sequence, before it is expanded into table rows
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlacedModification {
    /// The position on the stripped peptide, see [`ModificationFormat`] for the conventions
    pub position: usize,
    /// The mass (or engine specific code) as written, with any leading `+` removed
    pub mass: String,
}

impl PlacedModification {
    pub(crate) fn new(position: usize, mass: impl Into<String>) -> Self {
        Self {
            position,
            mass: mass.into(),
        }
    }
}

/// The shared contract for all modification notations
pub trait ModificationParser: Send + Sync {
    /// If the modifications refer to a separately provided plain sequence
    fn requires_sequence(&self) -> bool;

    /// Read all modifications from the modified sequence. Any empty result means the peptide is
    /// unmodified.
    /// # Errors
    /// If any modification does not follow the notation of this format, or if the plain sequence
    /// is needed but not given.
    fn parse<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<Vec<PlacedModification>, BoxedError<'a, BasicKind>>;

    /// Get the stripped sequence, the peptide without any modification annotations.
    /// # Errors
    /// If the modified sequence does not follow the notation of this format, or if the plain
    /// sequence is needed but not given.
    fn strip<'a>(
        &self,
        modified: &'a str,
        sequence: Option<&'a str>,
    ) -> Result<String, BoxedError<'a, BasicKind>>;
}

/// All supported modification notations.
///
/// The bracket notations ([`Self::Peaks`], [`Self::Skyline`], [`Self::Spectronaut`],
/// [`Self::DiaNN`], [`Self::MaxQuant`]) give the 0-based index of the modified residue, with N
/// terminal modifications at 0. The list notations ([`Self::MSFragger`], [`Self::Comet`],
/// [`Self::PFind`]) give the residue number as written by the engine, with N terminal
/// modifications at 0 and C terminal modifications at the peptide length. The list notations need
/// the plain sequence in a separate column.
#[derive(
    Copy, Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ModificationFormat {
    /// `AAN(+42)Q(-0.98)R`
    #[default]
    #[serde(rename = "PEAKS", alias = "Peaks", alias = "peaks")]
    Peaks,
    /// `AAN[+42]Q[-0.98]R`
    #[serde(alias = "skyline")]
    Skyline,
    /// `_[Acetyl (Protein N-term)]M[Oxidation (M)]K_`
    #[serde(alias = "spectronaut")]
    Spectronaut,
    /// `(UniMod:1)AAM(UniMod:35)K`
    #[serde(rename = "DIA-NN", alias = "DIANN", alias = "DiaNN", alias = "diann")]
    DiaNN,
    /// `_(ac)AAM(ox)K_` or `_(Acetyl (Protein N-term))AAM(Oxidation (M))K_`
    #[serde(alias = "Maxquant", alias = "maxquant")]
    MaxQuant,
    /// `N-term(42.0106), 3M(15.9949)`
    #[serde(alias = "msfragger")]
    MSFragger,
    /// `3_V_15.994900,N-term_V_42.010600`
    #[serde(alias = "comet")]
    Comet,
    /// `0,Acetyl[AnyN-term];3,Oxidation[M];`
    #[serde(rename = "pFind", alias = "PFind", alias = "pfind")]
    PFind,
}

impl ModificationFormat {
    /// All formats in a fixed order
    pub const ALL: [Self; 8] = [
        Self::Peaks,
        Self::Skyline,
        Self::Spectronaut,
        Self::DiaNN,
        Self::MaxQuant,
        Self::MSFragger,
        Self::Comet,
        Self::PFind,
    ];

    /// The canonical name of this format
    pub const fn name(self) -> &'static str {
        match self {
            Self::Peaks => "PEAKS",
            Self::Skyline => "Skyline",
            Self::Spectronaut => "Spectronaut",
            Self::DiaNN => "DIA-NN",
            Self::MaxQuant => "MaxQuant",
            Self::MSFragger => "MSFragger",
            Self::Comet => "Comet",
            Self::PFind => "pFind",
        }
    }

    /// The parser for this format
    pub fn parser(self) -> &'static dyn ModificationParser {
        match self {
            Self::Peaks => &PeaksParser,
            Self::Skyline => &SkylineParser,
            Self::Spectronaut => &SpectronautParser,
            Self::DiaNN => &DiaNNParser,
            Self::MaxQuant => &MaxQuantParser,
            Self::MSFragger => &MSFraggerParser,
            Self::Comet => &CometParser,
            Self::PFind => &PFindParser,
        }
    }

    /// If this format needs the plain sequence in a separate column
    pub fn requires_sequence(self) -> bool {
        self.parser().requires_sequence()
    }
}

impl std::fmt::Display for ModificationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ModificationFormat {
    type Err = BoxedError<'static, BasicKind>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "peaks" => Ok(Self::Peaks),
            "skyline" => Ok(Self::Skyline),
            "spectronaut" => Ok(Self::Spectronaut),
            "dia-nn" | "diann" => Ok(Self::DiaNN),
            "maxquant" => Ok(Self::MaxQuant),
            "msfragger" | "fragpipe" => Ok(Self::MSFragger),
            "comet" => Ok(Self::Comet),
            "pfind" => Ok(Self::PFind),
            _ => Err(BoxedError::new(
                BasicKind::Error,
                "Unsupported modification format",
                format!(
                    "The format has to be one of: {}",
                    Self::ALL.map(Self::name).join(", ")
                ),
                Context::show(s.to_string()),
            )
            .suggestions(similar_names(s, Self::ALL.map(Self::name)))),
        }
    }
}
