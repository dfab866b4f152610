use std::sync::LazyLock;

use regex::Regex;

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\[\]]*[^\s\[\]][^\[\]]*$").unwrap());

bracket_format!(
    /// Spectronaut modified sequences, named modifications in square brackets with the whole
    /// sequence optionally wrapped in underscores: `_[Acetyl (Protein N-term)]M[Oxidation (M)]K_`
    SpectronautParser, "Spectronaut", (b'[', b']'), flanking_underscores: true,
    &NAME, "A Spectronaut modification has to be a modification name, e.g. `[Oxidation (M)]`"
);
