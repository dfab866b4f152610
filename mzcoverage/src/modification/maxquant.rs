use std::sync::LazyLock;

use regex::Regex;

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^()\s][^()]*(?:\([^()]*\))?$").unwrap());

bracket_format!(
    /// MaxQuant modified sequences, wrapped in underscores with the modification code or full
    /// name in round brackets: `_(ac)AAM(ox)K_` or `_(Acetyl (Protein N-term))AAM(Oxidation (M))K_`
    MaxQuantParser, "MaxQuant", (b'(', b')'), flanking_underscores: true,
    &CODE, "A MaxQuant modification has to be a short code or a name, e.g. `(ox)` or `(Oxidation (M))`"
);
