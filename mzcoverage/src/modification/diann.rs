use std::sync::LazyLock;

use regex::Regex;

static UNIMOD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^UniMod:\d+$").unwrap());

bracket_format!(
    /// DIA-NN modified sequences with Unimod accessions in round brackets:
    /// `(UniMod:1)AAM(UniMod:35)K`. The accession is kept as the mass key.
    DiaNNParser, "DIA-NN", (b'(', b')'), flanking_underscores: false,
    &UNIMOD, "A DIA-NN modification has to be a Unimod accession, e.g. `(UniMod:35)`"
);
