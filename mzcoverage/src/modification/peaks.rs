use super::bracket::SIGNED_NUMBER;

bracket_format!(
    /// PEAKS peptides, mass shifts in round brackets after the modified residue: `AAN(+42)Q(-0.98)R`
    PeaksParser, "PEAKS", (b'(', b')'), flanking_underscores: false,
    &SIGNED_NUMBER, "A PEAKS modification has to be a mass shift, e.g. `(+15.99)`"
);
