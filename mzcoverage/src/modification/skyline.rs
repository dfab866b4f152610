use super::bracket::SIGNED_NUMBER;

bracket_format!(
    /// Skyline modified sequences with mass shifts in square brackets: `AC[+57.021464]DEM[+15.994915]K`
    SkylineParser, "Skyline", (b'[', b']'), flanking_underscores: false,
    &SIGNED_NUMBER, "A Skyline modification has to be a mass shift, e.g. `[+57.021464]`"
);
