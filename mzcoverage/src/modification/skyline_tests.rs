#![allow(clippy::missing_panics_doc)]
use crate::modification::{ModificationParser, PlacedModification, SkylineParser};

#[test]
fn skyline_mass_shifts() {
    assert_eq!(
        SkylineParser
            .parse("AC[+57.021464]DEM[+15.994915]K", None)
            .unwrap(),
        vec![
            PlacedModification::new(1, "57.021464"),
            PlacedModification::new(4, "15.994915")
        ]
    );
    assert_eq!(
        SkylineParser
            .strip("AC[+57.021464]DEM[+15.994915]K", None)
            .unwrap(),
        "ACDEMK"
    );
}

#[test]
fn skyline_invalid() {
    assert!(SkylineParser.parse("PEPTIDE[Oxidation]", None).is_err());
    assert!(SkylineParser.parse("PEP[+1", None).is_err());
    assert!(SkylineParser.parse("PEP]TIDE", None).is_err());
}
