#![allow(clippy::missing_panics_doc)]
use crate::modification::{ModificationParser, PeaksParser, PlacedModification};

#[test]
fn peaks_mass_shifts() {
    let parsed = PeaksParser
        .parse("AAN(+42)Q(-0.98)RGSLYQCDYSTGSCEPIR", None)
        .unwrap();
    assert_eq!(
        parsed,
        vec![
            PlacedModification::new(2, "42"),
            PlacedModification::new(3, "-0.98")
        ]
    );
    assert_eq!(
        PeaksParser
            .strip("AAN(+42)Q(-0.98)RGSLYQCDYSTGSCEPIR", None)
            .unwrap(),
        "AANQRGSLYQCDYSTGSCEPIR"
    );
}

#[test]
fn peaks_n_terminal() {
    assert_eq!(
        PeaksParser.parse("(+42.01)PEPTIDE", None).unwrap(),
        vec![PlacedModification::new(0, "42.01")]
    );
    assert_eq!(
        PeaksParser.parse("M(+15.99)", None).unwrap(),
        vec![PlacedModification::new(0, "15.99")]
    );
}

#[test]
fn peaks_unmodified() {
    assert!(PeaksParser.parse("PEPTIDE", None).unwrap().is_empty());
    assert_eq!(PeaksParser.strip("PEPTIDE", None).unwrap(), "PEPTIDE");
}

#[test]
fn peaks_named_modification_is_rejected() {
    let error = PeaksParser.parse("PEPT(ox)IDE", None).unwrap_err();
    assert!(error.to_string().contains("Invalid PEAKS modification"));
}
