#![allow(clippy::missing_panics_doc)]
use crate::modification::{MSFraggerParser, ModificationParser, PlacedModification};

#[test]
fn msfragger_assigned_modifications() {
    assert_eq!(
        MSFraggerParser
            .parse("N-term(42.0106), 3M(15.9949)", Some("AAMK"))
            .unwrap(),
        vec![
            PlacedModification::new(0, "42.0106"),
            PlacedModification::new(3, "15.9949")
        ]
    );
    assert_eq!(
        MSFraggerParser
            .parse("C-term(-0.9840)", Some("PEPTIDE"))
            .unwrap(),
        vec![PlacedModification::new(7, "-0.9840")]
    );
}

#[test]
fn msfragger_needs_sequence() {
    assert!(MSFraggerParser.parse("3M(15.9949)", None).is_err());
    assert!(MSFraggerParser.parse("", None).unwrap().is_empty());
    assert!(MSFraggerParser.strip("3M(15.9949)", None).is_err());
    assert_eq!(
        MSFraggerParser.strip("3M(15.9949)", Some("AAMK")).unwrap(),
        "AAMK"
    );
}

#[test]
fn msfragger_invalid() {
    assert!(MSFraggerParser.parse("9M(15.9949)", Some("PEPTIDE")).is_err());
    assert!(MSFraggerParser.parse("3M[15.9949]", Some("PEPTIDE")).is_err());
    assert!(MSFraggerParser.parse("M(15.9949)", Some("PEPTIDE")).is_err());
}
