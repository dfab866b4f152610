#![allow(clippy::missing_panics_doc)]
use crate::modification::{ModificationParser, PFindParser, PlacedModification};

#[test]
fn pfind_modifications() {
    assert_eq!(
        PFindParser
            .parse("0,Acetyl[AnyN-term];3,Oxidation[M];", Some("AAMK"))
            .unwrap(),
        vec![
            PlacedModification::new(0, "Acetyl[AnyN-term]"),
            PlacedModification::new(3, "Oxidation[M]")
        ]
    );
}

#[test]
fn pfind_c_terminal() {
    assert_eq!(
        PFindParser
            .parse("5,Amidated[AnyC-term];", Some("AAMK"))
            .unwrap(),
        vec![PlacedModification::new(4, "Amidated[AnyC-term]")]
    );
    assert_eq!(
        PFindParser
            .parse("4,Amidated[AnyC-term];", Some("AAMK"))
            .unwrap(),
        vec![PlacedModification::new(4, "Amidated[AnyC-term]")]
    );
}

#[test]
fn pfind_invalid() {
    assert!(PFindParser.parse("9,Oxidation[M];", Some("AAMK")).is_err());
    assert!(PFindParser.parse("Oxidation[M]", Some("AAMK")).is_err());
    assert!(PFindParser.parse("3,;", Some("AAMK")).is_err());
}
