#![allow(clippy::missing_panics_doc)]
use crate::modification::{DiaNNParser, ModificationParser, PlacedModification};

#[test]
fn diann_unimod_accessions() {
    let sequence = "(UniMod:1)AAM(UniMod:35)K";
    assert_eq!(
        DiaNNParser.parse(sequence, None).unwrap(),
        vec![
            PlacedModification::new(0, "UniMod:1"),
            PlacedModification::new(2, "UniMod:35")
        ]
    );
    assert_eq!(DiaNNParser.strip(sequence, None).unwrap(), "AAMK");
}

#[test]
fn diann_rejects_names() {
    assert!(DiaNNParser.parse("AAM(Oxidation)K", None).is_err());
    assert!(DiaNNParser.parse("AAM(UniMod:)K", None).is_err());
}
