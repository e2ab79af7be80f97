use ophys::{cre_to_layer, CreLine, Error};

#[test]
fn known_lines_map_to_documented_layers() {
    let expected = [
        ("Cux2-CreERT2", "Layer 2/3 & 4"),
        ("Emx1-IRES-Cre", "Pan excitatory expression"),
        ("Nr5a1-Cre", "Layer 4"),
        ("Rbp4-Cre_KL100", "Layer 5"),
        ("Rorb-IRES2-Cre", "Layer 4"),
        ("Scnn1a-Tg3-Cre", "Layer 4"),
    ];
    for (name, layer) in expected {
        assert_eq!(cre_to_layer(name).unwrap(), layer, "{name}");
    }
    assert_eq!(CreLine::ALL.len(), expected.len());
}

#[test]
fn unknown_line_is_an_error() {
    let err = cre_to_layer("Vip-IRES-Cre").unwrap_err();
    assert!(matches!(err, Error::UnknownCreLine(ref n) if n == "Vip-IRES-Cre"));
    assert!(cre_to_layer("").is_err());
}
