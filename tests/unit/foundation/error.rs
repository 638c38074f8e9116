use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StripError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(StripError::decode("x").to_string().contains("decode error:"));
    assert!(StripError::render("x").to_string().contains("render error:"));
    assert!(StripError::export("x").to_string().contains("export error:"));
    assert!(
        StripError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StripError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_decode_variant_is_decode() {
    assert!(StripError::decode("bad png").is_decode());
    assert!(!StripError::render("bad png").is_decode());
}
