use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LdiError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LdiError::setup("x").to_string().contains("setup error:"));
    assert!(LdiError::asset("x").to_string().contains("asset error:"));
    assert!(
        LdiError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LdiError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
