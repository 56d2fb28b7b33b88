use super::*;
use crate::foundation::core::ImageIndex;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TexError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TexError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(TexError::image("x").to_string().contains("image error:"));
    assert!(
        TexError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn formula_errors_convert() {
    let err: TexError = FormulaError::UnknownImage(ImageIndex(3)).into();
    assert!(matches!(err, TexError::Formula(_)));
    assert_eq!(err.to_string(), "formula error: unknown image I3");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TexError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
