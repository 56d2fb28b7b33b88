use super::*;
use crate::formula::error::{LexError, SyntaxError};

#[test]
fn single_image_reference() {
    let f = Formula::new("I0", 1).unwrap();
    assert_eq!(f.root(), Some(&Expr::image(0)));
    assert_eq!(f.source(), "I0");
    assert_eq!(f.num_images(), 1);
}

#[test]
fn rejects_out_of_range_image_and_keeps_previous_tree() {
    let mut f = Formula::new("I0", 1).unwrap();
    let err = f.apply_formula("blend(I0,I1)", 1).unwrap_err();
    assert_eq!(err, FormulaError::UnknownImage(ImageIndex(1)));
    assert_eq!(f.root(), Some(&Expr::image(0)));
    assert_eq!(f.source(), "I0");
    assert!(!f.has_changes("I0"));
}

#[test]
fn reports_leftmost_out_of_range_image() {
    let err = compile("I5 + I3 * I0", 2).unwrap_err();
    assert_eq!(err, FormulaError::UnknownImage(ImageIndex(5)));
}

#[test]
fn lex_errors_surface_as_syntax() {
    let mut f = Formula::empty();
    let err = f.apply_formula("I0 # I1", 2).unwrap_err();
    assert!(matches!(
        err,
        FormulaError::Syntax(SyntaxError::Lex(LexError::UnexpectedChar { ch: '#', .. }))
    ));
    assert_eq!(f.root(), None);
}

#[test]
fn stuck_surfaces_as_syntax_with_span() {
    let err = compile("I0 + (I1", 2).unwrap_err();
    assert!(err.is_stuck());
    assert_eq!(err.span(), Some(crate::foundation::core::Span::new(0, 8)));
}

#[test]
fn has_changes_is_plain_text_comparison() {
    let f = Formula::new("I0 + I1", 2).unwrap();
    assert!(!f.has_changes("I0 + I1"));
    // Semantically equal but textually different.
    assert!(f.has_changes("I0+I1"));
}

#[test]
fn never_applied_formula_has_changes() {
    let f = Formula::default();
    assert!(f.has_changes(""));
    assert_eq!(f.max_image(), None);
}

#[test]
fn reapply_replaces_tree() {
    let mut f = Formula::new("I0", 2).unwrap();
    f.apply_formula("I0 + I1", 2).unwrap();
    assert_eq!(f.max_image(), Some(ImageIndex(1)));
    assert!(f.has_changes("I0"));
}

#[test]
fn custom_rule_set_is_honored() {
    let rules = RuleSet::new(
        RuleSet::standard()
            .rules()
            .iter()
            .copied()
            .filter(|r| r.name != "additive")
            .collect(),
    )
    .unwrap();
    assert!(compile_with("I0 * I1", 2, &rules).is_ok());
    assert!(compile_with("I0 + I1", 2, &rules).unwrap_err().is_stuck());
}
