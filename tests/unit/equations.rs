use super::*;
use crate::foundation::core::ImageIndex;

fn src(color: &str, alpha: &str, visible: bool) -> EquationSource {
    EquationSource {
        color: color.to_owned(),
        alpha: alpha.to_owned(),
        visible,
    }
}

#[test]
fn default_config_shows_slot_zero_only() {
    let cfg = EquationsConfig::default();
    assert_eq!(cfg.equations.len(), DEFAULT_SLOTS);
    assert_eq!(cfg.equations[2], src("I2", "I2", false));
    assert!(cfg.equations[0].visible);
    assert!(cfg.equations[1..].iter().all(|s| !s.visible));
}

#[test]
fn apply_all_applies_visible_slots() {
    let mut eqs = Equations::default();
    let sources = vec![
        src("I0 * 0.5", "I0", true),
        src("I1", "I1", false),
        src("blend(I0, I1)", "1", true),
    ];
    eqs.apply_all(&sources, 2).unwrap();

    let s0 = eqs.get(0).unwrap();
    assert_eq!(s0.color.source(), "I0 * 0.5");
    assert!(s0.visible);

    // Hidden slots are not compiled.
    let s1 = eqs.get(1).unwrap();
    assert!(s1.color.root().is_none());
    assert!(!s1.visible);

    assert_eq!(eqs.get(2).unwrap().alpha.source(), "1");
    assert!(!eqs.has_changes(&sources));
}

#[test]
fn apply_all_collects_every_error_and_keeps_successes() {
    let mut eqs = Equations::default();
    let sources = vec![src("I0 +", "I0", true), src("I1", "I5", true)];
    let errs = eqs.apply_all(&sources, 2).unwrap_err().0;

    assert_eq!(errs.len(), 2);
    assert_eq!((errs[0].slot, errs[0].channel), (0, Channel::Color));
    assert!(errs[0].error.is_stuck());
    assert_eq!((errs[1].slot, errs[1].channel), (1, Channel::Alpha));
    assert_eq!(errs[1].error, FormulaError::UnknownImage(ImageIndex(5)));

    // The successful halves were kept.
    assert_eq!(eqs.get(0).unwrap().alpha.source(), "I0");
    assert_eq!(eqs.get(1).unwrap().color.source(), "I1");
    assert!(eqs.has_changes(&sources));
}

#[test]
fn failed_apply_keeps_previous_formula() {
    let mut eqs = Equations::new(1);
    eqs.apply_all(&[src("I0", "I0", true)], 1).unwrap();
    assert!(eqs.apply_all(&[src("I0 *", "I0", true)], 1).is_err());
    assert_eq!(eqs.get(0).unwrap().color.source(), "I0");
}

#[test]
fn has_changes_ignores_hidden_slots() {
    let mut eqs = Equations::new(2);
    let mut sources = vec![src("I0", "I0", true), src("I1", "I1", false)];
    assert!(eqs.has_changes(&sources));
    eqs.apply_all(&sources, 2).unwrap();
    assert!(!eqs.has_changes(&sources));

    sources[1].color = "I0".to_owned();
    assert!(!eqs.has_changes(&sources));
    sources[0].alpha = "1".to_owned();
    assert!(eqs.has_changes(&sources));
}

#[test]
fn config_json_roundtrip_and_validation() {
    let cfg = EquationsConfig::default();
    let json = cfg.to_json_string().unwrap();
    assert_eq!(EquationsConfig::from_json_str(&json).unwrap(), cfg);

    let parsed =
        EquationsConfig::from_json_str(r#"{"equations":[{"color":"I0","alpha":"1"}]}"#).unwrap();
    assert!(!parsed.equations[0].visible);
    assert_eq!(parsed.new_equations().len(), 1);

    assert!(matches!(
        EquationsConfig::from_json_str(r#"{"equations":[]}"#),
        Err(TexError::Validation(_))
    ));
    assert!(matches!(
        EquationsConfig::from_json_str("{"),
        Err(TexError::Serde(_))
    ));
}

#[test]
fn error_display_names_slot_and_channel() {
    let e = EquationError {
        slot: 3,
        channel: Channel::Alpha,
        error: FormulaError::UnknownImage(ImageIndex(9)),
    };
    assert_eq!(e.to_string(), "equation 3 alpha: unknown image I9");
}
