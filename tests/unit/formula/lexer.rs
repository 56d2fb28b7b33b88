use super::*;
use crate::formula::token::{Arity, OpClass};

fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src).unwrap().iter().map(Token::kind).collect()
}

#[test]
fn function_absorbs_open_bracket() {
    let toks = tokenize("blend(I0,I1)").unwrap();
    assert_eq!(
        toks.iter().map(Token::kind).collect::<Vec<_>>(),
        vec![
            TokenKind::Function(Arity::Binary),
            TokenKind::Value,
            TokenKind::Separator,
            TokenKind::Value,
            TokenKind::BracketClose,
        ]
    );
    assert_eq!(toks[0].span, Span::new(0, 6));
    match &toks[0].data {
        TokenData::Function { name, .. } => assert_eq!(name, "blend"),
        other => panic!("unexpected token {other:?}"),
    }
}

#[test]
fn whitespace_between_name_and_bracket_is_allowed() {
    assert_eq!(
        kinds("sqrt (I0)"),
        vec![
            TokenKind::Function(Arity::Unary),
            TokenKind::Value,
            TokenKind::BracketClose,
        ]
    );
}

#[test]
fn unknown_function_lexes_with_unknown_arity() {
    assert_eq!(kinds("foo(I0")[0], TokenKind::Function(Arity::Unknown));
}

#[test]
fn image_references() {
    let toks = tokenize("I0 + i12").unwrap();
    assert_eq!(toks[0].as_value(), Some(&Expr::image(0)));
    assert_eq!(toks[2].as_value(), Some(&Expr::image(12)));
    assert_eq!(toks[2].span, Span::new(5, 8));
}

#[test]
fn numbers() {
    let toks = tokenize("1 2.5 .25 3e2 4e-1").unwrap();
    let vals: Vec<_> = toks.iter().map(|t| t.as_value().cloned().unwrap()).collect();
    assert_eq!(
        vals,
        vec![
            Expr::number(1.0),
            Expr::number(2.5),
            Expr::number(0.25),
            Expr::number(300.0),
            Expr::number(0.4),
        ]
    );
}

#[test]
fn sign_folds_into_literal_in_operand_position() {
    let toks = tokenize("-2 * (-3) ^ -0.5").unwrap();
    assert_eq!(toks[0].as_value(), Some(&Expr::number(-2.0)));
    assert_eq!(toks[0].span, Span::new(0, 2));
    assert_eq!(toks[3].as_value(), Some(&Expr::number(-3.0)));
    assert_eq!(toks[6].as_value(), Some(&Expr::number(-0.5)));
}

#[test]
fn detached_sign_is_negate() {
    assert_eq!(
        kinds("- 3"),
        vec![TokenKind::Operator(OpClass::Sign), TokenKind::Value]
    );
    assert_eq!(tokenize("-+3").unwrap()[1].as_value(), Some(&Expr::number(3.0)));
}

#[test]
fn sign_does_not_fold_into_power_base() {
    for src in ["-2^2", "-2 ^ 2"] {
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::Operator(OpClass::Sign),
                TokenKind::Value,
                TokenKind::Operator(OpClass::Power),
                TokenKind::Value,
            ],
            "{src}"
        );
    }
    // The exponent itself still folds.
    assert_eq!(tokenize("2^-2").unwrap()[2].as_value(), Some(&Expr::number(-2.0)));
}

#[test]
fn minus_after_value_is_subtraction() {
    assert_eq!(
        kinds("I0 -2"),
        vec![
            TokenKind::Value,
            TokenKind::Operator(OpClass::Additive),
            TokenKind::Value,
        ]
    );
    assert_eq!(
        kinds("(I0)-2"),
        vec![
            TokenKind::BracketOpen,
            TokenKind::Value,
            TokenKind::BracketClose,
            TokenKind::Operator(OpClass::Additive),
            TokenKind::Value,
        ]
    );
}

#[test]
fn minus_before_non_literal_is_negate() {
    assert_eq!(
        kinds("-I0 * -sin(I1)"),
        vec![
            TokenKind::Operator(OpClass::Sign),
            TokenKind::Value,
            TokenKind::Operator(OpClass::Multiplicative),
            TokenKind::Operator(OpClass::Sign),
            TokenKind::Function(Arity::Unary),
            TokenKind::Value,
            TokenKind::BracketClose,
        ]
    );
}

#[test]
fn leading_plus_is_dropped() {
    assert_eq!(kinds("+I0"), vec![TokenKind::Value]);
}

#[test]
fn comparison_operators() {
    let toks = tokenize("I0<=I1 != I2>I3").unwrap();
    let ops: Vec<_> = toks
        .iter()
        .filter_map(|t| match t.data {
            TokenData::Operator(Operator::Binary(op)) => Some(op),
            _ => None,
        })
        .collect();
    assert_eq!(ops, vec![BinaryOp::Le, BinaryOp::Ne, BinaryOp::Gt]);
}

#[test]
fn rejects_unexpected_character() {
    let err = tokenize("I0 $ I1").unwrap_err();
    assert_eq!(
        err,
        LexError::UnexpectedChar {
            ch: '$',
            span: Span::new(3, 4),
        }
    );
}

#[test]
fn rejects_non_ascii_character_whole() {
    let err = tokenize("I0 × I1").unwrap_err();
    assert_eq!(err.span(), Span::new(3, 5));
}

#[test]
fn rejects_malformed_numbers() {
    for src in ["1e", "1.5.3", "2x", "3e+"] {
        match tokenize(src) {
            Err(LexError::InvalidNumber { text, .. }) => assert_eq!(text, src),
            other => panic!("{src}: unexpected {other:?}"),
        }
    }
}

#[test]
fn rejects_overflowing_literal_and_index() {
    assert!(matches!(
        tokenize("1e99"),
        Err(LexError::InvalidNumber { .. })
    ));
    assert!(matches!(
        tokenize("I99999999999"),
        Err(LexError::InvalidNumber { .. })
    ));
}

#[test]
fn rejects_unknown_identifier() {
    let err = tokenize("I0 + foo").unwrap_err();
    assert_eq!(
        err,
        LexError::UnknownIdentifier {
            name: "foo".to_owned(),
            span: Span::new(5, 8),
        }
    );
    assert!(matches!(
        tokenize("I"),
        Err(LexError::UnknownIdentifier { .. })
    ));
}

#[test]
fn brackets_are_not_balanced_lexically() {
    assert_eq!(
        kinds("(I0))"),
        vec![
            TokenKind::BracketOpen,
            TokenKind::Value,
            TokenKind::BracketClose,
            TokenKind::BracketClose,
        ]
    );
}

#[test]
fn empty_and_blank_input() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(tokenize("  \t\n").unwrap().is_empty());
}

#[test]
fn rejects_nesting_beyond_limit() {
    let ok = format!("{}I0{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
    assert!(tokenize(&ok).is_ok());

    let deep = format!("{}I0{}", "(".repeat(20_000), ")".repeat(20_000));
    assert_eq!(
        tokenize(&deep).unwrap_err(),
        LexError::NestingTooDeep {
            limit: MAX_NESTING,
            span: Span::new(MAX_NESTING, MAX_NESTING + 1),
        }
    );

    let calls = format!("{}I0{}", "sin(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
    assert!(matches!(
        tokenize(&calls),
        Err(LexError::NestingTooDeep { .. })
    ));
}

#[test]
fn closed_brackets_free_nesting_depth() {
    let src = vec!["(I0)"; MAX_NESTING * 2].join("+");
    assert!(tokenize(&src).is_ok());
}

#[test]
fn rejects_token_count_beyond_limit() {
    // `I0` plus `+ I0` pairs: 1 + 2k tokens.
    let fits = format!("I0{}", " + I0".repeat((MAX_TOKENS - 1) / 2));
    assert_eq!(tokenize(&fits).unwrap().len(), MAX_TOKENS - 1);

    let long = format!("I0{}", "+I0".repeat(MAX_TOKENS));
    match tokenize(&long) {
        Err(LexError::TooManyTokens { limit, span }) => {
            assert_eq!(limit, MAX_TOKENS);
            assert_eq!(span.end, long.len());
        }
        other => panic!("unexpected {other:?}"),
    }
}
