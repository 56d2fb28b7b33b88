use crate::foundation::core::Span;
use crate::formula::error::LexError;
use crate::formula::functions::arity_of;
use crate::formula::token::{BinaryOp, Expr, Operator, Token, TokenData, TokenKind};

/// Deepest allowed nesting of `(` and `name(`.
pub const MAX_NESTING: usize = 64;

/// Longest allowed token sequence. Bounds the depth of any reduced tree.
pub const MAX_TOKENS: usize = 1024;

/// Split formula text into tokens in source order.
///
/// Conventions:
/// - `name(` lexes as one [`TokenKind::Function`] token; the bracket is absorbed.
/// - `I<digits>` (or `i<digits>`) is an image reference.
/// - A sign in operand position (start of input, or after an operator, `(`, `name(` or
///   `,`) folds into a numeric literal that follows it directly, unless that literal is
///   the base of a `^`. Otherwise a `-` there becomes a unary [`Operator::Negate`] and a
///   `+` is dropped, so `-2^2` is `-(2^2)` just like `-I0^2`.
/// - Brackets are not balanced here; the rewrite engine reports leftovers as stuck.
/// - More than [`MAX_NESTING`] open brackets or [`MAX_TOKENS`] tokens is an error.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut out: Vec<Token> = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0usize;
    let mut depth = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        if out.len() == MAX_TOKENS {
            return Err(LexError::TooManyTokens {
                limit: MAX_TOKENS,
                span: Span::new(start, input.len()),
            });
        }

        // Sign in operand position.
        if matches!(c, '+' | '-') && in_operand_position(&out) {
            if starts_number(bytes, i + 1) {
                let (v, end) = lex_number(input, i + 1)?;
                if !is_power_base(bytes, end) {
                    let v = if c == '-' { -v } else { v };
                    out.push(Token::value(Expr::number(v), Span::new(start, end)));
                    i = end;
                    continue;
                }
            }
            i += 1;
            if c == '-' {
                out.push(Token::new(
                    TokenData::Operator(Operator::Negate),
                    Span::new(start, i),
                ));
            }
            continue;
        }

        if starts_number(bytes, i) {
            let (v, end) = lex_number(input, i)?;
            out.push(Token::value(Expr::number(v), Span::new(start, end)));
            i = end;
            continue;
        }

        // Ident
        if c.is_ascii_alphabetic() || c == '_' {
            i += 1;
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    i += 1;
                } else {
                    break;
                }
            }
            let name = &input[start..i];

            let after = skip_ws(bytes, i);
            if after < bytes.len() && bytes[after] == b'(' {
                i = after + 1;
                depth = open_bracket(depth, Span::new(start, i))?;
                out.push(Token::new(
                    TokenData::Function {
                        name: name.to_owned(),
                        arity: arity_of(name),
                    },
                    Span::new(start, i),
                ));
                continue;
            }

            let span = Span::new(start, i);
            let expr = image_ref(name, span)?.ok_or_else(|| LexError::UnknownIdentifier {
                name: name.to_owned(),
                span,
            })?;
            out.push(Token::value(expr, span));
            continue;
        }

        // Two-char operators
        if i + 1 < bytes.len() {
            let op = match &bytes[i..i + 2] {
                b"<=" => Some(BinaryOp::Le),
                b">=" => Some(BinaryOp::Ge),
                b"==" => Some(BinaryOp::Eq),
                b"!=" => Some(BinaryOp::Ne),
                _ => None,
            };
            if let Some(op) = op {
                i += 2;
                out.push(Token::new(
                    TokenData::Operator(Operator::Binary(op)),
                    Span::new(start, i),
                ));
                continue;
            }
        }

        // Single-char tokens
        let data = match c {
            '(' => {
                depth = open_bracket(depth, Span::new(start, start + 1))?;
                TokenData::BracketOpen
            }
            ')' => {
                depth = depth.saturating_sub(1);
                TokenData::BracketClose
            }
            ',' => TokenData::Separator,
            '+' => TokenData::Operator(Operator::Binary(BinaryOp::Add)),
            '-' => TokenData::Operator(Operator::Binary(BinaryOp::Sub)),
            '*' => TokenData::Operator(Operator::Binary(BinaryOp::Mul)),
            '/' => TokenData::Operator(Operator::Binary(BinaryOp::Div)),
            '^' => TokenData::Operator(Operator::Binary(BinaryOp::Pow)),
            '<' => TokenData::Operator(Operator::Binary(BinaryOp::Lt)),
            '>' => TokenData::Operator(Operator::Binary(BinaryOp::Gt)),
            _ => {
                // Report the whole (possibly multi-byte) character.
                let ch = input[start..].chars().next().unwrap_or(c);
                return Err(LexError::UnexpectedChar {
                    ch,
                    span: Span::new(start, start + ch.len_utf8()),
                });
            }
        };
        i += 1;
        out.push(Token::new(data, Span::new(start, i)));
    }

    Ok(out)
}

fn in_operand_position(prev: &[Token]) -> bool {
    match prev.last().map(Token::kind) {
        None => true,
        Some(TokenKind::Operator(_))
        | Some(TokenKind::BracketOpen)
        | Some(TokenKind::Function(_))
        | Some(TokenKind::Separator) => true,
        Some(TokenKind::Value) | Some(TokenKind::BracketClose) => false,
    }
}

fn open_bracket(depth: usize, span: Span) -> Result<usize, LexError> {
    if depth == MAX_NESTING {
        return Err(LexError::NestingTooDeep {
            limit: MAX_NESTING,
            span,
        });
    }
    Ok(depth + 1)
}

/// Return `true` when the literal ending at `end` is followed by `^`.
fn is_power_base(bytes: &[u8], end: usize) -> bool {
    let next = skip_ws(bytes, end);
    next < bytes.len() && bytes[next] == b'^'
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

fn starts_number(bytes: &[u8], i: usize) -> bool {
    i < bytes.len()
        && (bytes[i].is_ascii_digit()
            || (bytes[i] == b'.' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit()))
}

/// Lex `[0-9]+(.[0-9]+)?([eE][+-]?[0-9]+)?` or `.[0-9]+(...)` starting at `start`.
fn lex_number(input: &str, start: usize) -> Result<(f32, usize), LexError> {
    let bytes = input.as_bytes();
    let mut i = start;

    if bytes[i] == b'.' {
        i += 1;
    } else {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        // fractional part
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
        }
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }

    // exponent
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if exp_start == i {
            // Swallow the rest of the word so the diagnostic shows all of it.
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            return Err(invalid_number(input, start, i));
        }
    }

    // `2x`, `1.5.3`: a number glued to more word characters is malformed.
    if i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b'_' || bytes[i] == b'.')
    {
        let mut end = i;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'.')
        {
            end += 1;
        }
        return Err(invalid_number(input, start, end));
    }

    let v: f32 = input[start..i]
        .parse()
        .map_err(|_| invalid_number(input, start, i))?;
    if !v.is_finite() {
        return Err(invalid_number(input, start, i));
    }
    Ok((v, i))
}

fn invalid_number(input: &str, start: usize, end: usize) -> LexError {
    LexError::InvalidNumber {
        text: input[start..end].to_owned(),
        span: Span::new(start, end),
    }
}

/// `I<digits>` / `i<digits>` → image reference. `Ok(None)` when `name` is not of that shape.
fn image_ref(name: &str, span: Span) -> Result<Option<Expr>, LexError> {
    let Some(digits) = name.strip_prefix(['I', 'i']) else {
        return Ok(None);
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let index: u32 = digits.parse().map_err(|_| LexError::InvalidNumber {
        text: name.to_owned(),
        span,
    })?;
    Ok(Some(Expr::image(index)))
}

#[cfg(test)]
#[path = "../../tests/unit/formula/lexer.rs"]
mod tests;
