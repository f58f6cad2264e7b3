//! Pattern parser for `match` cases.
//!
//! Patterns: literals (including negative numbers), `_` wildcard, bare
//! identifier bindings, `{ key [: sub-pattern] }` object destructuring,
//! and `[ a, b, ...rest ]` array destructuring with at most one trailing
//! rest name.

use glyph_common::error::Error;
use glyph_common::token::TokenKind;

use crate::ast::{Literal, ObjectFieldPattern, Pattern};

use super::Parser;

/// Parse one pattern.
pub(crate) fn parse_pattern(p: &mut Parser) -> Result<Pattern, Error> {
    match p.kind() {
        // Wildcard: the lexer emits `_` as an identifier.
        TokenKind::Ident if p.current().literal == "_" => {
            p.bump();
            Ok(Pattern::Wildcard)
        }

        TokenKind::Ident => Ok(Pattern::Variable(p.bump().literal)),

        TokenKind::Integer => {
            let tok = p.bump();
            let value = parse_int(p, &tok.literal)?;
            Ok(Pattern::Literal(Literal::Int(value)))
        }
        TokenKind::Float => {
            let tok = p.bump();
            let value = parse_float(p, &tok.literal)?;
            Ok(Pattern::Literal(Literal::Float(value)))
        }
        TokenKind::String => Ok(Pattern::Literal(Literal::Str(p.bump().literal))),
        TokenKind::True => {
            p.bump();
            Ok(Pattern::Literal(Literal::Bool(true)))
        }
        TokenKind::False => {
            p.bump();
            Ok(Pattern::Literal(Literal::Bool(false)))
        }
        TokenKind::Null => {
            p.bump();
            Ok(Pattern::Literal(Literal::Null))
        }

        // Negative number literals: -42, -1.5
        TokenKind::Minus
            if matches!(p.peek_kind(1), TokenKind::Integer | TokenKind::Float) =>
        {
            p.bump(); // -
            let tok = p.bump();
            match tok.kind {
                TokenKind::Integer => {
                    let value = parse_int(p, &tok.literal)?;
                    Ok(Pattern::Literal(Literal::Int(-value)))
                }
                _ => {
                    let value = parse_float(p, &tok.literal)?;
                    Ok(Pattern::Literal(Literal::Float(-value)))
                }
            }
        }

        TokenKind::LBrace => parse_object_pattern(p),
        TokenKind::LBracket => parse_array_pattern(p),

        _ => Err(p.error_with_hint(
            format!(
                "expected a pattern, found {}",
                crate::error::describe_token(p.current())
            ),
            "patterns are literals, `_`, a binding name, `{...}`, or `[...]`",
        )),
    }
}

/// `{ key, other: pattern }`
fn parse_object_pattern(p: &mut Parser) -> Result<Pattern, Error> {
    p.bump(); // {
    p.skip_newlines();
    let mut fields = Vec::new();

    while !p.at(TokenKind::RBrace) {
        let key = p.expect_ident("as an object pattern key")?;
        let pattern = if p.eat(TokenKind::Colon) {
            Some(parse_pattern(p)?)
        } else {
            None
        };
        fields.push(ObjectFieldPattern { key, pattern });

        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the object pattern")?;
    Ok(Pattern::Object(fields))
}

/// `[ a, b, ...rest ]` -- the rest name, when present, must be last.
fn parse_array_pattern(p: &mut Parser) -> Result<Pattern, Error> {
    p.bump(); // [
    p.skip_newlines();
    let mut elements = Vec::new();
    let mut rest = None;

    while !p.at(TokenKind::RBracket) {
        if p.at(TokenKind::DotDotDot) {
            if rest.is_some() {
                return Err(p.parse_error("array pattern may contain only one `...rest`"));
            }
            p.bump(); // ...
            rest = Some(p.expect_ident("after `...` in an array pattern")?);
            p.skip_newlines();
            // Rest must be the final element.
            if !p.at(TokenKind::RBracket) && !p.at(TokenKind::Comma) {
                return Err(p.parse_error("`...rest` must be the last element of an array pattern"));
            }
            if p.eat(TokenKind::Comma) {
                p.skip_newlines();
                if !p.at(TokenKind::RBracket) {
                    return Err(
                        p.parse_error("`...rest` must be the last element of an array pattern")
                    );
                }
            }
            break;
        }

        elements.push(parse_pattern(p)?);
        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.expect(TokenKind::RBracket, "to close the array pattern")?;
    Ok(Pattern::Array { elements, rest })
}

fn parse_int(p: &Parser, text: &str) -> Result<i64, Error> {
    text.parse::<i64>()
        .map_err(|_| p.parse_error(format!("integer literal `{text}` is out of range")))
}

fn parse_float(p: &Parser, text: &str) -> Result<f64, Error> {
    text.parse::<f64>()
        .map_err(|_| p.parse_error(format!("float literal `{text}` is malformed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(source: &str) -> Pattern {
        let tokens = glyph_lexer::tokenize(source).expect("lexes");
        let mut p = Parser::new(tokens, source);
        parse_pattern(&mut p).expect("parses")
    }

    fn pat_err(source: &str) -> Error {
        let tokens = glyph_lexer::tokenize(source).expect("lexes");
        let mut p = Parser::new(tokens, source);
        parse_pattern(&mut p).unwrap_err()
    }

    #[test]
    fn literal_patterns() {
        assert_eq!(pat("200"), Pattern::Literal(Literal::Int(200)));
        assert_eq!(pat("-7"), Pattern::Literal(Literal::Int(-7)));
        assert_eq!(pat("2.5"), Pattern::Literal(Literal::Float(2.5)));
        assert_eq!(pat("\"ok\""), Pattern::Literal(Literal::Str("ok".into())));
        assert_eq!(pat("true"), Pattern::Literal(Literal::Bool(true)));
        assert_eq!(pat("null"), Pattern::Literal(Literal::Null));
    }

    #[test]
    fn wildcard_and_binding() {
        assert_eq!(pat("_"), Pattern::Wildcard);
        assert_eq!(pat("x"), Pattern::Variable("x".into()));
    }

    #[test]
    fn object_pattern_with_and_without_subpatterns() {
        assert_eq!(
            pat("{ id, status: 200 }"),
            Pattern::Object(vec![
                ObjectFieldPattern {
                    key: "id".into(),
                    pattern: None,
                },
                ObjectFieldPattern {
                    key: "status".into(),
                    pattern: Some(Pattern::Literal(Literal::Int(200))),
                },
            ])
        );
    }

    #[test]
    fn array_pattern_with_rest() {
        assert_eq!(
            pat("[first, second, ...rest]"),
            Pattern::Array {
                elements: vec![
                    Pattern::Variable("first".into()),
                    Pattern::Variable("second".into()),
                ],
                rest: Some("rest".into()),
            }
        );
    }

    #[test]
    fn rest_must_be_last() {
        let err = pat_err("[...rest, x]");
        assert!(err.message().contains("last element"));
    }

    #[test]
    fn only_one_rest_allowed() {
        // A second rest after the first is rejected as not-last.
        let err = pat_err("[...a, ...b]");
        assert!(err.message().contains("last element"));
    }
}
