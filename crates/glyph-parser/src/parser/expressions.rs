//! Expression parser for Glyph.
//!
//! The driver folds `|>` left-associatively above a Pratt precedence
//! climb for the binary operators; unary `!`/`-` bind tighter than any
//! binary operator, and the postfix chain (field access, indexing,
//! calls) binds tightest of all.
//!
//! Method calls are lowered at parse time: `obj.method(args)` with a
//! bare-variable receiver becomes `FunctionCall("obj.method", args)`;
//! any other receiver becomes `FunctionCall("method", [receiver, args])`.
//! Downstream stages rely on the dotted-name form for namespaced
//! built-ins like `ws.send`.

use glyph_common::error::Error;
use glyph_common::token::TokenKind;

use crate::ast::{BinaryOp, Expr, Literal, MatchCase, ObjectField, UnaryOp};

use super::{items, patterns, statements, Parser};

/// Parse a full expression, `|>` pipes included.
pub(crate) fn parse_expression(p: &mut Parser) -> Result<Expr, Error> {
    let mut left = parse_binary(p, 0)?;
    while p.eat(TokenKind::PipeOp) {
        let right = parse_binary(p, 0)?;
        left = Expr::Pipe {
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

/// Parse an expression for a CLI flag default value.
///
/// Identical to the normal grammar except that a `-` whose next token is
/// another `-` or an identifier is taken as the start of the next flag,
/// not as subtraction. This is the only place where lookahead changes
/// operator precedence.
pub(crate) fn parse_flag_default(p: &mut Parser) -> Result<Expr, Error> {
    parse_binary_inner(p, 0, true)
}

/// Binding powers for the infix operators. Higher binds tighter.
fn precedence(kind: TokenKind) -> Option<(u8, BinaryOp)> {
    match kind {
        TokenKind::Or => Some((2, BinaryOp::Or)),
        TokenKind::And => Some((3, BinaryOp::And)),
        TokenKind::EqEq => Some((5, BinaryOp::Eq)),
        TokenKind::NotEq => Some((5, BinaryOp::NotEq)),
        TokenKind::Less => Some((5, BinaryOp::Lt)),
        TokenKind::LessEq => Some((5, BinaryOp::LtEq)),
        TokenKind::Greater => Some((5, BinaryOp::Gt)),
        TokenKind::GreaterEq => Some((5, BinaryOp::GtEq)),
        TokenKind::Plus => Some((10, BinaryOp::Add)),
        TokenKind::Minus => Some((10, BinaryOp::Sub)),
        TokenKind::Star => Some((20, BinaryOp::Mul)),
        TokenKind::Slash => Some((20, BinaryOp::Div)),
        _ => None,
    }
}

/// Precedence climb: consume operators while their binding power is at
/// least `min_prec`; recurse with one more for left associativity.
fn parse_binary(p: &mut Parser, min_prec: u8) -> Result<Expr, Error> {
    parse_binary_inner(p, min_prec, false)
}

fn parse_binary_inner(p: &mut Parser, min_prec: u8, flag_default: bool) -> Result<Expr, Error> {
    let mut left = parse_unary(p)?;

    loop {
        let Some((prec, op)) = precedence(p.kind()) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        // Inside a flag default, `-` followed by `-` or an identifier
        // starts the next flag instead of a subtraction.
        if flag_default
            && p.at(TokenKind::Minus)
            && matches!(p.peek_kind(1), TokenKind::Minus | TokenKind::Ident)
        {
            break;
        }

        p.bump(); // operator
        let right = parse_binary_inner(p, prec + 1, flag_default)?;
        left = Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }

    Ok(left)
}

/// Unary `!` and `-`, right-associative, tighter than any binary.
fn parse_unary(p: &mut Parser) -> Result<Expr, Error> {
    match p.kind() {
        TokenKind::Bang => {
            p.bump();
            let operand = parse_unary(p)?;
            Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            })
        }
        TokenKind::Minus => {
            p.bump();
            let operand = parse_unary(p)?;
            Ok(Expr::UnaryOp {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            })
        }
        _ => parse_postfix(p),
    }
}

/// A primary expression followed by its postfix chain: `.field`,
/// `[index]`, and call arguments.
fn parse_postfix(p: &mut Parser) -> Result<Expr, Error> {
    let mut expr = parse_primary(p)?;

    loop {
        match p.kind() {
            TokenKind::Dot => {
                p.bump();
                let field = parse_member_name(p)?;
                if p.at(TokenKind::LParen) {
                    let args = parse_call_args(p)?;
                    expr = lower_method_call(expr, field, args);
                } else {
                    expr = Expr::FieldAccess {
                        object: Box::new(expr),
                        field,
                    };
                }
            }
            TokenKind::LBracket => {
                p.bump();
                let index = parse_expression(p)?;
                p.expect(TokenKind::RBracket, "to close the index expression")?;
                expr = Expr::ArrayIndex {
                    array: Box::new(expr),
                    index: Box::new(index),
                };
            }
            TokenKind::LParen => match expr {
                Expr::Variable(name) => {
                    let args = parse_call_args(p)?;
                    expr = Expr::FunctionCall { name, args };
                }
                other => {
                    expr = other;
                    break;
                }
            },
            _ => break,
        }
    }

    Ok(expr)
}

/// The name after a `.`: an identifier, or any keyword acting as a plain
/// member name (`result.default`, `job.async`).
fn parse_member_name(p: &mut Parser) -> Result<String, Error> {
    if p.at(TokenKind::Ident) || p.kind().is_keyword() {
        Ok(p.bump().literal)
    } else {
        Err(crate::error::build_missing_token_error(
            p.current(),
            "a field name",
            "after `.`",
            p.source(),
        ))
    }
}

/// The method-call lowering rule. Bare-variable receivers fold into a
/// dotted call name; anything else passes the receiver as the first
/// argument.
fn lower_method_call(receiver: Expr, method: String, mut args: Vec<Expr>) -> Expr {
    match receiver {
        Expr::Variable(obj) => Expr::FunctionCall {
            name: format!("{obj}.{method}"),
            args,
        },
        other => {
            args.insert(0, other);
            Expr::FunctionCall { name: method, args }
        }
    }
}

/// `( expr, ... )` -- newlines are allowed around arguments.
pub(crate) fn parse_call_args(p: &mut Parser) -> Result<Vec<Expr>, Error> {
    p.expect(TokenKind::LParen, "to open the argument list")?;
    p.skip_newlines();
    let mut args = Vec::new();

    while !p.at(TokenKind::RParen) {
        args.push(parse_expression(p)?);
        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.expect(TokenKind::RParen, "to close the argument list")?;
    Ok(args)
}

/// Literals, groups, identifiers, object/array literals, `match`,
/// `async`, `await`, and `quote`.
fn parse_primary(p: &mut Parser) -> Result<Expr, Error> {
    match p.kind() {
        TokenKind::Integer => {
            let tok = p.bump();
            let value = tok
                .literal
                .parse::<i64>()
                .map_err(|_| p.parse_error(format!("integer literal `{}` is out of range", tok.literal)))?;
            Ok(Expr::Literal(Literal::Int(value)))
        }
        TokenKind::Float => {
            let tok = p.bump();
            let value = tok
                .literal
                .parse::<f64>()
                .map_err(|_| p.parse_error(format!("float literal `{}` is malformed", tok.literal)))?;
            Ok(Expr::Literal(Literal::Float(value)))
        }
        TokenKind::String => Ok(Expr::Literal(Literal::Str(p.bump().literal))),
        TokenKind::True => {
            p.bump();
            Ok(Expr::Literal(Literal::Bool(true)))
        }
        TokenKind::False => {
            p.bump();
            Ok(Expr::Literal(Literal::Bool(false)))
        }
        TokenKind::Null => {
            p.bump();
            Ok(Expr::Literal(Literal::Null))
        }

        TokenKind::LParen => {
            p.bump();
            p.skip_newlines();
            let expr = parse_expression(p)?;
            p.skip_newlines();
            p.expect(TokenKind::RParen, "to close the grouped expression")?;
            Ok(expr)
        }

        TokenKind::LBrace => parse_object_literal(p),
        TokenKind::LBracket => parse_array_literal(p),

        TokenKind::Ident => Ok(Expr::Variable(p.bump().literal)),

        TokenKind::Match => parse_match(p),

        TokenKind::Async => {
            p.bump();
            let body = statements::parse_brace_block(p)?;
            Ok(Expr::Async(body))
        }

        TokenKind::Await => {
            p.bump();
            let inner = parse_unary(p)?;
            Ok(Expr::Await(Box::new(inner)))
        }

        TokenKind::Quote => {
            p.bump();
            p.expect(TokenKind::LBrace, "after `quote`")?;
            let mut body = Vec::new();
            p.skip_newlines();
            while !p.at(TokenKind::RBrace) {
                body.push(items::parse_node(p)?);
                p.skip_newlines();
            }
            p.expect(TokenKind::RBrace, "to close the `quote` body")?;
            Ok(Expr::Quote(body))
        }

        _ => Err(p.expression_error(format!(
            "expected an expression, found {}",
            crate::error::describe_token(p.current())
        ))),
    }
}

/// `{ key: value, ... }` or `{ :key = value, ... }`; both entry forms
/// may be mixed. Keys are identifiers, keywords-as-names, or strings.
fn parse_object_literal(p: &mut Parser) -> Result<Expr, Error> {
    p.bump(); // {
    p.skip_newlines();
    let mut fields = Vec::new();

    while !p.at(TokenKind::RBrace) {
        let field = if p.eat(TokenKind::Colon) {
            // :key = value
            let key = p.expect_ident("after `:` in an object literal")?;
            p.expect(TokenKind::Equals, "after the object key")?;
            let value = parse_expression(p)?;
            ObjectField { key, value }
        } else {
            let key = parse_object_key(p)?;
            p.expect(TokenKind::Colon, "after the object key")?;
            let value = parse_expression(p)?;
            ObjectField { key, value }
        };
        fields.push(field);

        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.skip_newlines();
    p.expect(TokenKind::RBrace, "to close the object literal")?;
    Ok(Expr::Object(fields))
}

fn parse_object_key(p: &mut Parser) -> Result<String, Error> {
    if p.at(TokenKind::Ident) || p.at(TokenKind::String) || p.kind().is_keyword() {
        Ok(p.bump().literal)
    } else {
        Err(crate::error::build_unexpected_token_error(
            p.current(),
            "in an object literal",
            p.source(),
        ))
    }
}

/// `[ a, b, c ]`
fn parse_array_literal(p: &mut Parser) -> Result<Expr, Error> {
    p.bump(); // [
    p.skip_newlines();
    let mut elements = Vec::new();

    while !p.at(TokenKind::RBracket) {
        elements.push(parse_expression(p)?);
        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.skip_newlines();
    p.expect(TokenKind::RBracket, "to close the array literal")?;
    Ok(Expr::Array(elements))
}

/// `match value { pattern [when guard] => body ... }`
///
/// Cases run until the closing brace; separators are optional newlines.
/// A case list with no unguarded wildcard or binding raises a warning,
/// never an error.
fn parse_match(p: &mut Parser) -> Result<Expr, Error> {
    let match_tok = p.current().clone();
    p.bump(); // match
    let value = parse_expression(p)?;

    p.expect(TokenKind::LBrace, "after the match value")?;
    p.skip_newlines();

    let mut cases = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let pattern = patterns::parse_pattern(p)?;
        let guard = if p.eat(TokenKind::When) {
            Some(parse_expression(p)?)
        } else {
            None
        };
        p.expect(TokenKind::FatArrow, "after the match pattern")?;
        let body = parse_expression(p)?;
        cases.push(MatchCase {
            pattern,
            guard,
            body,
        });

        p.skip_newlines();
        p.eat(TokenKind::Comma);
        p.skip_newlines();
    }
    p.expect(TokenKind::RBrace, "to close the match expression")?;

    if cases.is_empty() {
        return Err(p.error_at_position(
            "match expression has no cases",
            match_tok.line,
            match_tok.column,
        ));
    }

    let exhaustive = cases
        .iter()
        .any(|c| c.pattern.is_irrefutable() && c.guard.is_none());
    if !exhaustive {
        p.warn("match without a `_` case may not be exhaustive");
    }

    Ok(Expr::Match {
        value: Box::new(value),
        cases,
    })
}
