//! Type grammar for Glyph.
//!
//! One consolidated grammar function parses a single type and its
//! postfixes and reports the trailing `!` required marker as a sidecar
//! flag; union accumulation happens only in the top-level wrapper so
//! unions stay flat.

use glyph_common::error::Error;
use glyph_common::token::TokenKind;

use crate::ast::{Type, TypeParam};

use super::Parser;

/// Parse a type, allowing `|` unions at this level.
///
/// Returns the type and whether a trailing `!` marked it required. The
/// `!` after the final union member applies to the whole union.
pub(crate) fn parse_type(p: &mut Parser) -> Result<(Type, bool), Error> {
    let (first, mut required) = parse_single_type(p)?;

    if !p.at(TokenKind::Pipe) {
        return Ok((first, required));
    }

    let mut members = vec![first];
    while p.eat(TokenKind::Pipe) {
        let (next, next_required) = parse_single_type(p)?;
        members.push(next);
        required = next_required;
    }
    Ok((Type::Union(members), required))
}

/// Parse one type without union accumulation.
///
/// Grammar, in reading order:
/// 1. `(` opens a function type: `(A, B) -> C`.
/// 2. `[` opens an array type: `[T]`.
/// 3. Otherwise a (possibly dotted) name, resolved against the
///    type-parameter scope and the primitive aliases.
/// 4. Postfixes: `<...>` generic args, `[...]` generic args (or empty
///    `[]` meaning array), `?` optional, trailing `!` required.
pub(crate) fn parse_single_type(p: &mut Parser) -> Result<(Type, bool), Error> {
    let mut ty = match p.kind() {
        TokenKind::LParen => parse_function_type(p)?,
        TokenKind::LBracket => {
            p.bump(); // [
            let (inner, _) = parse_type(p)?;
            p.expect(TokenKind::RBracket, "to close the array type")?;
            Type::Array(Box::new(inner))
        }
        TokenKind::Ident => {
            let mut name = p.bump().literal;
            while p.at(TokenKind::Dot) && p.peek_kind(1) == TokenKind::Ident {
                p.bump(); // .
                name.push('.');
                name.push_str(&p.bump().literal);
            }
            if p.is_type_param(&name) {
                Type::TypeParameter(name)
            } else if let Some(prim) = Type::from_primitive_name(&name) {
                prim
            } else {
                Type::Named(name)
            }
        }
        _ => {
            return Err(p.type_error(format!(
                "expected a type, found {}",
                crate::error::describe_token(p.current())
            )))
        }
    };

    // Generic arguments, angle form: List<int, str>
    if p.at(TokenKind::Less) {
        p.bump();
        let args = parse_generic_args(p, TokenKind::Greater)?;
        p.expect(TokenKind::Greater, "to close the generic arguments")?;
        ty = Type::Generic {
            base: Box::new(ty),
            args,
        };
    }

    // Square form: List[int], or empty [] meaning array-of.
    if p.at(TokenKind::LBracket) {
        p.bump();
        if p.eat(TokenKind::RBracket) {
            ty = Type::Array(Box::new(ty));
        } else {
            let args = parse_generic_args(p, TokenKind::RBracket)?;
            p.expect(TokenKind::RBracket, "to close the generic arguments")?;
            ty = Type::Generic {
                base: Box::new(ty),
                args,
            };
        }
    }

    if p.eat(TokenKind::Question) {
        ty = Type::Optional(Box::new(ty));
    }

    let required = p.eat(TokenKind::Bang);
    Ok((ty, required))
}

/// `(A, B) -> C` -- comma-separated parameter types, then the arrow and
/// a return type.
fn parse_function_type(p: &mut Parser) -> Result<Type, Error> {
    p.bump(); // (
    let mut params = Vec::new();
    if !p.at(TokenKind::RParen) {
        loop {
            let (param, _) = parse_single_type(p)?;
            params.push(param);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen, "to close the function type parameters")?;
    p.expect(TokenKind::Arrow, "after the function type parameters")?;
    let (ret, _) = parse_single_type(p)?;
    Ok(Type::Function {
        params,
        ret: Box::new(ret),
    })
}

/// Comma-separated type arguments up to (not consuming) `closing`.
fn parse_generic_args(p: &mut Parser, closing: TokenKind) -> Result<Vec<Type>, Error> {
    let mut args = Vec::new();
    loop {
        let (arg, _) = parse_type(p)?;
        args.push(arg);
        if !p.eat(TokenKind::Comma) {
            break;
        }
        if p.at(closing) {
            break; // trailing comma
        }
    }
    Ok(args)
}

/// Parse a `<T, U: Constraint>` type-parameter list.
///
/// Each parameter is declared in the innermost scope as soon as it is
/// read, so later constraints resolve earlier parameters:
/// `<T, U: Compare<T>>` sees `T` as a type parameter. The caller is
/// responsible for pushing and popping the scope around the generic
/// item.
pub(crate) fn parse_type_params(p: &mut Parser) -> Result<Vec<TypeParam>, Error> {
    p.expect(TokenKind::Less, "to open the type parameters")?;
    let mut params = Vec::new();
    loop {
        let name = p.expect_ident("as a type parameter name")?;
        p.declare_type_param(&name);

        let constraint = if p.eat(TokenKind::Colon) || eat_extends(p) {
            let (c, _) = parse_single_type(p)?;
            Some(c)
        } else {
            None
        };
        params.push(TypeParam { name, constraint });

        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::Greater, "to close the type parameters")?;
    Ok(params)
}

/// The `extends` constraint spelling is a contextual identifier, not a
/// keyword.
fn eat_extends(p: &mut Parser) -> bool {
    if p.at_ident("extends") {
        p.bump();
        true
    } else {
        false
    }
}
