//! Item parsers: the top-level dispatch and every declaration that is
//! not introduced by `@` (routes and the other directives live in
//! `routes.rs`).
//!
//! At module scope the leading token decides everything: `import`/`from`,
//! `module`, `const`, the `:`/`!`/`*`/`~`/`&` sigils, `macro`, the
//! contextual words `test`/`type`/`contract`/`trait`/`provider`, and
//! `name!(...)` macro invocations.

use glyph_common::error::Error;
use glyph_common::token::TokenKind;

use crate::ast::{
    Annotation, AnnotationArg, Command, ConstDecl, ContractDef, Endpoint, Expr, Field, Function,
    HttpMethod, ImportItem, ImportStatement, Item, Literal, MacroDef, MacroInvocation, MethodSig,
    Module, ModuleDecl, Node, ProviderDef, TestBlock, TraitDef, Type, TypeDef,
};

use super::{expressions, routes, statements, types, Parser};

/// Parse a whole module: newline-separated items until end of input.
pub(crate) fn parse_module(p: &mut Parser) -> Result<Module, Error> {
    let mut items = Vec::new();
    p.skip_newlines();
    while !p.at(TokenKind::Eof) {
        items.push(parse_item(p)?);
        p.skip_newlines();
    }
    Ok(Module { items })
}

/// Dispatch one top-level item on its leading token.
pub(crate) fn parse_item(p: &mut Parser) -> Result<Item, Error> {
    match p.kind() {
        TokenKind::Import => parse_import(p),
        TokenKind::From => parse_from_import(p),
        TokenKind::Module => parse_module_decl(p),
        TokenKind::Const => parse_const(p),
        TokenKind::Colon => {
            p.bump(); // :
            Ok(Item::TypeDef(parse_type_def_named(p)?))
        }
        TokenKind::At => routes::parse_directive(p),
        TokenKind::Bang => parse_bang_item(p),
        TokenKind::Star => routes::parse_cron_shorthand(p),
        TokenKind::Tilde => routes::parse_event_shorthand(p),
        TokenKind::Ampersand => routes::parse_queue_shorthand(p),
        TokenKind::Macro => parse_macro_def(p),

        TokenKind::Ident if p.current().literal == "test" && p.peek_kind(1) == TokenKind::String => {
            parse_test_block(p)
        }
        TokenKind::Ident if p.current().literal == "type" && p.peek_kind(1) == TokenKind::Ident => {
            p.bump(); // type
            Ok(Item::TypeDef(parse_type_def_named(p)?))
        }
        TokenKind::Ident
            if p.current().literal == "contract" && p.peek_kind(1) == TokenKind::Ident =>
        {
            parse_contract(p)
        }
        TokenKind::Ident if p.current().literal == "trait" && p.peek_kind(1) == TokenKind::Ident => {
            parse_trait(p)
        }
        TokenKind::Ident
            if p.current().literal == "provider" && p.peek_kind(1) == TokenKind::Ident =>
        {
            parse_provider(p)
        }

        TokenKind::Ident if p.peek_kind(1) == TokenKind::Bang => parse_macro_invocation(p),

        _ => Err(p.error_with_hint(
            format!(
                "unexpected token {} at module scope",
                crate::error::describe_token(p.current())
            ),
            "top-level declarations begin with `:`, `@`, `!`, `*`, `~`, `&`, `import`, \
             `from`, `const`, `module`, `macro`, `test`, `type`, `contract`, `trait`, \
             or `provider`",
        )),
    }
}

/// Whether the current token can begin an item (used by macro/quote
/// bodies to split their heterogeneous node sequence).
fn at_item_start(p: &Parser) -> bool {
    match p.kind() {
        TokenKind::Import
        | TokenKind::From
        | TokenKind::Module
        | TokenKind::Const
        | TokenKind::Colon
        | TokenKind::At
        | TokenKind::Bang
        | TokenKind::Star
        | TokenKind::Tilde
        | TokenKind::Ampersand
        | TokenKind::Macro => true,
        TokenKind::Ident => {
            let text = p.current().literal.as_str();
            (text == "test" && p.peek_kind(1) == TokenKind::String)
                || (matches!(text, "type" | "contract" | "trait" | "provider")
                    && p.peek_kind(1) == TokenKind::Ident)
                || p.peek_kind(1) == TokenKind::Bang
        }
        _ => false,
    }
}

/// One node of a macro or `quote` body: an item when the leading token
/// can start one, otherwise a statement.
pub(crate) fn parse_node(p: &mut Parser) -> Result<Node, Error> {
    if at_item_start(p) {
        Ok(Node::Item(parse_item(p)?))
    } else {
        Ok(Node::Statement(statements::parse_statement(p)?))
    }
}

// ── Imports, module declaration, const ───────────────────────────────────

/// `import "path" [as alias]`
fn parse_import(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // import
    let path = p.expect_string("after `import`")?;
    let alias = if p.eat(TokenKind::As) {
        Some(p.expect_ident("after `as`")?)
    } else {
        None
    };
    Ok(Item::Import(ImportStatement {
        path,
        alias,
        selective: false,
        items: Vec::new(),
    }))
}

/// `from "path" import name [as alias], ...`
fn parse_from_import(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // from
    let path = p.expect_string("after `from`")?;
    p.expect(TokenKind::Import, "after the module path")?;

    let mut items = Vec::new();
    loop {
        let name = p.expect_ident("in the import list")?;
        let alias = if p.eat(TokenKind::As) {
            Some(p.expect_ident("after `as`")?)
        } else {
            None
        };
        items.push(ImportItem { name, alias });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    Ok(Item::Import(ImportStatement {
        path,
        alias: None,
        selective: true,
        items,
    }))
}

/// `module dotted.name`
fn parse_module_decl(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // module
    let name = parse_dotted_name(p, "after `module`")?;
    Ok(Item::ModuleDecl(ModuleDecl { name }))
}

/// `const NAME [: type] = value`
fn parse_const(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // const
    let name = p.expect_ident("after `const`")?;
    let ty = if p.eat(TokenKind::Colon) {
        Some(types::parse_type(p)?.0)
    } else {
        None
    };
    p.expect(TokenKind::Equals, "in the const declaration")?;
    let value = expressions::parse_expression(p)?;
    Ok(Item::Const(ConstDecl { name, ty, value }))
}

/// `ident.ident.ident`
pub(crate) fn parse_dotted_name(p: &mut Parser, context: &str) -> Result<String, Error> {
    let mut name = p.expect_ident(context)?;
    while p.at(TokenKind::Dot) && p.peek_kind(1) == TokenKind::Ident {
        p.bump(); // .
        name.push('.');
        name.push_str(&p.bump().literal);
    }
    Ok(name)
}

// ── Type definitions ─────────────────────────────────────────────────────

/// The body of a type definition, after the `:` sigil or `type` word:
/// `Name[<T, ...>] [: Trait, ...] { fields and `!` methods }`.
pub(crate) fn parse_type_def_named(p: &mut Parser) -> Result<TypeDef, Error> {
    let name = p.expect_ident("as the type name")?;

    p.push_scope();
    let type_params = if p.at(TokenKind::Less) {
        types::parse_type_params(p)?
    } else {
        Vec::new()
    };

    let mut traits = Vec::new();
    if p.eat(TokenKind::Colon) {
        loop {
            traits.push(parse_dotted_name(p, "as a trait name")?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    p.expect(TokenKind::LBrace, "to open the type body")?;
    p.skip_newlines();

    let mut fields = Vec::new();
    let mut methods = Vec::new();
    while !p.at(TokenKind::RBrace) {
        if p.at(TokenKind::Bang) {
            p.bump(); // !
            let method_name = p.expect_ident("after `!`")?;
            let generic = p.at(TokenKind::Less);
            methods.push(parse_function(p, method_name, generic)?);
        } else {
            fields.push(parse_field(p)?);
        }
        p.skip_newlines();
        p.eat(TokenKind::Comma);
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the type body")?;
    p.pop_scope();

    Ok(TypeDef {
        name,
        type_params,
        traits,
        fields,
        methods,
    })
}

// ── Trait, provider, contract, test ──────────────────────────────────────

/// `trait Name[<T, ...>] { method signatures }`
fn parse_trait(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // trait
    let name = p.expect_ident("as the trait name")?;

    p.push_scope();
    let type_params = if p.at(TokenKind::Less) {
        types::parse_type_params(p)?
    } else {
        Vec::new()
    };
    let methods = parse_method_sig_block(p, "trait")?;
    p.pop_scope();

    Ok(Item::TraitDef(TraitDef {
        name,
        type_params,
        methods,
    }))
}

/// `provider Name[<T, ...>] { method signatures }`
fn parse_provider(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // provider
    let name = p.expect_ident("as the provider name")?;

    p.push_scope();
    let type_params = if p.at(TokenKind::Less) {
        types::parse_type_params(p)?
    } else {
        Vec::new()
    };
    let methods = parse_method_sig_block(p, "provider")?;
    p.pop_scope();

    Ok(Item::ProviderDef(ProviderDef {
        name,
        type_params,
        methods,
    }))
}

/// `{ name(params) [-> Type] ... }`
fn parse_method_sig_block(p: &mut Parser, owner: &str) -> Result<Vec<MethodSig>, Error> {
    p.expect(TokenKind::LBrace, &format!("to open the {owner} body"))?;
    p.skip_newlines();

    let mut methods = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let name = p.expect_ident("as a method name")?;
        let params = parse_param_list(p)?;
        let return_type = if p.eat(TokenKind::Arrow) {
            Some(types::parse_type(p)?.0)
        } else {
            None
        };
        methods.push(MethodSig {
            name,
            params,
            return_type,
        });
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, &format!("to close the {owner} body"))?;
    Ok(methods)
}

/// `contract Name { METHOD /path -> Type ... }`
fn parse_contract(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // contract
    let name = p.expect_ident("as the contract name")?;
    p.expect(TokenKind::LBrace, "to open the contract body")?;
    p.skip_newlines();

    let mut endpoints = Vec::new();
    while !p.at(TokenKind::RBrace) {
        let method_name = p.expect_ident("as the endpoint method")?;
        let Some(method) = HttpMethod::from_name(&method_name) else {
            return Err(p.error_with_hint(
                format!("unknown HTTP method `{method_name}`"),
                "contract endpoints use GET, POST, PUT, PATCH, DELETE, or SSE",
            ));
        };
        let path = routes::parse_route_path(p)?;
        p.expect(TokenKind::Arrow, "after the endpoint path")?;
        let (return_type, _) = types::parse_type(p)?;
        endpoints.push(Endpoint {
            method,
            path,
            return_type,
        });
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the contract body")?;
    Ok(Item::ContractDef(ContractDef { name, endpoints }))
}

/// `test "name" { statements }`
fn parse_test_block(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // test
    let name = p.expect_string("as the test name")?;
    let body = statements::parse_brace_block(p)?;
    Ok(Item::TestBlock(TestBlock { name, body }))
}

// ── Functions and CLI commands ───────────────────────────────────────────

/// After `!`: `<` means a generic function, `(` a regular function, and
/// anything else a CLI command.
fn parse_bang_item(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // !
    let name = p.expect_ident("after `!`")?;
    match p.kind() {
        TokenKind::Less => Ok(Item::Function(parse_function(p, name, true)?)),
        TokenKind::LParen => Ok(Item::Function(parse_function(p, name, false)?)),
        _ => Ok(Item::Command(parse_command(p, name)?)),
    }
}

/// The shared function tail: `[<T, ...>](params) [-> Type] { body }`.
///
/// Also used for methods inside type definitions and for directives that
/// delegate to it.
pub(crate) fn parse_function(p: &mut Parser, name: String, generic: bool) -> Result<Function, Error> {
    p.push_scope();
    let type_params = if generic {
        types::parse_type_params(p)?
    } else {
        Vec::new()
    };

    let params = parse_param_list(p)?;
    validate_param_order(p, &params)?;

    let return_type = if p.eat(TokenKind::Arrow) {
        Some(types::parse_type(p)?.0)
    } else {
        None
    };

    let body = statements::parse_brace_block(p)?;
    p.pop_scope();

    Ok(Function {
        name,
        type_params,
        params,
        return_type,
        body,
    })
}

/// `( field, ... )`
pub(crate) fn parse_param_list(p: &mut Parser) -> Result<Vec<Field>, Error> {
    p.expect(TokenKind::LParen, "to open the parameter list")?;
    p.skip_newlines();

    let mut params = Vec::new();
    while !p.at(TokenKind::RParen) {
        params.push(parse_field(p)?);
        p.skip_newlines();
        if !p.eat(TokenKind::Comma) {
            break;
        }
        p.skip_newlines();
    }

    p.expect(TokenKind::RParen, "to close the parameter list")?;
    Ok(params)
}

/// Required parameters must precede optional ones; the error names the
/// offending parameter. Checked before the body is parsed.
pub(crate) fn validate_param_order(p: &Parser, params: &[Field]) -> Result<(), Error> {
    let mut optional_seen = false;
    for param in params {
        if param.required && optional_seen {
            return Err(p.parse_error(format!(
                "required parameter `{}` cannot follow an optional parameter",
                param.name
            )));
        }
        if !param.required {
            optional_seen = true;
        }
    }
    Ok(())
}

/// A CLI command after its name: positionals, `--flags`, an optional
/// description string, an optional return type, and the body.
pub(crate) fn parse_command(p: &mut Parser, name: String) -> Result<Command, Error> {
    let mut positionals = Vec::new();
    let mut flags = Vec::new();
    let mut description = None;
    let mut return_type = None;

    loop {
        match p.kind() {
            TokenKind::Ident => positionals.push(parse_field(p)?),
            TokenKind::Minus => flags.push(parse_flag(p)?),
            TokenKind::String => description = Some(p.bump().literal),
            TokenKind::Arrow => {
                p.bump();
                return_type = Some(types::parse_type(p)?.0);
            }
            TokenKind::LBrace => break,
            _ => return Err(p.unexpected_token("in the command declaration")),
        }
    }

    let body = statements::parse_brace_block(p)?;
    Ok(Command {
        name,
        positionals,
        flags,
        description,
        return_type,
        body,
    })
}

/// `--name: type [= default]` -- flag defaults use the restricted
/// expression grammar so the next `-`-introduced flag is not consumed as
/// a subtraction.
fn parse_flag(p: &mut Parser) -> Result<Field, Error> {
    p.bump(); // -
    p.eat(TokenKind::Minus); // second - of `--`
    let name = p.expect_ident("as the flag name")?;
    p.expect(TokenKind::Colon, "after the flag name")?;
    let (ty, required) = types::parse_type(p)?;

    let default = if p.eat(TokenKind::Equals) {
        Some(expressions::parse_flag_default(p)?)
    } else {
        None
    };
    if let Some(default) = &default {
        check_default_literal(p, &name, &ty, default)?;
    }

    Ok(Field {
        name,
        ty,
        required,
        default,
        annotations: Vec::new(),
    })
}

// ── Fields ───────────────────────────────────────────────────────────────

/// `name : type [@annotation...] [= default]`
pub(crate) fn parse_field(p: &mut Parser) -> Result<Field, Error> {
    let name = p.expect_ident("as the field name")?;
    p.expect(TokenKind::Colon, "after the field name")?;
    let (ty, required) = types::parse_type(p)?;

    let mut annotations = Vec::new();
    while p.at(TokenKind::At) {
        annotations.push(parse_annotation(p)?);
    }

    let default = if p.eat(TokenKind::Equals) {
        Some(expressions::parse_expression(p)?)
    } else {
        None
    };
    if let Some(default) = &default {
        check_default_literal(p, &name, &ty, default)?;
    }

    Ok(Field {
        name,
        ty,
        required,
        default,
        annotations,
    })
}

/// `@name` or `@name(args)`; arguments are ints, floats, strings, or
/// string arrays, stored opaquely.
fn parse_annotation(p: &mut Parser) -> Result<Annotation, Error> {
    p.bump(); // @
    let name = p.expect_ident("as the annotation name")?;

    let mut args = Vec::new();
    if p.eat(TokenKind::LParen) {
        while !p.at(TokenKind::RParen) {
            args.push(parse_annotation_arg(p)?);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen, "to close the annotation arguments")?;
    }

    Ok(Annotation { name, args })
}

fn parse_annotation_arg(p: &mut Parser) -> Result<AnnotationArg, Error> {
    match p.kind() {
        TokenKind::Integer => {
            let tok = p.bump();
            let value = tok
                .literal
                .parse::<i64>()
                .map_err(|_| p.parse_error(format!("integer literal `{}` is out of range", tok.literal)))?;
            Ok(AnnotationArg::Int(value))
        }
        TokenKind::Float => {
            let tok = p.bump();
            let value = tok
                .literal
                .parse::<f64>()
                .map_err(|_| p.parse_error(format!("float literal `{}` is malformed", tok.literal)))?;
            Ok(AnnotationArg::Float(value))
        }
        TokenKind::String => Ok(AnnotationArg::Str(p.bump().literal)),
        TokenKind::LBracket => {
            p.bump(); // [
            let mut values = Vec::new();
            while !p.at(TokenKind::RBracket) {
                values.push(p.expect_string("in the annotation string array")?);
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.expect(TokenKind::RBracket, "to close the annotation string array")?;
            Ok(AnnotationArg::StrList(values))
        }
        _ => Err(p.error_with_hint(
            "annotation arguments must be numbers, strings, or string arrays",
            "e.g. `@min(3)`, `@pattern(\"^a\")`, `@oneof([\"a\", \"b\"])`",
        )),
    }
}

/// The shallow default-value check: a bare literal must match the
/// declared type after peeling one `Optional`. `null` needs an optional
/// type; `any`/`object`/`timestamp` accept any literal; everything
/// non-literal or non-primitive is deferred to the semantic stage.
pub(crate) fn check_default_literal(
    p: &Parser,
    name: &str,
    ty: &Type,
    default: &Expr,
) -> Result<(), Error> {
    let Some(lit) = default.as_literal() else {
        return Ok(());
    };

    let base = ty.unwrap_optional();
    let ok = match (lit, base) {
        (_, Type::Named(n)) if n == "any" || n == "object" || n == "timestamp" => true,
        (Literal::Null, _) => ty.is_optional(),
        (Literal::Int(_), Type::Int) => true,
        (Literal::Str(_), Type::String) => true,
        (Literal::Bool(_), Type::Bool) => true,
        (Literal::Float(_), Type::Float) => true,
        (_, Type::Int | Type::String | Type::Bool | Type::Float) => false,
        _ => true,
    };

    if ok {
        Ok(())
    } else {
        Err(p.parse_error(format!(
            "default value for `{name}` does not match its declared type"
        )))
    }
}

// ── Macros ───────────────────────────────────────────────────────────────

/// `macro! name(params) { heterogeneous body }`
fn parse_macro_def(p: &mut Parser) -> Result<Item, Error> {
    p.bump(); // macro
    p.expect(TokenKind::Bang, "after `macro`")?;
    let name = p.expect_ident("as the macro name")?;

    p.expect(TokenKind::LParen, "to open the macro parameters")?;
    let mut params = Vec::new();
    while !p.at(TokenKind::RParen) {
        params.push(p.expect_ident("as a macro parameter")?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen, "to close the macro parameters")?;

    p.expect(TokenKind::LBrace, "to open the macro body")?;
    p.skip_newlines();
    let mut body = Vec::new();
    while !p.at(TokenKind::RBrace) {
        body.push(parse_node(p)?);
        p.skip_newlines();
    }
    p.expect(TokenKind::RBrace, "to close the macro body")?;

    Ok(Item::MacroDef(MacroDef { name, params, body }))
}

/// Top-level `name!(args)`.
fn parse_macro_invocation(p: &mut Parser) -> Result<Item, Error> {
    let name = p.bump().literal;
    p.bump(); // !
    let args = expressions::parse_call_args(p)?;
    Ok(Item::MacroInvocation(MacroInvocation { name, args }))
}
