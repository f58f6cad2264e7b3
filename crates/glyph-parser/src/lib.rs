//! Glyph parser: recursive descent over the token stream from
//! `glyph-lexer`, producing an owned AST.
//!
//! The three entry points parse a whole module, a single expression, or
//! a single statement (the expression/statement forms serve REPL-like
//! callers). Parsing either succeeds with a complete value or fails
//! with one structured [`Error`]; no partial AST is surfaced.

pub mod ast;
mod error;
mod parser;

use glyph_common::token::TokenKind;
use serde::Serialize;

pub use ast::{Expr, Item, Module, Statement};
pub use glyph_common::error::{Error, LexError, ParseError};

use parser::Parser;

/// A non-fatal diagnostic collected during parsing, e.g. a `match`
/// without a wildcard case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Parse a whole source module.
pub fn parse_module(source: &str) -> Result<Module, Error> {
    let (module, _) = parse_module_with_warnings(source)?;
    Ok(module)
}

/// Parse a whole source module and surface the collected warnings.
pub fn parse_module_with_warnings(source: &str) -> Result<(Module, Vec<Warning>), Error> {
    let tokens = glyph_lexer::tokenize(source)?;
    let mut p = Parser::new(tokens, source);
    let module = parser::items::parse_module(&mut p)?;
    let warnings = p.take_warnings();
    Ok((module, warnings))
}

/// Parse a single expression.
///
/// Leading and trailing newlines are skipped; empty input and trailing
/// tokens are errors.
pub fn parse_expression(source: &str) -> Result<Expr, Error> {
    let tokens = glyph_lexer::tokenize(source)?;
    let mut p = Parser::new(tokens, source);

    p.skip_newlines();
    if p.at(TokenKind::Eof) {
        return Err(p.expression_error("expected an expression, found empty input"));
    }

    let expr = parser::expressions::parse_expression(&mut p)?;
    expect_end(&mut p, "after the expression")?;
    Ok(expr)
}

/// Parse a single statement.
///
/// Same envelope as [`parse_expression`]: newlines around the statement
/// are skipped, empty input and trailing tokens are errors.
pub fn parse_statement(source: &str) -> Result<Statement, Error> {
    let tokens = glyph_lexer::tokenize(source)?;
    let mut p = Parser::new(tokens, source);

    p.skip_newlines();
    if p.at(TokenKind::Eof) {
        return Err(p.parse_error("expected a statement, found empty input"));
    }

    let statement = parser::statements::parse_statement(&mut p)?;
    expect_end(&mut p, "after the statement")?;
    Ok(statement)
}

fn expect_end(p: &mut Parser, context: &str) -> Result<(), Error> {
    p.skip_newlines();
    if p.at(TokenKind::Eof) {
        Ok(())
    } else {
        Err(p.unexpected_token(context))
    }
}
