//! Parse-error factories.
//!
//! Every parse site goes through one of these helpers so messages stay
//! standardised: `expected X after Y, found Z` for missing tokens,
//! `unexpected token Z in Y` for surprising ones, and topic-specific
//! hints for expression, type, and route errors.

use glyph_common::error::{Error, ParseError};
use glyph_common::token::{Token, TokenKind};

use crate::parser::Parser;

/// Render a token for an error message: literals show their text,
/// categories their name, punctuation its operator form.
pub(crate) fn describe_token(tok: &Token) -> String {
    match tok.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Ident => format!("`{}`", tok.literal),
        TokenKind::String => format!("string \"{}\"", tok.literal),
        TokenKind::Integer | TokenKind::Float => format!("`{}`", tok.literal),
        kind if kind.is_keyword() => format!("`{}`", tok.literal),
        kind => format!("`{kind}`"),
    }
}

/// `expected <expected> <context>, found <token>` -- the standard shape
/// for a missing token.
pub(crate) fn build_missing_token_error(
    tok: &Token,
    expected: &str,
    context: &str,
    source: &str,
) -> Error {
    ParseError::new(
        format!(
            "expected {expected} {context}, found {}",
            describe_token(tok)
        ),
        tok.line,
        tok.column,
        source,
    )
    .into()
}

/// `unexpected token <token> <context>` -- the standard shape for a
/// token that has no meaning where it appeared.
pub(crate) fn build_unexpected_token_error(tok: &Token, context: &str, source: &str) -> Error {
    ParseError::new(
        format!("unexpected token {} {context}", describe_token(tok)),
        tok.line,
        tok.column,
        source,
    )
    .into()
}

impl<'src> Parser<'src> {
    /// A plain parse error at the current token.
    pub(crate) fn parse_error(&self, message: impl Into<String>) -> Error {
        let tok = self.current();
        ParseError::new(message, tok.line, tok.column, self.source()).into()
    }

    /// A parse error at the current token with a hint.
    pub(crate) fn error_with_hint(
        &self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Error {
        let tok = self.current();
        ParseError::new(message, tok.line, tok.column, self.source())
            .with_hint(hint)
            .into()
    }

    /// An error in expression position.
    pub(crate) fn expression_error(&self, message: impl Into<String>) -> Error {
        self.error_with_hint(
            message,
            "expected an expression: a literal, variable, call, object, array, or match",
        )
    }

    /// An error in type position.
    pub(crate) fn type_error(&self, message: impl Into<String>) -> Error {
        self.error_with_hint(
            message,
            "types look like `int`, `str?`, `[User]`, `List<int>`, `(int) -> str`, or `a | b`",
        )
    }

    /// An error inside a route declaration or body.
    pub(crate) fn route_error(&self, message: impl Into<String>) -> Error {
        self.error_with_hint(
            message,
            "route bodies accept `+` middleware, `%` injections, `< input : Type`, \
             `? name : type` query parameters, and statements",
        )
    }

    /// The missing-token error for `expect`.
    pub(crate) fn expect_error(&self, expected: TokenKind, context: &str) -> Error {
        build_missing_token_error(
            self.current(),
            &format!("`{expected}`"),
            context,
            self.source(),
        )
    }

    /// A parse error pinned to an explicit position (used when the
    /// offending construct started earlier than the current token).
    pub(crate) fn error_at_position(
        &self,
        message: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Error {
        ParseError::new(message, line, column, self.source()).into()
    }

    /// The unexpected-token error at the current position.
    pub(crate) fn unexpected_token(&self, context: &str) -> Error {
        build_unexpected_token_error(self.current(), context, self.source())
    }

    // ── Expectation helpers ────────────────────────────────────────────

    /// Consume a token of the given kind or fail with a missing-token
    /// error mentioning `context`.
    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, Error> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.expect_error(kind, context))
        }
    }

    /// Consume an identifier and return its text, or fail.
    pub(crate) fn expect_ident(&mut self, context: &str) -> Result<String, Error> {
        if self.at(TokenKind::Ident) {
            Ok(self.bump().literal)
        } else {
            Err(build_missing_token_error(
                self.current(),
                "an identifier",
                context,
                self.source(),
            ))
        }
    }

    /// Consume a string literal and return its contents, or fail.
    pub(crate) fn expect_string(&mut self, context: &str) -> Result<String, Error> {
        if self.at(TokenKind::String) {
            Ok(self.bump().literal)
        } else {
            Err(build_missing_token_error(
                self.current(),
                "a string literal",
                context,
                self.source(),
            ))
        }
    }
}
