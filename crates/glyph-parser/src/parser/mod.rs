//! Recursive-descent parser for Glyph.
//!
//! The parser owns the token vector and a cursor index into it. Each
//! `parse_x` function expects to be positioned at the first token of `x`
//! and, on success, has advanced past the last token it consumed. The
//! first error halts parsing; no partial AST is surfaced.
//!
//! Newlines are significant separators at module scope and between
//! statements; inside a single statement they are never skipped. Block
//! parsers call `skip_newlines` between grammar elements.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod patterns;
pub(crate) mod routes;
pub(crate) mod statements;
pub(crate) mod types;

use glyph_common::token::{Token, TokenKind};
use rustc_hash::FxHashSet;

use crate::Warning;

/// The Glyph parser: a token vector, a cursor, the type-parameter scope
/// stack, and collected warnings.
///
/// The parser is re-entrant over its stored tokens and holds no global
/// state; distinct parsers may run in parallel on distinct inputs.
pub(crate) struct Parser<'src> {
    /// All tokens from the lexer, ending in `Eof`.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Original source text, carried into errors for context rendering.
    source: &'src str,
    /// Type parameters currently in scope, one set per nesting level.
    scopes: Vec<FxHashSet<String>>,
    /// Non-fatal diagnostics (e.g. non-exhaustive match).
    warnings: Vec<Warning>,
}

impl<'src> Parser<'src> {
    /// Create a parser over a token stream.
    ///
    /// The stream must end with `Eof`, which `glyph_lexer::tokenize`
    /// guarantees.
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        debug_assert!(
            tokens.last().map(|t| t.kind) == Some(TokenKind::Eof),
            "token stream must end with Eof"
        );
        Self {
            tokens,
            pos: 0,
            source,
            scopes: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// The source text being parsed.
    pub(crate) fn source(&self) -> &'src str {
        self.source
    }

    /// Warnings collected so far, consumed by the facade.
    pub(crate) fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Record a non-fatal diagnostic at the current position.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let tok = self.current();
        self.warnings.push(Warning {
            message: message.into(),
            line: tok.line,
            column: tok.column,
        });
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// The current token. Past the end this stays on the final `Eof`.
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    /// Kind of the current token.
    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// The token `n` positions ahead, clamped to the final `Eof`.
    pub(crate) fn peek(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Kind of the token `n` positions ahead.
    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    /// Whether the current token has the given kind.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Whether the current token is an identifier with the given text.
    pub(crate) fn at_ident(&self, text: &str) -> bool {
        self.at(TokenKind::Ident) && self.current().literal == text
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume and return the current token. At `Eof` the cursor stays
    /// put, so repeated calls are safe.
    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    /// If the current token matches, consume it and return true.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume a run of newline tokens (blocks treat runs as a single
    /// separator).
    pub(crate) fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.bump();
        }
    }

    // ── Type-parameter scope ───────────────────────────────────────────

    /// Enter a type-parameter scope (a generic function or definition).
    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    /// Leave the innermost type-parameter scope.
    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a type parameter in the innermost scope.
    pub(crate) fn declare_type_param(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    /// Whether a name refers to a type parameter in any enclosing scope.
    pub(crate) fn is_type_param(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }
}
