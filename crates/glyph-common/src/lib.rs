//! Shared types for the Glyph front-end: tokens, the keyword table, and
//! structured lex/parse errors with rendered source context.

pub mod error;
pub mod token;
