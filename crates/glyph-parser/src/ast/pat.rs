use serde::Serialize;

use crate::ast::expr::Literal;

/// A pattern in a `match` case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Pattern {
    /// `200`, `"ok"`, `true`, `null`, `-1`.
    Literal(Literal),
    /// A bare identifier binding the matched value.
    Variable(String),
    /// `_`
    Wildcard,
    /// `{ key, other: pattern }`
    Object(Vec<ObjectFieldPattern>),
    /// `[a, b, ...rest]` -- at most one rest name, always last.
    Array {
        elements: Vec<Pattern>,
        rest: Option<String>,
    },
}

/// One entry of an object destructuring pattern. Without a sub-pattern
/// the key itself is the binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectFieldPattern {
    pub key: String,
    pub pattern: Option<Pattern>,
}

impl Pattern {
    /// Whether this pattern matches anything (`_` or a bare binding).
    ///
    /// Used for the non-exhaustive-match warning.
    pub fn is_irrefutable(&self) -> bool {
        matches!(self, Pattern::Wildcard | Pattern::Variable(_))
    }
}
