use serde::Serialize;

use crate::ast::expr::Expr;

/// A Glyph statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// `$ target.path = value` or `let name = value`. The target is the
    /// dotted path split into segments; a plain binding has one segment.
    Assign { target: Vec<String>, value: Expr },
    /// `name = value` without a `$` -- rebinding an existing name.
    Reassign { name: String, value: Expr },
    /// `> expr` or `return expr`.
    Return(Expr),
    /// `yield expr` (meaningful under SSE routes; accepted everywhere).
    Yield(Expr),
    If {
        condition: Expr,
        then_branch: Vec<Statement>,
        /// For `else if` chains this holds a single nested `If`.
        else_branch: Option<Vec<Statement>>,
    },
    While {
        condition: Expr,
        body: Vec<Statement>,
    },
    For {
        /// Present in the `key, value in expr` form.
        key: Option<String>,
        value: String,
        iterable: Expr,
        body: Vec<Statement>,
    },
    Switch {
        value: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Statement>>,
    },
    /// A bare call or field access in statement position.
    Expression(Expr),
    /// `? check(args)` -- a validation call.
    Validation(Expr),
    /// `assert(cond)` or `assert(cond, message)`.
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
}

/// One `case value { ... }` arm of a `switch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Statement>,
}
