//! Statement parser for Glyph.
//!
//! Statements dispatch on their leading token: `?` validation calls,
//! `$` assignments, `>` returns, the `let`/`return`/`yield` identifier
//! forms, bare reassignments, control flow (`if`/`while`/`for`/
//! `switch`), `assert`, and expression statements restricted to calls
//! and field accesses.

use glyph_common::error::Error;
use glyph_common::token::TokenKind;

use crate::ast::{Expr, Literal, Statement, SwitchCase};

use super::{expressions, types, Parser};

/// Parse one statement.
pub(crate) fn parse_statement(p: &mut Parser) -> Result<Statement, Error> {
    match p.kind() {
        TokenKind::Question => parse_validation(p),
        TokenKind::Dollar => parse_assignment(p),
        TokenKind::Greater => {
            p.bump();
            let value = expressions::parse_expression(p)?;
            Ok(Statement::Return(value))
        }
        TokenKind::If => parse_if(p),
        TokenKind::While => parse_while(p),
        TokenKind::For => parse_for(p),
        TokenKind::Switch => parse_switch(p),
        TokenKind::Assert => parse_assert(p),

        TokenKind::Ident if p.current().literal == "let" => parse_let(p),
        TokenKind::Ident if p.current().literal == "return" => {
            p.bump();
            let value = expressions::parse_expression(p)?;
            Ok(Statement::Return(value))
        }
        TokenKind::Ident if p.current().literal == "yield" => {
            p.bump();
            let value = expressions::parse_expression(p)?;
            Ok(Statement::Yield(value))
        }

        // Bare reassignment: `name = value` without a `$`.
        TokenKind::Ident if p.peek_kind(1) == TokenKind::Equals => {
            let name = p.bump().literal;
            p.bump(); // =
            let value = expressions::parse_expression(p)?;
            Ok(Statement::Reassign { name, value })
        }

        _ => parse_expression_statement(p),
    }
}

/// `? check(args)` -- one identifier followed by a parenthesised
/// argument list.
fn parse_validation(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // ?
    let name = p.expect_ident("after `?` in a validation statement")?;
    if !p.at(TokenKind::LParen) {
        return Err(p.expect_error(TokenKind::LParen, "after the validation function name"));
    }
    let args = expressions::parse_call_args(p)?;
    Ok(Statement::Validation(Expr::FunctionCall { name, args }))
}

/// `$ name [: type] [.field ...] = value`
///
/// The type annotation is parsed and discarded; assignments are typed by
/// the semantic stage. `$ name : type` without an initializer declares
/// the name seeded with an empty-string literal.
fn parse_assignment(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // $
    let name = p.expect_ident("after `$`")?;

    let mut annotated = false;
    if p.eat(TokenKind::Colon) {
        let _ = types::parse_type(p)?;
        annotated = true;
    }

    let mut target = vec![name];
    while p.at(TokenKind::Dot) && p.peek_kind(1) == TokenKind::Ident {
        p.bump(); // .
        target.push(p.bump().literal);
    }

    if p.eat(TokenKind::Equals) {
        let value = expressions::parse_expression(p)?;
        Ok(Statement::Assign { target, value })
    } else if annotated {
        // Declaration-only form.
        Ok(Statement::Assign {
            target,
            value: Expr::Literal(Literal::Str(String::new())),
        })
    } else {
        Err(p.expect_error(TokenKind::Equals, "in the assignment"))
    }
}

/// `let name [: type] [= value]` -- mirrors `$`.
fn parse_let(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // let
    let name = p.expect_ident("after `let`")?;

    let mut annotated = false;
    if p.eat(TokenKind::Colon) {
        let _ = types::parse_type(p)?;
        annotated = true;
    }

    if p.eat(TokenKind::Equals) {
        let value = expressions::parse_expression(p)?;
        Ok(Statement::Assign {
            target: vec![name],
            value,
        })
    } else if annotated {
        Ok(Statement::Assign {
            target: vec![name],
            value: Expr::Literal(Literal::Str(String::new())),
        })
    } else {
        Err(p.expect_error(TokenKind::Equals, "in the `let` binding"))
    }
}

/// `if cond { ... } [else if cond { ... }]* [else { ... }]`
///
/// The chain is parsed by left-deep recursion: each `else if` nests a
/// single `If` statement inside the else branch.
fn parse_if(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // if
    let condition = expressions::parse_expression(p)?;
    let then_branch = parse_brace_block(p)?;

    let else_branch = if p.eat(TokenKind::Else) {
        if p.at(TokenKind::If) {
            Some(vec![parse_if(p)?])
        } else {
            Some(parse_brace_block(p)?)
        }
    } else {
        None
    };

    Ok(Statement::If {
        condition,
        then_branch,
        else_branch,
    })
}

/// `while cond { ... }`
fn parse_while(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // while
    let condition = expressions::parse_expression(p)?;
    let body = parse_brace_block(p)?;
    Ok(Statement::While { condition, body })
}

/// `for value in expr { ... }` or `for key, value in expr { ... }`
fn parse_for(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // for
    let first = p.expect_ident("after `for`")?;

    let (key, value) = if p.eat(TokenKind::Comma) {
        let second = p.expect_ident("after `,` in the for binding")?;
        (Some(first), second)
    } else {
        (None, first)
    };

    p.expect(TokenKind::In, "in the for statement")?;
    let iterable = expressions::parse_expression(p)?;
    let body = parse_brace_block(p)?;

    Ok(Statement::For {
        key,
        value,
        iterable,
        body,
    })
}

/// `switch value { case v { ... } ... default { ... } }`
fn parse_switch(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // switch
    let value = expressions::parse_expression(p)?;
    p.expect(TokenKind::LBrace, "after the switch value")?;
    p.skip_newlines();

    let mut cases = Vec::new();
    let mut default = None;

    while !p.at(TokenKind::RBrace) {
        match p.kind() {
            TokenKind::Case => {
                p.bump();
                let case_value = expressions::parse_expression(p)?;
                let body = parse_brace_block(p)?;
                cases.push(SwitchCase {
                    value: case_value,
                    body,
                });
            }
            TokenKind::Default => {
                p.bump();
                let body = parse_brace_block(p)?;
                default = Some(body);
            }
            _ => {
                return Err(p.unexpected_token(
                    "in the switch body; expected `case`, `default`, or `}`",
                ))
            }
        }
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the switch statement")?;
    Ok(Statement::Switch {
        value,
        cases,
        default,
    })
}

/// `assert(cond)` or `assert(cond, message)`
fn parse_assert(p: &mut Parser) -> Result<Statement, Error> {
    p.bump(); // assert
    p.expect(TokenKind::LParen, "after `assert`")?;
    let condition = expressions::parse_expression(p)?;
    let message = if p.eat(TokenKind::Comma) {
        Some(expressions::parse_expression(p)?)
    } else {
        None
    };
    p.expect(TokenKind::RParen, "to close the assert")?;
    Ok(Statement::Assert { condition, message })
}

/// An expression in statement position must be a call or a field access;
/// any other expression has no effect and is rejected.
fn parse_expression_statement(p: &mut Parser) -> Result<Statement, Error> {
    let start = p.current().clone();
    let expr = expressions::parse_expression(p)?;
    match expr {
        Expr::FunctionCall { .. } | Expr::FieldAccess { .. } => Ok(Statement::Expression(expr)),
        _ => Err(glyph_common::error::ParseError::new(
            "expression statements must be calls or field accesses",
            start.line,
            start.column,
            p.source(),
        )
        .with_hint("use `$ name = value` to bind the result of an expression")
        .into()),
    }
}

/// `{ statement* }` -- the brace-delimited body shared by control flow,
/// functions, and handlers. Newlines separate statements.
pub(crate) fn parse_brace_block(p: &mut Parser) -> Result<Vec<Statement>, Error> {
    p.expect(TokenKind::LBrace, "to open the block")?;
    p.skip_newlines();

    let mut body = Vec::new();
    while !p.at(TokenKind::RBrace) && !p.at(TokenKind::Eof) {
        body.push(parse_statement(p)?);
        p.skip_newlines();
    }

    p.expect(TokenKind::RBrace, "to close the block")?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn stmt(source: &str) -> Statement {
        let tokens = glyph_lexer::tokenize(source).expect("lexes");
        let mut p = Parser::new(tokens, source);
        parse_statement(&mut p).expect("parses")
    }

    fn stmt_err(source: &str) -> Error {
        let tokens = glyph_lexer::tokenize(source).expect("lexes");
        let mut p = Parser::new(tokens, source);
        parse_statement(&mut p).unwrap_err()
    }

    #[test]
    fn dollar_assignment() {
        assert_eq!(
            stmt("$ count = 1"),
            Statement::Assign {
                target: vec!["count".into()],
                value: Expr::int(1),
            }
        );
    }

    #[test]
    fn dollar_assignment_with_field_path() {
        assert_eq!(
            stmt("$ user.name = \"ada\""),
            Statement::Assign {
                target: vec!["user".into(), "name".into()],
                value: Expr::str("ada"),
            }
        );
    }

    #[test]
    fn dollar_declaration_only_seeds_empty_string() {
        assert_eq!(
            stmt("$ token: str"),
            Statement::Assign {
                target: vec!["token".into()],
                value: Expr::str(""),
            }
        );
    }

    #[test]
    fn dollar_with_type_and_value_discards_the_type() {
        assert_eq!(
            stmt("$ count: int = 2"),
            Statement::Assign {
                target: vec!["count".into()],
                value: Expr::int(2),
            }
        );
    }

    #[test]
    fn let_mirrors_dollar() {
        assert_eq!(
            stmt("let x = 5"),
            Statement::Assign {
                target: vec!["x".into()],
                value: Expr::int(5),
            }
        );
    }

    #[test]
    fn sigil_return() {
        assert_eq!(
            stmt("> a + b"),
            Statement::Return(Expr::BinaryOp {
                op: BinaryOp::Add,
                left: Box::new(Expr::var("a")),
                right: Box::new(Expr::var("b")),
            })
        );
    }

    #[test]
    fn word_return_and_yield() {
        assert_eq!(stmt("return 1"), Statement::Return(Expr::int(1)));
        assert_eq!(stmt("yield event"), Statement::Yield(Expr::var("event")));
    }

    #[test]
    fn bare_reassignment() {
        assert_eq!(
            stmt("count = count + 1"),
            Statement::Reassign {
                name: "count".into(),
                value: Expr::BinaryOp {
                    op: BinaryOp::Add,
                    left: Box::new(Expr::var("count")),
                    right: Box::new(Expr::int(1)),
                },
            }
        );
    }

    #[test]
    fn validation_statement() {
        assert_eq!(
            stmt("? validate_email(email)"),
            Statement::Validation(Expr::FunctionCall {
                name: "validate_email".into(),
                args: vec![Expr::var("email")],
            })
        );
    }

    #[test]
    fn call_is_a_valid_expression_statement() {
        assert_eq!(
            stmt("log.info(\"hi\")"),
            Statement::Expression(Expr::FunctionCall {
                name: "log.info".into(),
                args: vec![Expr::str("hi")],
            })
        );
    }

    #[test]
    fn bare_value_is_not_a_statement() {
        let err = stmt_err("1 + 2");
        assert!(err.message().contains("calls or field accesses"));
        assert!(err.hint().unwrap_or("").contains("$"));
    }

    #[test]
    fn if_else_chain_nests() {
        let Statement::If {
            else_branch: Some(else_branch),
            ..
        } = stmt("if a { > 1 } else if b { > 2 } else { > 3 }")
        else {
            panic!("expected an if with an else branch");
        };
        assert_eq!(else_branch.len(), 1);
        let Statement::If {
            else_branch: Some(inner_else),
            ..
        } = &else_branch[0]
        else {
            panic!("expected a nested if");
        };
        assert_eq!(inner_else.len(), 1);
    }

    #[test]
    fn while_statement() {
        let Statement::While { body, .. } = stmt("while x < 10 { x = x + 1 }") else {
            panic!("expected a while");
        };
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn for_single_and_pair_bindings() {
        let Statement::For { key, value, .. } = stmt("for item in items { ? check(item) }")
        else {
            panic!("expected a for");
        };
        assert_eq!(key, None);
        assert_eq!(value, "item");

        let Statement::For { key, value, .. } = stmt("for k, v in pairs { ? check(k) }") else {
            panic!("expected a for");
        };
        assert_eq!(key.as_deref(), Some("k"));
        assert_eq!(value, "v");
    }

    #[test]
    fn switch_with_cases_and_default() {
        let Statement::Switch {
            cases, default, ..
        } = stmt("switch code {\ncase 200 { > \"ok\" }\ncase 404 { > \"nf\" }\ndefault { > \"?\" }\n}")
        else {
            panic!("expected a switch");
        };
        assert_eq!(cases.len(), 2);
        assert!(default.is_some());
    }

    #[test]
    fn assert_with_and_without_message() {
        assert_eq!(
            stmt("assert(x == 1)"),
            Statement::Assert {
                condition: Expr::BinaryOp {
                    op: BinaryOp::Eq,
                    left: Box::new(Expr::var("x")),
                    right: Box::new(Expr::int(1)),
                },
                message: None,
            }
        );
        let Statement::Assert { message, .. } = stmt("assert(ok, \"boom\")") else {
            panic!("expected an assert");
        };
        assert_eq!(message, Some(Expr::str("boom")));
    }
}
