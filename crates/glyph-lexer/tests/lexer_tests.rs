//! Lexer integration tests over the public `tokenize` entry point.

use glyph_common::token::TokenKind;
use glyph_lexer::tokenize;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .expect("tokenize should succeed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

// ── Determinism and stream shape ─────────────────────────────────────────

#[test]
fn tokenize_is_deterministic_across_runs() {
    let source = "@ GET /users/:id {\n ? page: int = 1\n > {id: id}\n}";
    let first = tokenize(source).unwrap();
    let second = tokenize(source).unwrap();
    assert_eq!(first, second);
}

#[test]
fn stream_ends_with_exactly_one_eof() {
    for source in ["", "const A = 1", "@ GET /x { > 1 }\n\n"] {
        let tokens = tokenize(source).unwrap();
        let eof_count = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Eof)
            .count();
        assert_eq!(eof_count, 1, "source {source:?}");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn positions_point_at_the_start_of_each_lexeme() {
    let source = "const MAX = 100\n$ name = \"glyph\"";
    let lines: Vec<&str> = source.lines().collect();
    let tokens = tokenize(source).unwrap();

    for tok in &tokens {
        if matches!(
            tok.kind,
            TokenKind::Ident | TokenKind::Integer | TokenKind::Const
        ) {
            let line = lines[(tok.line - 1) as usize];
            let rest: String = line.chars().skip((tok.column - 1) as usize).collect();
            assert!(
                rest.starts_with(&tok.literal),
                "token {:?} at {}:{} should begin its lexeme in {line:?}",
                tok.literal,
                tok.line,
                tok.column
            );
        }
    }
}

#[test]
fn lines_and_columns_are_one_based_and_monotone() {
    let source = "a b\nc";
    let tokens = tokenize(source).unwrap();
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1)); // a
    assert_eq!((tokens[1].line, tokens[1].column), (1, 3)); // b
    assert_eq!((tokens[2].line, tokens[2].column), (1, 4)); // newline
    assert_eq!((tokens[3].line, tokens[3].column), (2, 1)); // c
}

// ── Path vs division ─────────────────────────────────────────────────────

#[test]
fn route_path_lexes_as_one_ident() {
    let tokens = tokenize("/api/users/:id").unwrap();
    assert_eq!(tokens.len(), 2); // path + EOF
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].literal, "/api/users/:id");
}

#[test]
fn division_after_integer_stays_three_tokens() {
    let tokens = tokenize("100 / min").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Integer,
            TokenKind::Slash,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[0].literal, "100");
    assert_eq!(tokens[2].literal, "min");
}

#[test]
fn division_binds_after_parenthesised_values() {
    assert_eq!(
        kinds("(a + b) / 2"),
        vec![
            TokenKind::LParen,
            TokenKind::Ident,
            TokenKind::Plus,
            TokenKind::Ident,
            TokenKind::RParen,
            TokenKind::Slash,
            TokenKind::Integer,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn path_allowed_at_line_start() {
    let tokens = tokenize("x = 1\n/health").unwrap();
    let path = tokens
        .iter()
        .find(|t| t.literal == "/health")
        .expect("path token");
    assert_eq!(path.kind, TokenKind::Ident);
}

// ── Keywords and identifiers ─────────────────────────────────────────────

#[test]
fn keywords_become_keyword_tokens() {
    assert_eq!(
        kinds("if else while for in match when async await"),
        vec![
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::For,
            TokenKind::In,
            TokenKind::Match,
            TokenKind::When,
            TokenKind::Async,
            TokenKind::Await,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn statement_words_stay_identifiers() {
    // `let`, `return`, and `yield` are contextual, not keywords.
    assert_eq!(
        kinds("let return yield"),
        vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

// ── Strings ──────────────────────────────────────────────────────────────

#[test]
fn string_literal_is_unescaped() {
    let tokens = tokenize(r#""line\none\ttab \"quoted\" back\\slash""#).unwrap();
    assert_eq!(tokens[0].literal, "line\none\ttab \"quoted\" back\\slash");
}

#[test]
fn unterminated_string_reports_position_and_hint() {
    let err = tokenize("$ greeting = \"hello").unwrap_err();
    assert_eq!(err.line(), 1);
    assert_eq!(err.column(), 14);
    assert!(err.message().contains("unterminated string"));
    assert!(err.hint().unwrap_or("").contains('"'));
}

// ── Errors ───────────────────────────────────────────────────────────────

#[test]
fn semicolon_gets_the_newline_hint() {
    let err = tokenize("$ x = 1;\n$ y = 2").unwrap_err();
    assert!(err.hint().unwrap_or("").contains("newlines"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("Lex error at line 1, column 8"));
    assert!(rendered.contains("Hint:"));
}

#[test]
fn unexpected_character_is_an_error() {
    let err = tokenize("$ x = `1`").unwrap_err();
    assert!(err.message().contains("unexpected character"));
}

#[test]
fn malformed_number_is_an_error() {
    let err = tokenize("$ x = 12abc").unwrap_err();
    assert!(err.message().contains("malformed numeric literal"));
}

#[test]
fn unterminated_string_message_snapshot() {
    let err = tokenize("\"oops").unwrap_err();
    insta::assert_snapshot!(err.message(), @"unterminated string literal");
}

// ── Rendered error window ────────────────────────────────────────────────

#[test]
fn rendered_error_carries_a_caret_window() {
    let err = tokenize("$ a = 1\n$ b = \"oops\n$ c = 3").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("1 | $ a = 1"));
    assert!(rendered.contains("2 | $ b = \"oops"));
    assert!(rendered.contains('^'));
    assert!(rendered.contains("3 | $ c = 3"));
}
