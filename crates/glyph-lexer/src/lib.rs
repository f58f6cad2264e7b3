//! Glyph lexer -- tokenizer for the Glyph service DSL.
//!
//! Converts a UTF-8 source string into a vector of tokens carrying
//! `(kind, literal, line, column)`. A single forward pass with one-char
//! lookahead; the only stateful rule is the path-vs-division decision,
//! which keys on the kind of the previously emitted token.

mod cursor;

use cursor::Cursor;
use glyph_common::error::{Error, LexError};
use glyph_common::token::{keyword_from_str, Token, TokenKind};

/// Tokenize a whole source string.
///
/// The returned vector always ends with a single `Eof` token. The first
/// lexical problem aborts the scan and is returned as `Error::Lex`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// The Glyph lexer. Converts source text into a stream of tokens.
///
/// Wraps a [`Cursor`] for character-level iteration. Call
/// [`Lexer::next_token`] until it yields `Eof`, or use the crate-level
/// [`tokenize`] convenience.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    source: &'src str,
    /// Kind of the most recently emitted token. `/` opens a path only when
    /// this is not a value-ending kind.
    prev: Option<TokenKind>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            source,
            prev: None,
        }
    }

    /// Produce the next token, or a lex error.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_trivia();

        let line = self.cursor.line();
        let column = self.cursor.column();
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Ok(self.emit(TokenKind::Eof, "", line, column));
        };

        let token = match c {
            // ── Newlines ───────────────────────────────────────────────
            '\n' => {
                self.cursor.advance();
                self.emit(TokenKind::Newline, "\n", line, column)
            }
            '\r' => {
                self.cursor.advance();
                // \r\n = single Newline
                if self.cursor.peek() == Some('\n') {
                    self.cursor.advance();
                }
                self.emit(TokenKind::Newline, "\n", line, column)
            }

            // ── Single-character delimiters and sigils ─────────────────
            '(' => self.single(TokenKind::LParen, c, line, column),
            ')' => self.single(TokenKind::RParen, c, line, column),
            '{' => self.single(TokenKind::LBrace, c, line, column),
            '}' => self.single(TokenKind::RBrace, c, line, column),
            '[' => self.single(TokenKind::LBracket, c, line, column),
            ']' => self.single(TokenKind::RBracket, c, line, column),
            ',' => self.single(TokenKind::Comma, c, line, column),
            '@' => self.single(TokenKind::At, c, line, column),
            ':' => self.single(TokenKind::Colon, c, line, column),
            '$' => self.single(TokenKind::Dollar, c, line, column),
            '~' => self.single(TokenKind::Tilde, c, line, column),
            '%' => self.single(TokenKind::Percent, c, line, column),
            '*' => self.single(TokenKind::Star, c, line, column),
            '+' => self.single(TokenKind::Plus, c, line, column),
            '?' => self.single(TokenKind::Question, c, line, column),

            // ── Multi-character operators ──────────────────────────────
            '=' => self.lex_eq(line, column),
            '!' => self.lex_bang(line, column),
            '<' => self.lex_lt(line, column),
            '>' => self.lex_gt(line, column),
            '&' => self.lex_amp(line, column),
            '|' => self.lex_pipe(line, column),
            '-' => self.lex_minus(line, column),
            '.' => self.lex_dot(line, column),

            // ── Slash: route path or division ──────────────────────────
            '/' => self.lex_slash(start, line, column),

            // ── Number literals ────────────────────────────────────────
            '0'..='9' => self.lex_number(start, line, column)?,

            // ── String literals ────────────────────────────────────────
            '"' => self.lex_string(line, column)?,

            // ── Identifiers and keywords ───────────────────────────────
            c if is_ident_start(c) => self.lex_ident(start, line, column),

            // ── Semicolons get a dedicated hint ────────────────────────
            ';' => {
                return Err(LexError::new(
                    "unexpected character: ';'",
                    line,
                    column,
                    self.source,
                )
                .with_char(';')
                .with_hint("Glyph separates statements with newlines, not semicolons")
                .into());
            }

            _ => {
                return Err(LexError::new(
                    format!("unexpected character: {c:?}"),
                    line,
                    column,
                    self.source,
                )
                .with_char(c)
                .into());
            }
        };

        Ok(token)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Record the token's kind for the path-vs-division rule and build it.
    fn emit(&mut self, kind: TokenKind, literal: impl Into<String>, line: u32, column: u32) -> Token {
        self.prev = Some(kind);
        Token::new(kind, literal, line, column)
    }

    /// Consume one character and emit a token of the given kind.
    fn single(&mut self, kind: TokenKind, c: char, line: u32, column: u32) -> Token {
        self.cursor.advance();
        self.emit(kind, c.to_string(), line, column)
    }

    /// Skip spaces, tabs, and comments. Newlines are tokens, never trivia.
    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(|c| c == ' ' || c == '\t');
            match (self.cursor.peek(), self.cursor.peek_next()) {
                (Some('/'), Some('/')) => {
                    self.cursor.eat_while(|c| c != '\n' && c != '\r');
                }
                (Some('/'), Some('*')) => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    /// Skip a block comment `/* ... */`, which may nest to arbitrary depth.
    ///
    /// An unterminated block comment silently runs to end of input.
    fn skip_block_comment(&mut self) {
        self.cursor.advance(); // /
        self.cursor.advance(); // *
        let mut depth: u32 = 1;
        while depth > 0 {
            match self.cursor.peek() {
                None => return,
                Some('/') if self.cursor.peek_next() == Some('*') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth += 1;
                }
                Some('*') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    depth -= 1;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Operator lexing ────────────────────────────────────────────────

    /// `=` -> `Equals`, `==` -> `EqEq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '='
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                self.emit(TokenKind::EqEq, "==", line, column)
            }
            Some('>') => {
                self.cursor.advance();
                self.emit(TokenKind::FatArrow, "=>", line, column)
            }
            _ => self.emit(TokenKind::Equals, "=", line, column),
        }
    }

    /// `!` -> `Bang`, `!=` -> `NotEq`
    fn lex_bang(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '!'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.emit(TokenKind::NotEq, "!=", line, column)
        } else {
            self.emit(TokenKind::Bang, "!", line, column)
        }
    }

    /// `<` -> `Less`, `<=` -> `LessEq`
    fn lex_lt(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '<'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.emit(TokenKind::LessEq, "<=", line, column)
        } else {
            self.emit(TokenKind::Less, "<", line, column)
        }
    }

    /// `>` -> `Greater`, `>=` -> `GreaterEq`
    fn lex_gt(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '>'
        if self.cursor.peek() == Some('=') {
            self.cursor.advance();
            self.emit(TokenKind::GreaterEq, ">=", line, column)
        } else {
            self.emit(TokenKind::Greater, ">", line, column)
        }
    }

    /// `&&` -> `And`, single `&` -> `Ampersand` (queue worker sigil)
    fn lex_amp(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '&'
        if self.cursor.peek() == Some('&') {
            self.cursor.advance();
            self.emit(TokenKind::And, "&&", line, column)
        } else {
            self.emit(TokenKind::Ampersand, "&", line, column)
        }
    }

    /// `||` -> `Or`, `|>` -> `PipeOp`, single `|` -> `Pipe` (union types)
    fn lex_pipe(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '|'
        match self.cursor.peek() {
            Some('|') => {
                self.cursor.advance();
                self.emit(TokenKind::Or, "||", line, column)
            }
            Some('>') => {
                self.cursor.advance();
                self.emit(TokenKind::PipeOp, "|>", line, column)
            }
            _ => self.emit(TokenKind::Pipe, "|", line, column),
        }
    }

    /// `-` -> `Minus`, `->` -> `Arrow`
    fn lex_minus(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '-'
        if self.cursor.peek() == Some('>') {
            self.cursor.advance();
            self.emit(TokenKind::Arrow, "->", line, column)
        } else {
            self.emit(TokenKind::Minus, "-", line, column)
        }
    }

    /// `.` -> `Dot`, `...` -> `DotDotDot`
    fn lex_dot(&mut self, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume '.'
        if self.cursor.peek() == Some('.') && self.cursor.peek_next() == Some('.') {
            self.cursor.advance();
            self.cursor.advance();
            self.emit(TokenKind::DotDotDot, "...", line, column)
        } else {
            self.emit(TokenKind::Dot, ".", line, column)
        }
    }

    // ── Slash: path vs division ────────────────────────────────────────

    /// Decide whether `/` opens a route path or is the division operator.
    ///
    /// A path is possible only in operator/keyword context: when the
    /// previous token ends a value (identifier, literal, `)`, `]`) the
    /// slash is division. When a path is possible and the next character
    /// is an identifier character or `:`, the whole `/seg/:param/seg2`
    /// run becomes a single `Ident` token.
    fn lex_slash(&mut self, start: u32, line: u32, column: u32) -> Token {
        let path_context = !matches!(
            self.prev,
            Some(
                TokenKind::Ident
                    | TokenKind::String
                    | TokenKind::Integer
                    | TokenKind::Float
                    | TokenKind::RParen
                    | TokenKind::RBracket
            )
        );
        let opens_path = path_context
            && self
                .cursor
                .peek_next()
                .is_some_and(|c| is_ident_continue(c) || c == ':');

        if opens_path {
            self.cursor.advance(); // consume '/'
            self.cursor
                .eat_while(|c| is_ident_continue(c) || c == '/' || c == ':' || c == '-');
            let text = self.cursor.slice(start, self.cursor.pos()).to_string();
            self.emit(TokenKind::Ident, text, line, column)
        } else {
            self.cursor.advance();
            self.emit(TokenKind::Slash, "/", line, column)
        }
    }

    // ── Number literals ────────────────────────────────────────────────

    /// Lex `[0-9]+` as INTEGER or `[0-9]+.[0-9]+` as FLOAT.
    ///
    /// The literal carries the raw text; numeric parsing happens in the
    /// parser. A digit run flowing directly into identifier characters
    /// is a malformed literal.
    fn lex_number(&mut self, start: u32, line: u32, column: u32) -> Result<Token, Error> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        let mut kind = TokenKind::Integer;
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.cursor.advance(); // consume '.'
            self.cursor.eat_while(|c| c.is_ascii_digit());
            kind = TokenKind::Float;
        }

        if self.cursor.peek().is_some_and(is_ident_start) {
            self.cursor.eat_while(is_ident_continue);
            let text = self.cursor.slice(start, self.cursor.pos());
            return Err(LexError::new(
                format!("malformed numeric literal: `{text}`"),
                line,
                column,
                self.source,
            )
            .with_hint("identifiers cannot start with a digit")
            .into());
        }

        let text = self.cursor.slice(start, self.cursor.pos()).to_string();
        Ok(self.emit(kind, text, line, column))
    }

    // ── String literals ────────────────────────────────────────────────

    /// Lex a double-quoted string, decoding `\n \t \r \" \\` escapes.
    ///
    /// Strings are single-line: a raw newline or end of input before the
    /// closing quote is an unterminated-string error.
    fn lex_string(&mut self, line: u32, column: u32) -> Result<Token, Error> {
        self.cursor.advance(); // consume opening '"'
        let mut value = String::new();

        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    return Err(LexError::new(
                        "unterminated string literal",
                        line,
                        column,
                        self.source,
                    )
                    .with_hint("add a closing '\"' before the end of the line")
                    .into());
                }
                Some('"') => {
                    self.cursor.advance();
                    return Ok(self.emit(TokenKind::String, value, line, column));
                }
                Some('\\') => {
                    self.cursor.advance(); // consume '\'
                    match self.cursor.peek() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        // Unknown escape: keep the escaped character verbatim.
                        Some(other) => value.push(other),
                        None => {
                            return Err(LexError::new(
                                "unterminated string literal",
                                line,
                                column,
                                self.source,
                            )
                            .with_hint("add a closing '\"' before the end of the line")
                            .into());
                        }
                    }
                    self.cursor.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Identifiers and keywords ───────────────────────────────────────

    /// Lex an identifier or keyword.
    fn lex_ident(&mut self, start: u32, line: u32, column: u32) -> Token {
        self.cursor.advance(); // consume first char
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos()).to_string();

        let kind = keyword_from_str(&text).unwrap_or(TokenKind::Ident);
        self.emit(kind, text, line, column)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_simple_const() {
        assert_eq!(
            kinds("const MAX = 100"),
            vec![
                TokenKind::Const,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_positions_point_at_first_char() {
        let tokens = tokenize("const MAX = 100").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1)); // const
        assert_eq!((tokens[1].line, tokens[1].column), (1, 7)); // MAX
        assert_eq!((tokens[2].line, tokens[2].column), (1, 11)); // =
        assert_eq!((tokens[3].line, tokens[3].column), (1, 13)); // 100
    }

    #[test]
    fn lex_newlines_emitted() {
        assert_eq!(
            kinds("$ x = 1\n$ y = 2"),
            vec![
                TokenKind::Dollar,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::Integer,
                TokenKind::Newline,
                TokenKind::Dollar,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_path_after_at_is_one_ident() {
        let tokens = tokenize("@ /api/users/:id").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].literal, "/api/users/:id");
    }

    #[test]
    fn lex_division_after_integer() {
        assert_eq!(
            kinds("100 / min"),
            vec![
                TokenKind::Integer,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_division_without_spaces() {
        let tokens = tokenize("100/min").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Slash);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[2].literal, "min");
    }

    #[test]
    fn lex_multi_char_operators() {
        assert_eq!(
            kinds("-> => == != <= >= && || |> ..."),
            vec![
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::PipeOp,
                TokenKind::DotDotDot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_string_escapes_decoded() {
        let tokens = tokenize(r#""a\nb\t\"c\"""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "a\nb\t\"c\"");
    }

    #[test]
    fn lex_unterminated_string_errors_with_hint() {
        let err = tokenize("\"oops").unwrap_err();
        let Error::Lex(lex) = err else {
            panic!("expected a lex error");
        };
        assert_eq!(lex.message, "unterminated string literal");
        assert!(lex.hint.is_some());
    }

    #[test]
    fn lex_string_stops_at_newline() {
        assert!(tokenize("\"first\nsecond\"x").is_err());
    }

    #[test]
    fn lex_semicolon_hint() {
        let err = tokenize("$ x = 1;").unwrap_err();
        assert!(err.hint().unwrap_or("").contains("newlines"));
    }

    #[test]
    fn lex_nested_block_comment() {
        assert_eq!(
            kinds("1 /* outer /* inner */ still */ + 2"),
            vec![
                TokenKind::Integer,
                TokenKind::Plus,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_line_comment_keeps_newline() {
        assert_eq!(
            kinds("1 // two\n3"),
            vec![
                TokenKind::Integer,
                TokenKind::Newline,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_malformed_number() {
        let err = tokenize("123abc").unwrap_err();
        assert!(err.message().contains("malformed numeric literal"));
    }

    #[test]
    fn lex_float() {
        let tokens = tokenize("3.14").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[0].literal, "3.14");
    }

    #[test]
    fn lex_integer_then_dot_call_is_not_float() {
        // `1.to_s` stays INTEGER DOT IDENT -- the dot only folds into a
        // float when a digit follows.
        assert_eq!(
            kinds("1.abs()"),
            vec![
                TokenKind::Integer,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_crlf_folds_to_one_newline() {
        assert_eq!(
            kinds("1\r\n2"),
            vec![
                TokenKind::Integer,
                TokenKind::Newline,
                TokenKind::Integer,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_deterministic() {
        let a = tokenize("@ GET /x { > 1 }").unwrap();
        let b = tokenize("@ GET /x { > 1 }").unwrap();
        assert_eq!(a, b);
    }
}
