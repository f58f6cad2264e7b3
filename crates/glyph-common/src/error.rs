use std::fmt;

use serde::Serialize;

/// Any front-end error: lexing or parsing.
///
/// Programmatic consumers match on the variant and read `line`/`column`
/// directly; the `Display` impl renders the caret-annotated block for
/// humans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
}

impl Error {
    /// 1-based line of the error.
    pub fn line(&self) -> u32 {
        match self {
            Error::Lex(e) => e.line,
            Error::Parse(e) => e.line,
        }
    }

    /// 1-based column of the error.
    pub fn column(&self) -> u32 {
        match self {
            Error::Lex(e) => e.column,
            Error::Parse(e) => e.column,
        }
    }

    /// Human-readable message without location or context.
    pub fn message(&self) -> &str {
        match self {
            Error::Lex(e) => &e.message,
            Error::Parse(e) => &e.message,
        }
    }

    /// The hint attached to this error, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Error::Lex(e) => e.hint.as_deref(),
            Error::Parse(e) => e.hint.as_deref(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => render(f, "Lex", &e.message, e.line, e.column, &e.source, e.hint.as_deref()),
            Error::Parse(e) => {
                render(f, "Parse", &e.message, e.line, e.column, &e.source, e.hint.as_deref())
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

/// A lexer error with location information and rendered source context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// 1-based line where the error was detected.
    pub line: u32,
    /// 1-based column where the error was detected.
    pub column: u32,
    /// The full source text, kept for context rendering.
    pub source: String,
    /// The offending character, when one exists.
    pub ch: Option<char>,
    /// Static guidance on the expected input.
    pub hint: Option<String>,
}

impl LexError {
    /// Create a new lexer error without a hint.
    pub fn new(
        message: impl Into<String>,
        line: u32,
        column: u32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            source: source.into(),
            ch: None,
            hint: None,
        }
    }

    /// Attach the offending character.
    pub fn with_char(mut self, ch: char) -> Self {
        self.ch = Some(ch);
        self
    }

    /// Attach a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, "Lex", &self.message, self.line, self.column, &self.source, self.hint.as_deref())
    }
}

impl std::error::Error for LexError {}

/// A parse error with location information and rendered source context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// 1-based line where the error was detected.
    pub line: u32,
    /// 1-based column where the error was detected.
    pub column: u32,
    /// The full source text, kept for context rendering.
    pub source: String,
    /// Static guidance on the expected grammar fragment.
    pub hint: Option<String>,
}

impl ParseError {
    /// Create a new parse error without a hint.
    pub fn new(
        message: impl Into<String>,
        line: u32,
        column: u32,
        source: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            source: source.into(),
            hint: None,
        }
    }

    /// Attach a hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(f, "Parse", &self.message, self.line, self.column, &self.source, self.hint.as_deref())
    }
}

impl std::error::Error for ParseError {}

/// Render the shared error block: headline, a 3-line window around the
/// error with line-number prefixes, a caret on the error column, and the
/// hint when present.
fn render(
    f: &mut fmt::Formatter<'_>,
    kind: &str,
    message: &str,
    line: u32,
    column: u32,
    source: &str,
    hint: Option<&str>,
) -> fmt::Result {
    write!(f, "{kind} error at line {line}, column {column}: {message}")?;

    if !source.is_empty() {
        let lines: Vec<&str> = source.lines().collect();
        let idx = (line as usize).saturating_sub(1);
        // Width of the widest line number shown, for right alignment.
        let last_shown = (idx + 2).min(lines.len());
        let width = last_shown.to_string().len();

        if idx >= 1 {
            if let Some(prev) = lines.get(idx - 1) {
                write!(f, "\n  {:>width$} | {prev}", idx)?;
            }
        }
        if let Some(cur) = lines.get(idx) {
            write!(f, "\n  {:>width$} | {cur}", idx + 1)?;
            let pad = " ".repeat((column as usize).saturating_sub(1));
            write!(f, "\n  {:>width$} | {pad}^", "")?;
        }
        if let Some(next) = lines.get(idx + 1) {
            write!(f, "\n  {:>width$} | {next}", idx + 2)?;
        }
    }

    if let Some(hint) = hint {
        write!(f, "\nHint: {hint}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_headline() {
        let err = LexError::new("unexpected character: '^'", 1, 3, "").with_char('^');
        let rendered = err.to_string();
        assert_eq!(rendered, "Lex error at line 1, column 3: unexpected character: '^'");
    }

    #[test]
    fn parse_error_renders_window_and_caret() {
        let source = "const A = 1\nconst B =\nconst C = 3";
        let err = ParseError::new("expected expression", 2, 10, source);
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "Parse error at line 2, column 10: expected expression\n  \
             1 | const A = 1\n  \
             2 | const B =\n    |          ^\n  \
             3 | const C = 3"
        );
    }

    #[test]
    fn parse_error_first_line_has_no_previous_row() {
        let source = "bogus\nconst A = 1";
        let err = ParseError::new("unexpected token", 1, 1, source);
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "Parse error at line 1, column 1: unexpected token\n  \
             1 | bogus\n    | ^\n  \
             2 | const A = 1"
        );
    }

    #[test]
    fn hint_line_is_last() {
        let source = "const A = ;";
        let err = ParseError::new("unexpected token `;`", 1, 11, source)
            .with_hint("newlines separate statements");
        let rendered = err.to_string();
        assert!(rendered.ends_with("Hint: newlines separate statements"));
    }

    #[test]
    fn error_accessors() {
        let err: Error = ParseError::new("boom", 4, 2, "x").with_hint("fix it").into();
        assert_eq!(err.line(), 4);
        assert_eq!(err.column(), 2);
        assert_eq!(err.message(), "boom");
        assert_eq!(err.hint(), Some("fix it"));
    }

    #[test]
    fn lex_error_carries_offending_char() {
        let err = LexError::new("unexpected character: ';'", 1, 1, ";")
            .with_char(';')
            .with_hint("Glyph uses newlines to separate statements, not semicolons");
        assert_eq!(err.ch, Some(';'));
        assert!(err.to_string().contains("Hint: Glyph uses newlines"));
    }
}
