use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of syntax errors kept before the lexer or parser gives up.
pub const MAX_ERRORS: usize = 20;

/// A lexing or parsing error.
///
/// Carries the offending position and the source line so a host can render
/// it without going back to the file.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{span}: {message}")]
pub struct SyntaxError {
    pub file: String,
    pub message: String,
    pub span: Span,
    pub source_line: String,
}

impl SyntaxError {
    pub fn new(
        file: impl Into<String>,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
            span,
            source_line: source_line.into(),
        }
    }

    /// Build an error, pulling the source line out of `source`.
    pub fn at(source: &SourceFile, message: impl Into<String>, span: Span) -> Self {
        let line = source.line(span.start_line).unwrap_or("");
        Self::new(&source.name, message, span, line)
    }
}

/// Errors collected over one lexing or parsing pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxError>,
    /// Every error seen, including the ones dropped past [`MAX_ERRORS`].
    pub total_errors: usize,
}

impl SyntaxErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// `true` once the cap is reached and scanning should stop.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    pub fn push(&mut self, error: SyntaxError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Append another pass's errors, keeping the cap.
    pub fn extend(&mut self, other: SyntaxErrors) {
        let dropped = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push(error);
        }
        self.total_errors += dropped;
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyntaxError> {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample(line: u32) -> SyntaxError {
        SyntaxError::new("t.pseudo", "expected 'THEN'", Span::point(line, 1), "IF x > 1")
    }

    #[test]
    fn display_includes_position() {
        assert_eq!(sample(3).to_string(), "3:1: expected 'THEN'");
    }

    #[test]
    fn at_extracts_source_line() {
        let src = SourceFile::new("t.pseudo", "x <- 1\nIF x > 1\nENDIF");
        let err = SyntaxError::at(&src, "expected 'THEN'", Span::new(2, 9, 2, 9));
        assert_eq!(err.source_line, "IF x > 1");
        assert_eq!(err.file, "t.pseudo");
    }

    #[test]
    fn collection_caps_stored_errors() {
        let mut errs = SyntaxErrors::empty();
        for i in 0..25 {
            errs.push(sample(i + 1));
        }
        assert_eq!(errs.errors.len(), MAX_ERRORS);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.is_full());
    }

    #[test]
    fn extend_keeps_dropped_count() {
        let mut first = SyntaxErrors::empty();
        first.push(sample(1));
        let mut second = SyntaxErrors::empty();
        for i in 0..22 {
            second.push(sample(i + 2));
        }
        first.extend(second);
        assert_eq!(first.errors.len(), MAX_ERRORS);
        assert_eq!(first.total_errors, 23);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(sample(7)).unwrap();
        assert_eq!(json["message"], "expected 'THEN'");
        assert_eq!(json["span"]["start_line"], 7);
        assert_eq!(json["source_line"], "IF x > 1");
    }
}
