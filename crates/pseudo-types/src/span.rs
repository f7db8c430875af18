use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Source location span.
///
/// Lines and columns are 1-based, matching what the diagnostics print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) = (self.start_line, self.start_col)
            .min((other.start_line, other.start_col));
        let (end_line, end_col) =
            (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span::new(start_line, start_col, end_line, end_col)
    }

    /// Width of the span on its first line, at least 1.
    ///
    /// Used to size the caret underline in rendered diagnostics.
    pub fn width_on_first_line(&self) -> u32 {
        if self.end_line == self.start_line && self.end_col >= self.start_col {
            self.end_col - self.start_col + 1
        } else {
            1
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Program text plus the byte range of every line, for diagnostics.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    lines: Vec<Range<usize>>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut lines = Vec::new();
        let mut begin = 0;
        for (at, _) in source.match_indices('\n') {
            lines.push(begin..at);
            begin = at + 1;
        }
        lines.push(begin..source.len());
        Self {
            name: name.into(),
            source,
            lines,
        }
    }

    /// Text of a 1-based line without its terminator, or `None` when out of range.
    pub fn line(&self, number: u32) -> Option<&str> {
        let range = self.lines.get(number.checked_sub(1)? as usize)?;
        self.source
            .get(range.clone())
            .map(|text| text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
