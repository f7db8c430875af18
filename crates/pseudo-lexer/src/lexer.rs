//! Hand-written lexer for the pseudocode language.
//!
//! Features:
//! - Upper-case keywords, with the six type keywords folded into one kind
//! - Integer, real, char, string and `dd/mm/yyyy` date literals
//! - `//` line comments stripped
//! - Newlines kept as statement terminators
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use pseudo_types::{SourceFile, Span, SyntaxError, SyntaxErrors};

use crate::token::{Token, TokenKind};

/// Scans a [`SourceFile`] into a vector of [`Token`]s.
pub struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    source_file: &'src SourceFile,
    /// Current byte offset.
    pos: usize,
    line: u32,
    col: u32,
    errors: SyntaxErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// Always ends with [`TokenKind::Eof`].
    pub tokens: Vec<Token>,
    pub errors: SyntaxErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: &source_file.source,
            bytes: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: SyntaxErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        while !self.errors.is_full() {
            let Some(token) = self.next_token() else {
                continue;
            };
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Consume one whole character, keeping line/column in step.
    fn advance(&mut self) -> Option<char> {
        let ch = self.source[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(start_line, start_col, self.line, self.col.saturating_sub(1).max(1))
    }

    fn emit_error(&mut self, message: impl Into<String>, span: Span) {
        let err = SyntaxError::at(self.source_file, message, span);
        self.errors.push(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip spaces, tabs, carriage returns and `//` comments (not newlines).
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan one token. `None` means an error was recorded and nothing emitted.
    fn next_token(&mut self) -> Option<Token> {
        self.skip_trivia();

        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Some(Token::new(TokenKind::Eof, self.current_span()));
        };

        let kind = match ch {
            '\n' => TokenKind::Newline,
            '"' => return self.scan_string(start_line, start_col),
            '\'' => return self.scan_char(start_line, start_col),
            '0'..='9' => return self.scan_number(start, start_line, start_col),
            c if c.is_ascii_alphabetic() || c == '_' => {
                return Some(self.scan_word(start, start_line, start_col))
            }

            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '&' => TokenKind::Ampersand,
            '=' => TokenKind::Eq,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,

            '<' => match self.peek() {
                Some(b'-') => {
                    self.advance();
                    TokenKind::Assign
                }
                Some(b'=') => {
                    self.advance();
                    TokenKind::LessEq
                }
                Some(b'>') => {
                    self.advance();
                    TokenKind::NotEq
                }
                _ => TokenKind::Less,
            },
            '>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }

            other => {
                let span = self.span_from(start_line, start_col);
                self.emit_error(format!("Unexpected character '{other}'"), span);
                return None;
            }
        };

        Some(Token::new(kind, self.span_from(start_line, start_col)))
    }

    fn scan_word(&mut self, start: usize, start_line: u32, start_col: u32) -> Token {
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        let kind = TokenKind::from_keyword(text)
            .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, self.span_from(start_line, start_col))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Integers, reals and `dd/mm/yyyy` dates.
    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> Option<Token> {
        self.skip_digits();

        if self.peek() == Some(b'/') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            if let Some(token) = self.try_scan_date(start, start_line, start_col) {
                return Some(token);
            }
        }

        let mut is_real = false;
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            is_real = true;
            self.advance();
            self.skip_digits();
        }

        let text = &self.source[start..self.pos];
        let span = self.span_from(start_line, start_col);
        let kind = if is_real {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::RealLit(n),
                Err(_) => {
                    self.emit_error(format!("Invalid real literal '{text}'"), span);
                    return None;
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::IntegerLit(n),
                Err(_) => {
                    self.emit_error(format!("Integer literal '{text}' is out of range"), span);
                    return None;
                }
            }
        };
        Some(Token::new(kind, span))
    }

    /// Having read `dd`, try to continue with `/mm/yyyy`.
    ///
    /// Restores the cursor when the shape does not match so `6/3` still
    /// lexes as a division.
    fn try_scan_date(&mut self, start: usize, start_line: u32, start_col: u32) -> Option<Token> {
        let source = self.source;
        let saved = (self.pos, self.line, self.col);
        let day_text = &source[start..self.pos];

        self.advance(); // '/'
        let month_start = self.pos;
        self.skip_digits();
        let month_text = &source[month_start..self.pos];

        if self.peek() != Some(b'/') || !self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            (self.pos, self.line, self.col) = saved;
            return None;
        }
        self.advance(); // '/'
        let year_start = self.pos;
        self.skip_digits();
        let year_text = &source[year_start..self.pos];

        let span = self.span_from(start_line, start_col);
        match (day_text.parse(), month_text.parse(), year_text.parse()) {
            (Ok(day), Ok(month), Ok(year)) => {
                Some(Token::new(TokenKind::DateLit { day, month, year }, span))
            }
            _ => {
                self.emit_error("Invalid date literal", span);
                Some(Token::new(TokenKind::DateLit { day: 0, month: 0, year: 0 }, span))
            }
        }
    }

    fn scan_string(&mut self, start_line: u32, start_col: u32) -> Option<Token> {
        let content_start = self.pos;
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error("Unterminated string literal", span);
                    return None;
                }
                Some(b'"') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }
        let text = self.source[content_start..self.pos].to_string();
        self.advance(); // closing quote
        Some(Token::new(
            TokenKind::StringLit(text),
            self.span_from(start_line, start_col),
        ))
    }

    fn scan_char(&mut self, start_line: u32, start_col: u32) -> Option<Token> {
        let value = match self.peek() {
            None | Some(b'\n') => None,
            Some(_) => self.advance(),
        };
        if self.peek() != Some(b'\'') {
            // Skip to the closing quote on this line so one bad literal
            // produces one error.
            while self.peek().is_some_and(|b| b != b'\'' && b != b'\n') {
                self.advance();
            }
            if self.peek() == Some(b'\'') {
                self.advance();
            }
            let span = self.span_from(start_line, start_col);
            self.emit_error("Character literal must contain exactly one character", span);
            return None;
        }
        self.advance();
        let span = self.span_from(start_line, start_col);
        match value {
            Some(c) if c != '\'' => Some(Token::new(TokenKind::CharLit(c), span)),
            _ => {
                self.emit_error("Character literal must contain exactly one character", span);
                None
            }
        }
    }
}
