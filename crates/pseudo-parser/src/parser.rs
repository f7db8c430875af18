//! The `Parser` type and the cursor it walks the token stream with.
//!
//! Statement, declaration and expression rules live in sibling modules as
//! further `impl Parser` blocks.

use pseudo_lexer::token::{Token, TokenKind};
use pseudo_types::ast::{Ident, PrimitiveType, Program, TypeName};
use pseudo_types::{SourceFile, Span, SyntaxError, SyntaxErrors};

/// Recursive-descent parser over the lexer's token stream.
///
/// Errors are collected and the parser resynchronises at the next line, so
/// one pass reports as many problems as it can find.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: SyntaxErrors,
}

/// What [`Parser::parse`] hands back.
pub struct ParseResult {
    /// The (possibly partial) program. Only run it when `errors` is empty.
    pub program: Option<Program>,
    pub errors: SyntaxErrors,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: SyntaxErrors::empty(),
        }
    }

    // ── Cursor ───────────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        self.peek().map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Step past the current token, returning where it was.
    pub(crate) fn advance(&mut self) -> Span {
        let span = self.current_span();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        span
    }

    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_else(|| Span::point(1, 1))
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_else(|| Span::point(1, 1))
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consume the current token only when it is `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        let found = self.check(kind);
        if found {
            self.advance();
        }
        found
    }

    /// The kind `n` tokens past the cursor, `Eof` beyond the end.
    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    /// `true` when a `:` appears before the end of the current line.
    pub(crate) fn line_has_colon(&self) -> bool {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .take_while(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Eof))
            .any(|t| t.kind == TokenKind::Colon)
    }

    // ── Line structure ───────────────────────────────────────────────────────

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    /// Expect the end of a statement: a newline or end of file.
    pub(crate) fn expect_line_end(&mut self) -> Option<()> {
        match self.peek_kind() {
            TokenKind::Eof => Some(()),
            TokenKind::Newline => {
                self.advance();
                Some(())
            }
            other => {
                let message = format!("expected newline, got '{other}'");
                self.error_at_current(message);
                None
            }
        }
    }

    // ── Required tokens ──────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Span> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.expected(&format!("'{expected}'"));
            None
        }
    }

    /// Record `expected {what}, got '{current}'`.
    pub(crate) fn expected(&mut self, what: &str) {
        let message = format!("expected {what}, got '{}'", self.peek_kind());
        self.error_at_current(message);
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Some(Ident::new(name, span))
            }
            _ => {
                self.expected("identifier");
                None
            }
        }
    }

    /// A primitive type keyword or a user type name.
    pub(crate) fn expect_type_name(&mut self) -> Option<TypeName> {
        match self.peek_kind().clone() {
            TokenKind::DataType(p) => {
                let span = self.advance();
                Some(TypeName::Primitive(p, span))
            }
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Some(TypeName::Named(Ident::new(name, span)))
            }
            _ => {
                self.expected("data type");
                None
            }
        }
    }

    pub(crate) fn peek_data_type(&self) -> Option<PrimitiveType> {
        match self.peek_kind() {
            TokenKind::DataType(p) => Some(*p),
            _ => None,
        }
    }

    // ── Diagnostics ──────────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(message, span);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: Span) {
        self.errors.push(SyntaxError::at(self.source_file, message, span));
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_full()
    }

    /// Recover from an error by dropping the rest of the line.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.eat(&TokenKind::Newline) {
                return;
            }
            self.advance();
        }
    }

    /// Consume the parser, producing the program and every error found.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        ParseResult {
            program: Some(program),
            errors: self.errors,
        }
    }
}
