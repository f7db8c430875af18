//! Declaration parsing: variables, arrays, constants, user types and routines.

use std::rc::Rc;

use crate::parser::Parser;
use pseudo_lexer::token::TokenKind;
use pseudo_types::ast::*;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Variables & Constants
    // ══════════════════════════════════════════════════════════════════════════

    /// `DECLARE a, b : T` or `DECLARE a : ARRAY[l:u, ...] OF T`
    pub(crate) fn parse_declare(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let mut names = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Comma) {
            names.push(self.expect_identifier()?);
        }
        self.expect(&TokenKind::Colon)?;

        if self.eat(&TokenKind::Array) {
            self.expect(&TokenKind::LBracket)?;
            let mut dims = Vec::new();
            loop {
                let lower = self.parse_expression()?;
                self.expect(&TokenKind::Colon)?;
                let upper = self.parse_expression()?;
                dims.push(DimBounds { lower, upper });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RBracket)?;
            self.expect(&TokenKind::Of)?;
            let elem = self.expect_type_name()?;
            let span = start.merge(elem.span());
            return Some(Stmt::new(StmtKind::ArrayDeclare { names, dims, elem }, span));
        }

        let ty = self.expect_type_name()?;
        let span = start.merge(ty.span());
        Some(Stmt::new(StmtKind::Declare { names, ty }, span))
    }

    /// `CONSTANT name = expr` (`<-` also accepted)
    pub(crate) fn parse_constant(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let name = self.expect_identifier()?;
        if !self.eat(&TokenKind::Eq) && !self.eat(&TokenKind::Assign) {
            self.expected("'='");
            return None;
        }
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Some(Stmt::new(StmtKind::Constant { name, value }, span))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // User Types
    // ══════════════════════════════════════════════════════════════════════════

    /// `TYPE P = ^T`, `TYPE E = (A, B)`, or a `TYPE R ... ENDTYPE` record.
    pub(crate) fn parse_type_def(&mut self) -> Option<Stmt> {
        let start = self.advance();
        self.skip_newlines();
        let name = self.expect_identifier()?;

        if !self.eat(&TokenKind::Eq) {
            if !self.check(&TokenKind::Newline) {
                self.error_at_current("Expected definition for type");
                return None;
            }
            return self.parse_composite(start, name);
        }

        let body = if self.eat(&TokenKind::Caret) {
            TypeDefBody::Pointer(self.expect_type_name()?)
        } else if self.eat(&TokenKind::LParen) {
            let mut values = vec![self.expect_identifier()?];
            while self.eat(&TokenKind::Comma) {
                values.push(self.expect_identifier()?);
            }
            self.expect(&TokenKind::RParen)?;
            TypeDefBody::Enum(values)
        } else {
            self.error_at_current("Expected definition for type");
            return None;
        };

        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::TypeDef(TypeDef { name, body }), span))
    }

    /// Record body: one DECLARE per line up to `ENDTYPE`.
    fn parse_composite(&mut self, start: pseudo_types::Span, name: Ident) -> Option<Stmt> {
        let body_start = self.current_span();
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if !self.check(&TokenKind::Declare) {
                break;
            }
            stmts.push(self.parse_declare()?);
            self.expect_line_end()?;
        }
        let end = self.expect(&TokenKind::EndType)?;
        let body = Block::new(stmts, body_start.merge(self.previous_span()));
        Some(Stmt::new(
            StmtKind::TypeDef(TypeDef {
                name,
                body: TypeDefBody::Composite(Rc::new(body)),
            }),
            start.merge(end),
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Procedures & Functions
    // ══════════════════════════════════════════════════════════════════════════

    /// `PROCEDURE name[(params)] ... ENDPROCEDURE` or
    /// `FUNCTION name[(params)] RETURNS T ... ENDFUNCTION`
    pub(crate) fn parse_routine(&mut self) -> Option<Stmt> {
        let is_function = self.check(&TokenKind::Function);
        let start = self.advance();
        let name = self.expect_identifier()?;
        let params = if self.eat(&TokenKind::LParen) {
            self.parse_params()?
        } else {
            Vec::new()
        };

        let returns = if is_function {
            self.skip_newlines();
            self.expect(&TokenKind::Returns)?;
            Some(self.expect_type_name()?)
        } else {
            None
        };

        let body = self.parse_block(crate::parse_stmt::BlockContext::Nested);
        let terminator = if is_function {
            TokenKind::EndFunction
        } else {
            TokenKind::EndProcedure
        };
        let end = self.expect(&terminator)?;

        let decl = Rc::new(RoutineDecl {
            name,
            params,
            returns,
            body,
            span: start.merge(end),
        });
        let kind = if is_function {
            StmtKind::Function(decl)
        } else {
            StmtKind::Procedure(decl)
        };
        Some(Stmt::new(kind, start.merge(end)))
    }

    /// Parameter list after `(`, through the closing `)`.
    ///
    /// `BYREF`/`BYVAL` apply to the parameter they precede and every later
    /// one until the mode changes again; `a, b : T` shares one type.
    fn parse_params(&mut self) -> Option<Vec<ParamDecl>> {
        let mut params = Vec::new();
        let mut by_ref = false;
        let mut untyped: Vec<(Ident, bool)> = Vec::new();

        while !self.check(&TokenKind::RParen) {
            if !params.is_empty() || !untyped.is_empty() {
                self.expect(&TokenKind::Comma)?;
            }
            if self.eat(&TokenKind::ByRef) {
                by_ref = true;
            } else if self.eat(&TokenKind::ByVal) {
                by_ref = false;
            }

            if !matches!(self.peek_kind(), TokenKind::Identifier(_)) {
                self.expected("identifier or ')'");
                return None;
            }
            let name = self.expect_identifier()?;
            untyped.push((name, by_ref));

            if self.eat(&TokenKind::Colon) {
                let ty = self.expect_type_name()?;
                params.extend(untyped.drain(..).map(|(name, by_ref)| ParamDecl {
                    name,
                    ty: ty.clone(),
                    by_ref,
                }));
            } else if !self.check(&TokenKind::Comma) {
                self.expected("':'");
                return None;
            }
        }

        if !untyped.is_empty() {
            self.expected("data type");
            return None;
        }
        self.advance(); // `)`
        Some(params)
    }
}
