//! Expressions, from `AND`/`OR` down to primaries and postfix access.
//!
//! Binding levels, loosest first:
//! 7. `AND`, `OR` (same level, left-associative)
//! 6. `NOT`
//! 5. `=`, `<>`, `<`, `>`, `<=`, `>=` (no chaining)
//! 4. `&`
//! 3. `+`, `-`
//! 2. `*`, `/`, `MOD`, `DIV`
//! 1. unary `-`
//!
//! Atoms are literals, parenthesised expressions, casts (`INTEGER(x)`),
//! calls (`f(x)`, `MOD(a, b)`) and access paths (`p^.items[i]`).

use pseudo_lexer::token::TokenKind;
use pseudo_types::ast::*;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_logical()
    }

    fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            span,
        )
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `Logical = NotExpr { ("AND" | "OR") NotExpr }`
    fn parse_logical(&mut self) -> Option<Expr> {
        let mut left = self.parse_not()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::And => BinOp::And,
                TokenKind::Or => BinOp::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_not()?;
            left = Self::binary(left, op, right);
        }
        Some(left)
    }

    /// `NotExpr = "NOT" NotExpr | Comparison`
    fn parse_not(&mut self) -> Option<Expr> {
        if self.check(&TokenKind::Not) {
            let start = self.advance();
            let operand = self.parse_not()?;
            let span = start.merge(operand.span);
            return Some(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    /// `Comparison = Concat [ CompOp Concat ]`
    fn parse_comparison(&mut self) -> Option<Expr> {
        let left = self.parse_concat()?;
        let Some(op) = self.match_comparison_op() else {
            return Some(left);
        };
        self.advance();
        let right = self.parse_concat()?;
        if self.match_comparison_op().is_some() {
            self.error_at_current(
                "comparison operators cannot be chained; combine them with AND",
            );
            return None;
        }
        Some(Self::binary(left, op, right))
    }

    fn match_comparison_op(&self) -> Option<BinOp> {
        match self.peek_kind() {
            TokenKind::Eq => Some(BinOp::Eq),
            TokenKind::NotEq => Some(BinOp::NotEq),
            TokenKind::Less => Some(BinOp::Less),
            TokenKind::Greater => Some(BinOp::Greater),
            TokenKind::LessEq => Some(BinOp::LessEq),
            TokenKind::GreaterEq => Some(BinOp::GreaterEq),
            _ => None,
        }
    }

    /// `Concat = Additive { "&" Additive }`
    fn parse_concat(&mut self) -> Option<Expr> {
        let mut left = self.parse_additive()?;
        while self.eat(&TokenKind::Ampersand) {
            let right = self.parse_additive()?;
            left = Self::binary(left, BinOp::Concat, right);
        }
        Some(left)
    }

    /// `Additive = Term { ("+" | "-") Term }`
    fn parse_additive(&mut self) -> Option<Expr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Self::binary(left, op, right);
        }
        Some(left)
    }

    /// `Term = Unary { ("*" | "/" | "MOD" | "DIV") Unary }`
    fn parse_term(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Mod => BinOp::Mod,
                TokenKind::Div => BinOp::IntDiv,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(left, op, right);
        }
        Some(left)
    }

    /// `Unary = "-" Unary | Atom`
    fn parse_unary(&mut self) -> Option<Expr> {
        if self.check(&TokenKind::Minus) {
            let start = self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.span);
            return Some(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_atom()
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Atoms
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_atom(&mut self) -> Option<Expr> {
        let span = self.current_span();
        let literal = match self.peek_kind().clone() {
            TokenKind::IntegerLit(n) => Some(ExprKind::IntegerLit(n)),
            TokenKind::RealLit(n) => Some(ExprKind::RealLit(n)),
            TokenKind::CharLit(c) => Some(ExprKind::CharLit(c)),
            TokenKind::StringLit(s) => Some(ExprKind::StringLit(s)),
            TokenKind::DateLit { day, month, year } => {
                Some(ExprKind::DateLit { day, month, year })
            }
            TokenKind::True => Some(ExprKind::BoolLit(true)),
            TokenKind::False => Some(ExprKind::BoolLit(false)),
            _ => None,
        };
        if let Some(kind) = literal {
            self.advance();
            return Some(Expr::new(kind, span));
        }

        match self.peek_kind() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                let end = self.expect(&TokenKind::RParen)?;
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span.merge(end)))
            }
            TokenKind::DataType(_) => self.parse_cast(),
            TokenKind::Mod | TokenKind::Div => self.parse_mod_div_call(),
            TokenKind::Identifier(_) => {
                if self.look_ahead(1) == &TokenKind::LParen {
                    self.parse_function_call()
                } else {
                    let path = self.parse_access_path()?;
                    let span = path.span;
                    Some(Expr::new(ExprKind::Access(path), span))
                }
            }
            _ => {
                self.expected("expression");
                None
            }
        }
    }

    /// `INTEGER(expr)`
    fn parse_cast(&mut self) -> Option<Expr> {
        let target = self.peek_data_type()?;
        let start = self.advance();
        if !self.check(&TokenKind::LParen) {
            self.expected("'(' after type name");
            return None;
        }
        self.advance();
        let operand = self.parse_expression()?;
        let end = self.expect(&TokenKind::RParen)?;
        Some(Expr::new(
            ExprKind::Cast {
                target,
                operand: Box::new(operand),
            },
            start.merge(end),
        ))
    }

    /// `MOD(a, b)` / `DIV(a, b)`
    fn parse_mod_div_call(&mut self) -> Option<Expr> {
        let op = if self.check(&TokenKind::Mod) {
            BinOp::Mod
        } else {
            BinOp::IntDiv
        };
        let start = self.advance();
        self.expect(&TokenKind::LParen)?;
        let left = self.parse_expression()?;
        self.expect(&TokenKind::Comma)?;
        let right = self.parse_expression()?;
        let end = self.expect(&TokenKind::RParen)?;
        Some(Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
            start.merge(end),
        ))
    }

    fn parse_function_call(&mut self) -> Option<Expr> {
        let name = self.expect_identifier()?;
        let args = self.parse_call_args()?;
        let span = name.span.merge(self.previous_span());
        Some(Expr::new(ExprKind::Call { name, args }, span))
    }

    /// `( [expr {, expr}] )`
    pub(crate) fn parse_call_args(&mut self) -> Option<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Some(args);
        }
        args.push(self.parse_expression()?);
        while self.eat(&TokenKind::Comma) {
            args.push(self.parse_expression()?);
        }
        self.expect(&TokenKind::RParen)?;
        Some(args)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Access Paths
    // ══════════════════════════════════════════════════════════════════════════

    /// `name { "^" | "." member | "[" expr {, expr} "]" }`
    pub(crate) fn parse_access_path(&mut self) -> Option<AccessPath> {
        let mut path = AccessPath::name(self.expect_identifier()?);
        loop {
            let kind = match self.peek_kind() {
                TokenKind::Caret => {
                    self.advance();
                    AccessKind::Deref(Box::new(path))
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self.expect_identifier()?;
                    AccessKind::Member {
                        base: Box::new(path),
                        member,
                    }
                }
                TokenKind::LBracket => {
                    self.advance();
                    let mut indices = vec![self.parse_expression()?];
                    while self.eat(&TokenKind::Comma) {
                        indices.push(self.parse_expression()?);
                    }
                    self.expect(&TokenKind::RBracket)?;
                    AccessKind::Index {
                        base: Box::new(path),
                        indices,
                    }
                }
                _ => return Some(path),
            };
            let span = match &kind {
                AccessKind::Deref(base)
                | AccessKind::Member { base, .. }
                | AccessKind::Index { base, .. } => base.span.merge(self.previous_span()),
                AccessKind::Name(ident) => ident.span,
            };
            path = AccessPath { kind, span };
        }
    }
}
