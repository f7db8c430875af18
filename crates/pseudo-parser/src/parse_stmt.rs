//! Statement parsing: blocks, control flow, I/O and assignment.

use crate::parser::Parser;
use pseudo_lexer::token::TokenKind;
use pseudo_types::ast::*;

/// Where a block is being parsed; decides what ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockContext {
    Main,
    /// A CASE arm body, which also ends at the next `label:` line.
    CaseArm,
    Nested,
}

impl<'src> Parser<'src> {
    pub(crate) fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut stmts = Vec::new();
        loop {
            let block = self.parse_block(BlockContext::Main);
            stmts.extend(block.stmts);
            if self.at_end() || self.too_many_errors() {
                break;
            }
            // A stray terminator such as ENDIF at top level.
            let message = format!("unexpected '{}'", self.peek_kind());
            self.error_at_current(message);
            self.synchronize();
        }
        let span = start.merge(self.previous_span());
        Program {
            body: Block::new(stmts, span),
            span,
        }
    }

    fn at_block_end(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Eof
                | TokenKind::EndIf
                | TokenKind::Otherwise
                | TokenKind::EndCase
                | TokenKind::Else
                | TokenKind::EndWhile
                | TokenKind::Until
                | TokenKind::Next
                | TokenKind::EndProcedure
                | TokenKind::EndFunction
                | TokenKind::EndType
        )
    }

    /// Parse statements until a block terminator.
    pub(crate) fn parse_block(&mut self, context: BlockContext) -> Block {
        let start = self.current_span();
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if self.at_block_end() || self.too_many_errors() {
                break;
            }
            if context == BlockContext::CaseArm
                && !self.check(&TokenKind::Declare)
                && self.line_has_colon()
            {
                break;
            }

            if context != BlockContext::Main {
                match self.peek_kind() {
                    TokenKind::Procedure => self.error_at_current(
                        "Procedures can only be defined in the global scope",
                    ),
                    TokenKind::Function => self
                        .error_at_current("Functions can only be defined in the global scope"),
                    _ => {}
                }
            }

            match self.parse_statement() {
                Some(stmt) => {
                    stmts.push(stmt);
                    if self.expect_line_end().is_none() {
                        self.synchronize();
                    }
                }
                None => self.synchronize(),
            }
        }
        let span = if stmts.is_empty() {
            start
        } else {
            start.merge(self.previous_span())
        };
        Block::new(stmts, span)
    }

    /// Parse a single statement, leaving the cursor on its line end.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Declare => self.parse_declare(),
            TokenKind::Constant => self.parse_constant(),
            TokenKind::Type => self.parse_type_def(),
            TokenKind::Procedure | TokenKind::Function => self.parse_routine(),
            TokenKind::If => self.parse_if(),
            TokenKind::Case => self.parse_case(),
            TokenKind::While => self.parse_while(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::For => self.parse_for(),
            TokenKind::Call => self.parse_call_stmt(),
            TokenKind::Return => {
                let start = self.advance();
                let value = self.parse_expression()?;
                let span = start.merge(value.span);
                Some(Stmt::new(StmtKind::Return(value), span))
            }
            TokenKind::Break => {
                let span = self.advance();
                Some(Stmt::new(StmtKind::Break, span))
            }
            TokenKind::Continue => {
                let span = self.advance();
                Some(Stmt::new(StmtKind::Continue, span))
            }
            TokenKind::Output | TokenKind::Print => self.parse_output(),
            TokenKind::Input | TokenKind::Read => {
                let start = self.advance();
                if !matches!(self.peek_kind(), TokenKind::Identifier(_)) {
                    self.expected("variable");
                    return None;
                }
                let target = self.parse_access_path()?;
                let span = start.merge(target.span);
                Some(Stmt::new(StmtKind::Input(target), span))
            }
            TokenKind::OpenFile => self.parse_open_file(),
            TokenKind::ReadFile => self.parse_read_file(),
            TokenKind::WriteFile => self.parse_write_file(),
            TokenKind::CloseFile => {
                let start = self.advance();
                let file = self.parse_expression()?;
                let span = start.merge(file.span);
                Some(Stmt::new(StmtKind::CloseFile(file), span))
            }
            _ => self.parse_simple_statement(),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Assignment & Expression Statements
    // ══════════════════════════════════════════════════════════════════════════

    /// `path <- expr`, `path <- ^path`, or a bare expression.
    fn parse_simple_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression()?;
        if !self.check(&TokenKind::Assign) {
            let span = expr.span;
            return Some(Stmt::new(StmtKind::Expr(expr), span));
        }

        let Some(target) = expr.as_access().cloned() else {
            self.error_at("invalid assignment target", expr.span);
            return None;
        };
        self.advance(); // `<-`

        if self.eat(&TokenKind::Caret) {
            let source = self.parse_access_path()?;
            let span = target.span.merge(source.span);
            return Some(Stmt::new(StmtKind::PointerAssign { target, source }, span));
        }

        let value = self.parse_expression()?;
        let span = target.span.merge(value.span);
        Some(Stmt::new(StmtKind::Assign { target, value }, span))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Selection
    // ══════════════════════════════════════════════════════════════════════════

    /// `IF c THEN ... {ELSE IF c THEN ...} [ELSE ...] ENDIF`
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let mut branches = vec![self.parse_cond_branch()?];
        let mut otherwise = None;

        while self.eat(&TokenKind::Else) {
            if self.eat(&TokenKind::If) {
                branches.push(self.parse_cond_branch()?);
            } else {
                otherwise = Some(self.parse_block(BlockContext::Nested));
                break;
            }
        }

        let end = self.expect(&TokenKind::EndIf)?;
        Some(Stmt::new(
            StmtKind::If {
                branches,
                otherwise,
            },
            start.merge(end),
        ))
    }

    fn parse_cond_branch(&mut self) -> Option<CondBranch> {
        let cond = self.parse_expression()?;
        self.skip_newlines();
        self.expect(&TokenKind::Then)?;
        let body = self.parse_block(BlockContext::Nested);
        Some(CondBranch { cond, body })
    }

    /// `CASE OF name` + arms + `ENDCASE`
    fn parse_case(&mut self) -> Option<Stmt> {
        let start = self.advance();
        self.expect(&TokenKind::Of)?;
        let subject = self.expect_identifier()?;
        self.skip_newlines();

        let mut arms = Vec::new();
        while !self.check(&TokenKind::EndCase) {
            if self.at_end() || self.too_many_errors() {
                self.expected("'ENDCASE'");
                return None;
            }
            let arm_start = self.current_span();

            if self.eat(&TokenKind::Otherwise) {
                self.expect(&TokenKind::Colon)?;
                let body = self.parse_block(BlockContext::CaseArm);
                arms.push(CaseArm {
                    pattern: CasePattern::Otherwise,
                    span: arm_start.merge(self.previous_span()),
                    body,
                });
                if !self.check(&TokenKind::EndCase) {
                    self.expected("'ENDCASE'");
                    return None;
                }
                break;
            }

            let first = self.parse_expression()?;
            let pattern = if self.eat(&TokenKind::To) {
                let upper = self.parse_expression()?;
                CasePattern::Range {
                    lower: first,
                    upper,
                }
            } else {
                CasePattern::Value(first)
            };
            self.expect(&TokenKind::Colon)?;
            let body = self.parse_block(BlockContext::CaseArm);
            arms.push(CaseArm {
                pattern,
                span: arm_start.merge(self.previous_span()),
                body,
            });
        }

        let end = self.advance(); // ENDCASE
        Some(Stmt::new(StmtKind::Case { subject, arms }, start.merge(end)))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Loops
    // ══════════════════════════════════════════════════════════════════════════

    /// `WHILE c [DO] ... ENDWHILE`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let cond = self.parse_expression()?;
        self.skip_newlines();
        self.eat(&TokenKind::Do);
        let body = self.parse_block(BlockContext::Nested);
        let end = self.expect(&TokenKind::EndWhile)?;
        Some(Stmt::new(StmtKind::While { cond, body }, start.merge(end)))
    }

    /// `REPEAT ... UNTIL c`
    fn parse_repeat(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let body = self.parse_block(BlockContext::Nested);
        self.expect(&TokenKind::Until)?;
        let cond = self.parse_expression()?;
        let span = start.merge(cond.span);
        Some(Stmt::new(StmtKind::Repeat { body, cond }, span))
    }

    /// `FOR i <- a TO b [STEP s] ... NEXT [i]`
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let var = self.expect_identifier()?;
        self.expect(&TokenKind::Assign)?;
        let from = self.parse_expression()?;
        self.expect(&TokenKind::To)?;
        let stop = self.parse_expression()?;
        let step = if self.eat(&TokenKind::Step) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let body = self.parse_block(BlockContext::Nested);
        let mut end = self.expect(&TokenKind::Next)?;

        if let TokenKind::Identifier(name) = self.peek_kind() {
            if *name != var.name {
                self.expected(&format!("'{}'", var.name));
                return None;
            }
            end = self.advance();
        }

        Some(Stmt::new(
            StmtKind::For {
                var,
                start: from,
                stop,
                step,
                body,
            },
            start.merge(end),
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Calls & I/O
    // ══════════════════════════════════════════════════════════════════════════

    /// `CALL name[(args)]`
    fn parse_call_stmt(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let name = self.expect_identifier()?;
        let args = if self.check(&TokenKind::LParen) {
            self.parse_call_args()?
        } else {
            Vec::new()
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Call { name, args }, span))
    }

    /// `OUTPUT a, b, ...`
    fn parse_output(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let mut values = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            values.push(self.parse_expression()?);
        }
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Output(values), span))
    }

    /// `OPENFILE name FOR READ|WRITE|APPEND`
    fn parse_open_file(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let file = self.parse_expression()?;
        self.expect(&TokenKind::For)?;
        let mode = match self.peek_kind() {
            TokenKind::Read => FileMode::Read,
            TokenKind::Write => FileMode::Write,
            TokenKind::Append => FileMode::Append,
            _ => {
                self.expected("READ, WRITE or APPEND");
                return None;
            }
        };
        let end = self.advance();
        Some(Stmt::new(StmtKind::OpenFile { file, mode }, start.merge(end)))
    }

    /// `READFILE name, variable`
    fn parse_read_file(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let file = self.parse_expression()?;
        self.expect(&TokenKind::Comma)?;
        if !matches!(self.peek_kind(), TokenKind::Identifier(_)) {
            self.expected("variable");
            return None;
        }
        let target = self.expect_identifier()?;
        let span = start.merge(target.span);
        Some(Stmt::new(StmtKind::ReadFile { file, target }, span))
    }

    /// `WRITEFILE name, value`
    fn parse_write_file(&mut self) -> Option<Stmt> {
        let start = self.advance();
        let file = self.parse_expression()?;
        self.expect(&TokenKind::Comma)?;
        let value = self.parse_expression()?;
        let span = start.merge(value.span);
        Some(Stmt::new(StmtKind::WriteFile { file, value }, span))
    }
}
