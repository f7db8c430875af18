//! Statement execution and control flow.

use pseudo_types::ast::{AccessPath, Block, CaseArm, CasePattern, CondBranch, Expr, Ident, Stmt, StmtKind};
use pseudo_types::Span;

use crate::error::{ErrorKind, EvalResult};
use crate::scope::{LookupMode, Place, ScopeId, ScopeKind, Variable};
use crate::value::{DataType, PointerValue, Value};

use super::operators::values_equal;
use super::resolve::ArrayRef;
use super::{ControlFlow, Interpreter, Target};

impl Interpreter {
    pub(crate) fn exec_block(&mut self, scope: ScopeId, block: &Block) -> EvalResult<ControlFlow> {
        for stmt in &block.stmts {
            let flow = self.exec_stmt(scope, stmt)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    pub(crate) fn exec_stmt(&mut self, scope: ScopeId, stmt: &Stmt) -> EvalResult<ControlFlow> {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Declare { names, ty } => self.exec_declare(scope, names, ty)?,
            StmtKind::ArrayDeclare { names, dims, elem } => {
                self.exec_array_declare(scope, names, dims, elem)?
            }
            StmtKind::Constant { name, value } => self.exec_constant(scope, name, value)?,
            StmtKind::TypeDef(def) => self.exec_type_def(scope, def)?,
            StmtKind::Procedure(decl) | StmtKind::Function(decl) => self.define_routine(scope, decl)?,

            StmtKind::Assign { target, value } => self.exec_assign(scope, target, value, span)?,
            StmtKind::PointerAssign { target, source } => {
                self.exec_pointer_assign(scope, target, source, span)?
            }

            StmtKind::If { branches, otherwise } => {
                return self.exec_if(scope, branches, otherwise.as_ref())
            }
            StmtKind::Case { subject, arms } => return self.exec_case(scope, subject, arms),
            StmtKind::While { cond, body } => return self.exec_while(scope, cond, body),
            StmtKind::Repeat { body, cond } => return self.exec_repeat(scope, body, cond),
            StmtKind::For {
                var,
                start,
                stop,
                step,
                body,
            } => return self.exec_for(scope, var, start, stop, step.as_ref(), body),

            StmtKind::Call { name, args } => self.call_procedure(scope, name, args, span)?,
            StmtKind::Return(expr) => return self.exec_return(scope, expr, span),
            StmtKind::Break => return Ok(ControlFlow::Break(span)),
            StmtKind::Continue => return Ok(ControlFlow::Continue(span)),

            StmtKind::Output(exprs) => self.exec_output(scope, exprs, span)?,
            StmtKind::Input(target) => self.exec_input(scope, target, span)?,
            StmtKind::OpenFile { file, mode } => self.exec_open_file(scope, file, *mode)?,
            StmtKind::ReadFile { file, target } => self.exec_read_file(scope, file, target)?,
            StmtKind::WriteFile { file, value } => self.exec_write_file(scope, file, value)?,
            StmtKind::CloseFile(file) => self.exec_close_file(scope, file)?,

            StmtKind::Expr(expr) => {
                let value = self.eval_expr(scope, expr)?;
                if self.options.echo_expressions && scope == self.root {
                    let text = self.echo(&value);
                    self.emit(scope, span, &text)?;
                }
            }
        }
        Ok(ControlFlow::Normal)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Assignment
    // ══════════════════════════════════════════════════════════════════════════

    fn exec_assign(&mut self, scope: ScopeId, target: &AccessPath, value: &Expr, span: Span) -> EvalResult<()> {
        let value = match self.eval_expr(scope, value) {
            Ok(v) => v,
            Err(e) if e.is_direct_array_access_in(scope) => {
                return match value.as_access() {
                    Some(source) => self.copy_array(scope, target, source, span, e),
                    None => Err(e),
                };
            }
            Err(e) => return Err(e),
        };

        match self.resolve(scope, target) {
            Ok(Target::Variable(place)) => self.store(scope, &place, value, span),
            Ok(Target::Array(_)) => Err(self.error(scope, target.span, ErrorKind::ArrayDirectAccess)),
            Err(e) if matches!(e.kind, ErrorKind::NotDefined(_)) => match target.as_name() {
                Some(name) if !self.is_type_name(scope, &name.name) => {
                    self.declare_implicit(scope, name, value)
                }
                _ => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// `a <- b` for two arrays of the same element type and shape.
    fn copy_array(
        &mut self,
        scope: ScopeId,
        target: &AccessPath,
        source: &AccessPath,
        span: Span,
        original: crate::error::RuntimeError,
    ) -> EvalResult<()> {
        let Target::Array(from) = self.resolve(scope, source)? else {
            return Err(original);
        };
        let Target::Array(to) = self.resolve(scope, target)? else {
            return Err(original);
        };
        if from.array.elem_type != to.array.elem_type {
            return Err(self.fail(scope, span, "Cannot assign arrays of different data type"));
        }
        if from.array.dims != to.array.dims {
            return Err(self.fail(scope, span, "Cannot assign arrays of different dimensions"));
        }
        let values = self.array_values(scope, &from, span)?;
        for (offset, value) in values.into_iter().enumerate() {
            if let Some(cell) = self.scopes.variable_mut(&to.element(offset)) {
                cell.storage = crate::scope::Storage::Owned(value);
            }
        }
        Ok(())
    }

    fn array_values(&self, scope: ScopeId, array: &ArrayRef, span: Span) -> EvalResult<Vec<Value>> {
        (0..array.array.len())
            .map(|offset| self.read(scope, &array.element(offset), span))
            .collect()
    }

    /// Write `value` into an existing cell, applying implicit coercion.
    pub(crate) fn store(&mut self, scope: ScopeId, place: &Place, value: Value, span: Span) -> EvalResult<()> {
        let (name, data_type, constant) = match self.scopes.variable(place) {
            Some(var) => (var.name.clone(), var.data_type.clone(), var.constant),
            None => return Err(self.fail(scope, span, "Attempting to access deleted object")),
        };
        if constant {
            return Err(self.error(scope, span, ErrorKind::ConstAssign(name)));
        }
        let value = value.coerce(&data_type).ok_or_else(|| {
            self.error(
                scope,
                span,
                ErrorKind::InvalidUsage("assignment operator: incompatible data types".into()),
            )
        })?;
        if let Some(var) = self.scopes.variable_mut(place) {
            var.storage = crate::scope::Storage::Owned(value);
        }
        Ok(())
    }

    /// First assignment to an unknown plain name declares it here.
    pub(crate) fn declare_implicit(&mut self, scope: ScopeId, name: &Ident, value: Value) -> EvalResult<()> {
        tracing::trace!(name = %name.name, ty = %value.data_type(), "implicit declaration");
        let data_type = value.data_type();
        self.frame_mut(scope, name.span)?
            .members
            .add_variable(Variable::new(&name.name, data_type, value));
        Ok(())
    }

    /// `target <- ^source`
    fn exec_pointer_assign(
        &mut self,
        scope: ScopeId,
        target: &AccessPath,
        source: &AccessPath,
        span: Span,
    ) -> EvalResult<()> {
        let target_place = match self.resolve(scope, target)? {
            Target::Variable(place) => place,
            Target::Array(_) => return Err(self.error(scope, target.span, ErrorKind::ArrayDirectAccess)),
        };
        let source_place = match self.resolve(scope, source)? {
            Target::Variable(place) => place,
            Target::Array(_) => return Err(self.fail(scope, source.span, "Cannot store pointer to array")),
        };

        let pointer_type = match self.scopes.variable(&target_place).map(|v| &v.data_type) {
            Some(DataType::Pointer(name)) => name.clone(),
            _ => {
                return Err(self.fail(
                    scope,
                    target.span,
                    "Cannot assign pointer to variable not of type pointer",
                ))
            }
        };
        let pointee = match self.find_type(scope, &pointer_type) {
            Some(crate::scope::TypeDef::Pointer { target, .. }) => target,
            _ => {
                return Err(self.error(
                    scope,
                    target.span,
                    ErrorKind::NotDefined(format!("Type '{pointer_type}'")),
                ))
            }
        };
        let source_type = self.scopes.variable(&source_place).map(|v| v.data_type.clone());
        if source_type.as_ref() != Some(&pointee) {
            return Err(self.fail(scope, span, "Assignment Error: Incompatible data types"));
        }

        let pointer = Value::Pointer(PointerValue {
            type_name: pointer_type,
            target: Some(source_place),
        });
        self.store(scope, &target_place, pointer, span)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Control Flow
    // ══════════════════════════════════════════════════════════════════════════

    fn condition(&mut self, scope: ScopeId, cond: &Expr) -> EvalResult<bool> {
        match self.eval_expr(scope, cond)? {
            Value::Boolean(b) => Ok(b),
            _ => Err(self.error(scope, cond.span, ErrorKind::ConditionType)),
        }
    }

    fn exec_if(
        &mut self,
        scope: ScopeId,
        branches: &[CondBranch],
        otherwise: Option<&Block>,
    ) -> EvalResult<ControlFlow> {
        for branch in branches {
            if self.condition(scope, &branch.cond)? {
                return self.exec_block(scope, &branch.body);
            }
        }
        match otherwise {
            Some(block) => self.exec_block(scope, block),
            None => Ok(ControlFlow::Normal),
        }
    }

    fn exec_case(&mut self, scope: ScopeId, subject: &Ident, arms: &[CaseArm]) -> EvalResult<ControlFlow> {
        let value = self.eval_access(scope, &AccessPath::name(subject.clone()))?;
        for arm in arms {
            let matched = match &arm.pattern {
                CasePattern::Otherwise => true,
                CasePattern::Value(expr) => {
                    let candidate = self.eval_expr(scope, expr)?;
                    case_matches(&value, candidate)
                }
                CasePattern::Range { lower, upper } => {
                    let low = self.eval_expr(scope, lower)?.as_f64().ok_or_else(|| {
                        self.fail(scope, lower.span, "Lower bound must be of type INTEGER or REAL")
                    })?;
                    let high = self.eval_expr(scope, upper)?.as_f64().ok_or_else(|| {
                        self.fail(scope, upper.span, "Upper bound must be of type INTEGER or REAL")
                    })?;
                    value.as_f64().is_some_and(|v| low <= v && v <= high)
                }
            };
            if matched {
                return self.exec_block(scope, &arm.body);
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_while(&mut self, scope: ScopeId, cond: &Expr, body: &Block) -> EvalResult<ControlFlow> {
        while self.condition(scope, cond)? {
            match self.exec_block(scope, body)? {
                ControlFlow::Break(_) => break,
                ControlFlow::Normal | ControlFlow::Continue(_) => {}
                flow @ ControlFlow::Return(_) => return Ok(flow),
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_repeat(&mut self, scope: ScopeId, body: &Block, cond: &Expr) -> EvalResult<ControlFlow> {
        loop {
            match self.exec_block(scope, body)? {
                ControlFlow::Break(_) => break,
                ControlFlow::Normal | ControlFlow::Continue(_) => {}
                flow @ ControlFlow::Return(_) => return Ok(flow),
            }
            if self.condition(scope, cond)? {
                break;
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_for(
        &mut self,
        scope: ScopeId,
        var: &Ident,
        start: &Expr,
        stop: &Expr,
        step: Option<&Expr>,
        body: &Block,
    ) -> EvalResult<ControlFlow> {
        let place = match self.scopes.find_variable(scope, &var.name, LookupMode::Global) {
            Some(place) => place,
            None => {
                self.declare_implicit(scope, var, Value::Integer(0))?;
                self.scopes
                    .find_variable(scope, &var.name, LookupMode::Local)
                    .ok_or_else(|| self.fail(scope, var.span, "Attempting to access deleted object"))?
            }
        };
        if self.scopes.variable(&place).map(|v| &v.data_type) != Some(&DataType::Integer) {
            return Err(self.fail(scope, var.span, "Iterator variable must be of type INTEGER"));
        }

        let start = self.loop_bound(scope, start, "Start")?;
        let stop = self.loop_bound(scope, stop, "Stop")?;
        let step = match step {
            Some(expr) => self.loop_bound(scope, expr, "Step")?,
            None => 1,
        };

        let mut current = start;
        loop {
            let done = if step >= 0 { current > stop } else { current < stop };
            if done {
                break;
            }
            self.store(scope, &place, Value::Integer(current), var.span)?;
            match self.exec_block(scope, body)? {
                ControlFlow::Break(_) => break,
                ControlFlow::Normal | ControlFlow::Continue(_) => {}
                flow @ ControlFlow::Return(_) => return Ok(flow),
            }
            match current.checked_add(step) {
                Some(next) => current = next,
                None => break,
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn loop_bound(&mut self, scope: ScopeId, expr: &Expr, which: &str) -> EvalResult<i64> {
        match self.eval_expr(scope, expr)? {
            Value::Integer(n) => Ok(n),
            _ => Err(self.fail(
                scope,
                expr.span,
                format!("{which} value of FOR loop iterator must be of type INTEGER"),
            )),
        }
    }

    fn exec_return(&mut self, scope: ScopeId, expr: &Expr, span: Span) -> EvalResult<ControlFlow> {
        let return_type = match &self.frame(scope, span)?.kind {
            ScopeKind::Function { return_type } => return_type.clone(),
            _ => {
                return Err(self.error(
                    scope,
                    span,
                    ErrorKind::InvalidUsage("RETURN statement".into()),
                ))
            }
        };
        let value = self.eval_expr(scope, expr)?;
        value
            .coerce(&return_type)
            .map(ControlFlow::Return)
            .ok_or_else(|| self.fail(scope, expr.span, "Invalid return type"))
    }
}

/// Equality between a CASE subject and an arm value.
fn case_matches(subject: &Value, candidate: Value) -> bool {
    if matches!(subject, Value::Composite(_)) {
        return false;
    }
    if subject.data_type().is_numeric() && candidate.data_type().is_numeric() {
        return subject.as_f64() == candidate.as_f64();
    }
    candidate
        .coerce(&subject.data_type())
        .is_some_and(|c| values_equal(subject, &c))
}
