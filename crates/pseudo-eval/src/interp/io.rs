//! Console and file statements.

use chrono::NaiveDate;
use pseudo_types::ast::{AccessPath, Expr, FileMode, Ident};
use pseudo_types::Span;

use crate::error::{ErrorKind, EvalResult};
use crate::scope::{LookupMode, ScopeId, Variable};
use crate::value::{DataType, Value};

use super::{Interpreter, Target};

impl Interpreter {
    // ══════════════════════════════════════════════════════════════════════════
    // Console
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn exec_output(&mut self, scope: ScopeId, exprs: &[Expr], span: Span) -> EvalResult<()> {
        let mut line = String::new();
        for expr in exprs {
            let value = self.eval_expr(scope, expr)?;
            line.push_str(&value.to_string());
        }
        self.emit(scope, span, &line)
    }

    /// Write one line to the console.
    pub(crate) fn emit(&mut self, scope: ScopeId, span: Span, line: &str) -> EvalResult<()> {
        self.console
            .write_line(line)
            .map_err(|e| self.fail(scope, span, format!("Failed to write output: {e}")))
    }

    pub(crate) fn exec_input(&mut self, scope: ScopeId, target: &AccessPath, span: Span) -> EvalResult<()> {
        let place = match self.resolve(scope, target) {
            Ok(Target::Variable(place)) => place,
            Ok(Target::Array(_)) => return Err(self.error(scope, target.span, ErrorKind::ArrayDirectAccess)),
            Err(e) if matches!(e.kind, ErrorKind::NotDefined(_)) => match target.as_name() {
                Some(name) if !self.is_type_name(scope, &name.name) => {
                    let text = self.read_console(scope, span)?;
                    return self.declare_implicit(scope, name, Value::String(text));
                }
                _ => return Err(e),
            },
            Err(e) => return Err(e),
        };

        let data_type = match self.scopes.variable(&place) {
            Some(var) => var.data_type.clone(),
            None => return Err(self.fail(scope, span, "Attempting to access deleted object")),
        };
        let text = self.read_console(scope, span)?;
        let value = self.parse_input(scope, &text, &data_type, span)?;
        self.store(scope, &place, value, span)
    }

    fn read_console(&mut self, scope: ScopeId, span: Span) -> EvalResult<String> {
        match self.console.read_line() {
            Ok(line) => Ok(line.unwrap_or_default()),
            Err(e) => Err(self.fail(scope, span, format!("Failed to read input: {e}"))),
        }
    }

    fn parse_input(&self, scope: ScopeId, text: &str, ty: &DataType, span: Span) -> EvalResult<Value> {
        let bad = || self.error(scope, span, ErrorKind::TypeOperation("Input".into()));
        match ty {
            DataType::Integer => text.trim().parse().map(Value::Integer).map_err(|_| bad()),
            DataType::Real => text.trim().parse().map(Value::Real).map_err(|_| bad()),
            DataType::Boolean => Ok(Value::Boolean(text == "TRUE")),
            DataType::Char => text
                .chars()
                .next()
                .map(Value::Char)
                .ok_or_else(|| self.fail(scope, span, "Expected a character")),
            DataType::String => Ok(Value::String(text.to_string())),
            DataType::Date => NaiveDate::parse_from_str(text.trim(), "%d/%m/%Y")
                .map(Value::Date)
                .map_err(|_| self.fail(scope, span, "Invalid Date!")),
            DataType::Enum(_) | DataType::Pointer(_) | DataType::Composite(_) => {
                Err(self.fail(scope, span, "Cannot input non-primitive types"))
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Files
    // ══════════════════════════════════════════════════════════════════════════

    fn file_name(&mut self, scope: ScopeId, file: &Expr) -> EvalResult<String> {
        match self.eval_expr(scope, file)? {
            Value::String(name) => Ok(name),
            _ => Err(self.fail(scope, file.span, "Expected string for file name")),
        }
    }

    pub(crate) fn exec_open_file(&mut self, scope: ScopeId, file: &Expr, mode: FileMode) -> EvalResult<()> {
        let name = self.file_name(scope, file)?;
        if self.files.is_open(&name) {
            return Err(self.fail(scope, file.span, format!("File '{name}' is already open")));
        }
        match self.files.open(&name, mode) {
            Ok(()) => {
                tracing::debug!(file = %name, ?mode, "file opened");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(file = %name, error = %e, "open failed");
                Err(self.fail(scope, file.span, format!("Failed to open file '{name}'")))
            }
        }
    }

    pub(crate) fn exec_read_file(&mut self, scope: ScopeId, file: &Expr, target: &Ident) -> EvalResult<()> {
        let name = self.file_name(scope, file)?;
        match self.files.mode(&name) {
            None => return Err(self.error(scope, file.span, ErrorKind::FileNotOpen(name))),
            Some(FileMode::Read) => {}
            Some(_) => {
                return Err(self.fail(
                    scope,
                    file.span,
                    format!("File '{name}' is not open in READ mode"),
                ))
            }
        }

        if self
            .scopes
            .find_array(scope, &target.name, LookupMode::Global)
            .is_some()
        {
            return Err(self.error(scope, target.span, ErrorKind::ArrayDirectAccess));
        }
        let place = self.scopes.find_variable(scope, &target.name, LookupMode::Global);
        if let Some(place) = &place {
            let is_string = self
                .scopes
                .variable(place)
                .is_some_and(|v| v.data_type == DataType::String);
            if !is_string {
                return Err(self.fail(scope, target.span, "Variable of type STRING expected"));
            }
        }

        let line = self
            .files
            .read_line(&name)
            .map_err(|e| self.fail(scope, file.span, format!("Failed to read file '{name}': {e}")))?;
        match place {
            Some(place) => self.store(scope, &place, Value::String(line), target.span),
            None => {
                self.frame_mut(scope, target.span)?
                    .members
                    .add_variable(Variable::new(&target.name, DataType::String, Value::String(line)));
                Ok(())
            }
        }
    }

    pub(crate) fn exec_write_file(&mut self, scope: ScopeId, file: &Expr, value: &Expr) -> EvalResult<()> {
        let name = self.file_name(scope, file)?;
        match self.files.mode(&name) {
            None => return Err(self.error(scope, file.span, ErrorKind::FileNotOpen(name))),
            Some(FileMode::Read) => {
                return Err(self.fail(
                    scope,
                    file.span,
                    format!("File '{name}' is opened as read-only"),
                ))
            }
            Some(_) => {}
        }
        let value = self.eval_expr(scope, value)?;
        if !value.data_type().is_primitive() {
            return Err(self.error(scope, file.span, ErrorKind::TypeOperation("Write".into())));
        }
        self.files
            .write_line(&name, &value.to_string())
            .map_err(|e| self.fail(scope, file.span, format!("Failed to write file '{name}': {e}")))
    }

    pub(crate) fn exec_close_file(&mut self, scope: ScopeId, file: &Expr) -> EvalResult<()> {
        let name = self.file_name(scope, file)?;
        if !self.files.close(&name) {
            return Err(self.error(scope, file.span, ErrorKind::FileNotOpen(name)));
        }
        tracing::debug!(file = %name, "file closed");
        Ok(())
    }
}
