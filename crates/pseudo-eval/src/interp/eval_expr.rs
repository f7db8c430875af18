//! Expression evaluation.

use chrono::NaiveDate;
use pseudo_types::ast::{AccessPath, Expr, ExprKind, UnaryOp};

use crate::error::{ErrorKind, EvalResult};
use crate::scope::ScopeId;
use crate::value::{EnumValue, Value};

use super::{Interpreter, Target};

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, scope: ScopeId, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::IntegerLit(n) => Ok(Value::Integer(*n)),
            ExprKind::RealLit(x) => Ok(Value::Real(*x)),
            ExprKind::BoolLit(b) => Ok(Value::Boolean(*b)),
            ExprKind::CharLit(c) => Ok(Value::Char(*c)),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::DateLit { day, month, year } => NaiveDate::from_ymd_opt(*year, *month, *day)
                .map(Value::Date)
                .ok_or_else(|| self.fail(scope, expr.span, "Invalid Date!")),

            ExprKind::Access(path) => self.eval_access(scope, path),
            ExprKind::Call { name, args } => self.call_function(scope, name, args, expr.span),

            ExprKind::Cast { target, operand } => {
                let value = self.eval_expr(scope, operand)?;
                self.cast(scope, value, (*target).into(), expr.span)
            }
            ExprKind::Binary { left, op, right } => {
                let lhs = self.eval_expr(scope, left)?;
                let rhs = self.eval_expr(scope, right)?;
                self.binary(scope, lhs, *op, rhs, expr.span)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(scope, operand)?;
                match op {
                    UnaryOp::Neg => self.negate(scope, value, expr.span),
                    UnaryOp::Not => self.not(scope, value, expr.span),
                }
            }
            ExprKind::Paren(inner) => self.eval_expr(scope, inner),
        }
    }

    /// Read the value an access path denotes. An undefined plain name may
    /// still be an enum value; a whole array cannot be read.
    pub(crate) fn eval_access(&mut self, scope: ScopeId, path: &AccessPath) -> EvalResult<Value> {
        match self.resolve(scope, path) {
            Ok(Target::Variable(place)) => self.read(scope, &place, path.span),
            Ok(Target::Array(_)) => Err(self.error(scope, path.span, ErrorKind::ArrayDirectAccess)),
            Err(e) if matches!(e.kind, ErrorKind::NotDefined(_)) => {
                let element = path
                    .as_name()
                    .and_then(|ident| self.find_enum_element(scope, &ident.name));
                match element {
                    Some(value) => Ok(Value::Enum(value)),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// The enum value named `name`, searching this scope then the root.
    pub(crate) fn find_enum_element(&self, scope: ScopeId, name: &str) -> Option<EnumValue> {
        [scope, self.scopes.root_of(scope)]
            .into_iter()
            .filter_map(|id| self.scopes.get(id))
            .find_map(|s| s.enum_element(name))
            .map(|(def, index)| EnumValue { def, index })
    }
}
