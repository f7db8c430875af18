//! Operator semantics: arithmetic, comparison, logic, concatenation, casts.

use std::cmp::Ordering;

use pseudo_types::ast::BinOp;
use pseudo_types::Span;

use crate::error::{ErrorKind, EvalResult};
use crate::scope::ScopeId;
use crate::value::{DataType, Value};

use super::Interpreter;

impl Interpreter {
    pub(crate) fn binary(
        &self,
        scope: ScopeId,
        lhs: Value,
        op: BinOp,
        rhs: Value,
        span: Span,
    ) -> EvalResult<Value> {
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::IntDiv => {
                self.arithmetic(scope, lhs, op, rhs, span)
            }
            BinOp::Eq
            | BinOp::NotEq
            | BinOp::Less
            | BinOp::Greater
            | BinOp::LessEq
            | BinOp::GreaterEq => self.compare(scope, lhs, op, rhs, span),
            BinOp::And | BinOp::Or => match (lhs, rhs) {
                (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinOp::And {
                    a && b
                } else {
                    a || b
                })),
                _ => Err(self.invalid_usage(
                    scope,
                    span,
                    format!("'{op}' operator, operands must be of type Boolean"),
                )),
            },
            BinOp::Concat => {
                if !lhs.data_type().is_primitive() || !rhs.data_type().is_primitive() {
                    return Err(self.error(scope, span, ErrorKind::TypeOperation("'&'".into())));
                }
                Ok(Value::String(format!("{lhs}{rhs}")))
            }
        }
    }

    // ── Arithmetic ──────────────────────────────────────────────────────────

    fn arithmetic(
        &self,
        scope: ScopeId,
        lhs: Value,
        op: BinOp,
        rhs: Value,
        span: Span,
    ) -> EvalResult<Value> {
        match (lhs, rhs) {
            (Value::Enum(e), Value::Integer(k)) if matches!(op, BinOp::Add | BinOp::Sub) => {
                let k = if op == BinOp::Sub { k.wrapping_neg() } else { k };
                Ok(Value::Enum(e.offset(k)))
            }
            (Value::Integer(k), Value::Enum(e)) if op == BinOp::Add => Ok(Value::Enum(e.offset(k))),
            (Value::Integer(a), Value::Integer(b)) => self.integer_op(scope, a, op, b, span),
            (lhs, rhs) => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => self.real_op(scope, a, op, b, span),
                _ => Err(self.invalid_usage(
                    scope,
                    span,
                    format!("'{op}' operator, operands must be of type Integer or Real"),
                )),
            },
        }
    }

    fn integer_op(&self, scope: ScopeId, a: i64, op: BinOp, b: i64, span: Span) -> EvalResult<Value> {
        let result = match op {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
            BinOp::Div | BinOp::IntDiv => {
                if b == 0 {
                    return Err(self.fail(scope, span, "Division by 0"));
                }
                a.wrapping_div(b)
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(self.fail(scope, span, "Modulus by 0"));
                }
                a.wrapping_rem(b)
            }
            _ => unreachable!("integer_op called with {op}"),
        };
        Ok(Value::Integer(result))
    }

    fn real_op(&self, scope: ScopeId, a: f64, op: BinOp, b: f64, span: Span) -> EvalResult<Value> {
        let result = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div | BinOp::IntDiv => {
                if b == 0.0 {
                    return Err(self.fail(scope, span, "Division by 0"));
                }
                if op == BinOp::IntDiv {
                    (a / b).trunc()
                } else {
                    a / b
                }
            }
            BinOp::Mod => {
                if b == 0.0 {
                    return Err(self.fail(scope, span, "Modulus by 0"));
                }
                a % b
            }
            _ => unreachable!("real_op called with {op}"),
        };
        Ok(Value::Real(result))
    }

    pub(crate) fn negate(&self, scope: ScopeId, value: Value, span: Span) -> EvalResult<Value> {
        match value {
            Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
            Value::Real(x) => Ok(Value::Real(-x)),
            _ => Err(self.invalid_usage(
                scope,
                span,
                "'-' operator, operand must be of type Integer or Real",
            )),
        }
    }

    pub(crate) fn not(&self, scope: ScopeId, value: Value, span: Span) -> EvalResult<Value> {
        match value {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            _ => Err(self.invalid_usage(
                scope,
                span,
                "'NOT' operator, operand must be of type Boolean",
            )),
        }
    }

    // ── Comparison ──────────────────────────────────────────────────────────

    fn compare(&self, scope: ScopeId, lhs: Value, op: BinOp, rhs: Value, span: Span) -> EvalResult<Value> {
        let (lhs, rhs) = match (lhs, rhs) {
            (Value::Char(a), Value::Char(b)) => (
                Value::Integer(i64::from(u32::from(a))),
                Value::Integer(i64::from(u32::from(b))),
            ),
            (Value::Date(a), Value::Date(b)) => (
                Value::Integer(Value::date_ordinal(&a)),
                Value::Integer(Value::date_ordinal(&b)),
            ),
            pair => pair,
        };

        let ordering = match (&lhs, &rhs) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            _ => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        };
        if lhs.data_type().is_numeric() && rhs.data_type().is_numeric() {
            let result = match (op, ordering) {
                (BinOp::Eq, o) => o == Some(Ordering::Equal),
                (BinOp::NotEq, o) => o != Some(Ordering::Equal),
                (BinOp::Less, o) => o == Some(Ordering::Less),
                (BinOp::Greater, o) => o == Some(Ordering::Greater),
                (BinOp::LessEq, o) => matches!(o, Some(Ordering::Less | Ordering::Equal)),
                (BinOp::GreaterEq, o) => matches!(o, Some(Ordering::Greater | Ordering::Equal)),
                _ => unreachable!("compare called with {op}"),
            };
            return Ok(Value::Boolean(result));
        }

        let equal = match op {
            BinOp::Eq => true,
            BinOp::NotEq => false,
            _ => {
                return Err(self.invalid_usage(
                    scope,
                    span,
                    format!("'{op}' operator, operands must be of numeric data type"),
                ))
            }
        };
        Ok(Value::Boolean(values_equal(&lhs, &rhs) == equal))
    }

    // ── Casts ───────────────────────────────────────────────────────────────

    /// Explicit `TYPE(expr)` conversion between primitives.
    pub(crate) fn cast(&self, scope: ScopeId, value: Value, target: DataType, span: Span) -> EvalResult<Value> {
        if value.data_type() == target {
            return Ok(value);
        }
        let allowed = value.data_type().is_primitive() && target.is_primitive() && target != DataType::Date;
        allowed
            .then(|| value.convert(&target))
            .flatten()
            .ok_or_else(|| self.error(scope, span, ErrorKind::TypeOperation("Cast".into())))
    }

    fn invalid_usage(&self, scope: ScopeId, span: Span, what: impl Into<String>) -> crate::error::RuntimeError {
        self.error(scope, span, ErrorKind::InvalidUsage(what.into()))
    }
}

/// `=` for two non-numeric values. Differing types are never equal and
/// records never compare equal, not even to themselves.
pub(crate) fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Real(a), Value::Real(b)) => a == b,
        (Value::Integer(_) | Value::Real(_), Value::Integer(_) | Value::Real(_)) => {
            lhs.as_f64() == rhs.as_f64()
        }
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a == b,
        (Value::Enum(a), Value::Enum(b)) => a.def.name == b.def.name && a.index == b.index,
        (Value::Pointer(a), Value::Pointer(b)) => a.type_name == b.type_name && a.target == b.target,
        _ => false,
    }
}
