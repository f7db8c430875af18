//! The built-in function library.
//!
//! Every built-in is an ordinary function in the root scope: arguments are
//! bound to named parameters in a call scope exactly as for user routines,
//! and the native body reads them back by name.

mod chars;
mod dates;
mod math;
mod numeric;
mod strings;

use std::rc::Rc;

use chrono::NaiveDate;
use pseudo_types::ast::PrimitiveType;
use pseudo_types::Span;

use crate::callable::{Body, Callable, NativeFn, Param};
use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::scope::{LookupMode, Scope, ScopeId};
use crate::value::Value;

/// A native function and its signature.
pub(crate) struct Builtin {
    pub name: &'static str,
    pub params: &'static [(&'static str, PrimitiveType)],
    pub returns: PrimitiveType,
    pub run: NativeFn,
}

/// Register every built-in in `scope`, the program root.
pub(crate) fn register(scope: &mut Scope) {
    let tables: [&[Builtin]; 5] = [
        strings::BUILTINS,
        chars::BUILTINS,
        dates::BUILTINS,
        numeric::BUILTINS,
        math::BUILTINS,
    ];
    for builtin in tables.into_iter().flatten() {
        let callable = Callable {
            name: builtin.name.to_string(),
            params: builtin
                .params
                .iter()
                .map(|&(name, ty)| Param {
                    name: name.to_string(),
                    ty: ty.into(),
                    by_ref: false,
                })
                .collect(),
            return_type: Some(builtin.returns.into()),
            body: Body::Native(builtin.run),
        };
        scope.functions.insert(callable.name.clone(), Rc::new(callable));
    }
    tracing::trace!(count = scope.functions.len(), "built-ins registered");
}

// ── Argument access ─────────────────────────────────────────────────────────

fn arg(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> EvalResult<Value> {
    match interp.scopes.find_variable(scope, name, LookupMode::Local) {
        Some(place) => interp.read(scope, &place, span),
        None => Err(interp.fail(scope, span, format!("Missing argument '{name}'"))),
    }
}

fn mismatch(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> crate::error::RuntimeError {
    interp.fail(scope, span, format!("Argument '{name}' has the wrong type"))
}

pub(crate) fn arg_string(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> EvalResult<String> {
    match arg(interp, scope, name, span)? {
        Value::String(s) => Ok(s),
        _ => Err(mismatch(interp, scope, name, span)),
    }
}

pub(crate) fn arg_integer(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> EvalResult<i64> {
    match arg(interp, scope, name, span)? {
        Value::Integer(n) => Ok(n),
        _ => Err(mismatch(interp, scope, name, span)),
    }
}

pub(crate) fn arg_real(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> EvalResult<f64> {
    match arg(interp, scope, name, span)? {
        Value::Real(x) => Ok(x),
        Value::Integer(n) => Ok(n as f64),
        _ => Err(mismatch(interp, scope, name, span)),
    }
}

pub(crate) fn arg_char(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> EvalResult<char> {
    match arg(interp, scope, name, span)? {
        Value::Char(c) => Ok(c),
        _ => Err(mismatch(interp, scope, name, span)),
    }
}

pub(crate) fn arg_date(interp: &Interpreter, scope: ScopeId, name: &str, span: Span) -> EvalResult<NaiveDate> {
    match arg(interp, scope, name, span)? {
        Value::Date(d) => Ok(d),
        _ => Err(mismatch(interp, scope, name, span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeKind;

    #[test]
    fn every_builtin_is_a_function_in_the_root() {
        let mut scope = Scope::new("Program", None, ScopeKind::Program);
        register(&mut scope);
        let names: Vec<&str> = scope.functions.keys().map(String::as_str).collect();
        assert_eq!(names.len(), 34);
        assert_eq!(names.first(), Some(&"LENGTH"));
        assert_eq!(names.last(), Some(&"LN"));
        assert!(scope.procedures.is_empty());
        let mid = &scope.functions["MID"];
        assert_eq!(mid.signature(), vec!["STRING", "INTEGER", "INTEGER"]);
        assert!(mid.is_function());
    }
}
