use pseudo_types::ast::PrimitiveType as P;
use pseudo_types::Span;

use super::{arg_char, arg_integer, Builtin};
use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::scope::ScopeId;
use crate::value::Value;

pub(crate) const BUILTINS: &[Builtin] = &[
    Builtin { name: "LCASE", params: &[("Char", P::Char)], returns: P::Char, run: lcase },
    Builtin { name: "UCASE", params: &[("Char", P::Char)], returns: P::Char, run: ucase },
    Builtin { name: "ASC", params: &[("Char", P::Char)], returns: P::Integer, run: asc },
    Builtin { name: "CHR", params: &[("x", P::Integer)], returns: P::Char, run: chr },
];

fn lcase(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    Ok(Value::Char(arg_char(interp, scope, "Char", span)?.to_ascii_lowercase()))
}

fn ucase(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    Ok(Value::Char(arg_char(interp, scope, "Char", span)?.to_ascii_uppercase()))
}

fn asc(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let c = arg_char(interp, scope, "Char", span)?;
    Ok(Value::Integer(i64::from(u32::from(c))))
}

fn chr(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let x = arg_integer(interp, scope, "x", span)?;
    u32::try_from(x)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Char)
        .ok_or_else(|| interp.fail(scope, span, format!("{x} is not a valid character code")))
}
