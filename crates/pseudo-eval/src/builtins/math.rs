//! REAL-valued maths. No domain checks: out-of-domain input yields NaN.

use pseudo_types::ast::PrimitiveType as P;
use pseudo_types::Span;

use super::{arg_real, Builtin};
use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::scope::ScopeId;
use crate::value::Value;

macro_rules! unary {
    ($($fn_name:ident => $method:ident),* $(,)?) => {
        $(
            fn $fn_name(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
                Ok(Value::Real(arg_real(interp, scope, "x", span)?.$method()))
            }
        )*
    };
}

unary! {
    exp => exp,
    sin => sin,
    cos => cos,
    tan => tan,
    asin => asin,
    acos => acos,
    atan => atan,
    sqrt => sqrt,
    log => log10,
    ln => ln,
}

const X: &[(&str, P)] = &[("x", P::Real)];

pub(crate) const BUILTINS: &[Builtin] = &[
    Builtin { name: "POW", params: &[("x", P::Real), ("y", P::Real)], returns: P::Real, run: pow },
    Builtin { name: "EXP", params: X, returns: P::Real, run: exp },
    Builtin { name: "SIN", params: X, returns: P::Real, run: sin },
    Builtin { name: "COS", params: X, returns: P::Real, run: cos },
    Builtin { name: "TAN", params: X, returns: P::Real, run: tan },
    Builtin { name: "ASIN", params: X, returns: P::Real, run: asin },
    Builtin { name: "ACOS", params: X, returns: P::Real, run: acos },
    Builtin { name: "ATAN", params: X, returns: P::Real, run: atan },
    Builtin { name: "ATAN2", params: &[("y", P::Real), ("x", P::Real)], returns: P::Real, run: atan2 },
    Builtin { name: "SQRT", params: X, returns: P::Real, run: sqrt },
    Builtin { name: "LOG", params: X, returns: P::Real, run: log },
    Builtin { name: "LN", params: X, returns: P::Real, run: ln },
];

fn pow(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let x = arg_real(interp, scope, "x", span)?;
    let y = arg_real(interp, scope, "y", span)?;
    Ok(Value::Real(x.powf(y)))
}

fn atan2(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let y = arg_real(interp, scope, "y", span)?;
    let x = arg_real(interp, scope, "x", span)?;
    Ok(Value::Real(y.atan2(x)))
}
