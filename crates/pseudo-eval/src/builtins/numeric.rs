use pseudo_types::ast::PrimitiveType as P;
use pseudo_types::Span;
use rand::Rng;

use super::{arg_integer, arg_real, Builtin};
use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::scope::ScopeId;
use crate::value::Value;

pub(crate) const BUILTINS: &[Builtin] = &[
    Builtin { name: "RAND", params: &[("x", P::Integer)], returns: P::Real, run: rand_real },
    Builtin { name: "INT", params: &[("x", P::Real)], returns: P::Integer, run: int },
];

/// A real in `[0, x)`: an integer part below `x` plus a fraction.
fn rand_real(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let x = arg_integer(interp, scope, "x", span)?;
    if x <= 0 {
        return Err(interp.fail(scope, span, "RAND argument must be greater than 0"));
    }
    let whole = interp.rng.gen_range(0..x);
    let fraction: f64 = interp.rng.gen();
    Ok(Value::Real(whole as f64 + fraction))
}

fn int(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let x = arg_real(interp, scope, "x", span)?;
    Ok(Value::Integer(x.floor() as i64))
}
