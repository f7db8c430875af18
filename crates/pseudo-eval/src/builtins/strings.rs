//! String built-ins, plus `EOF`, which takes a file name.

use pseudo_types::ast::{FileMode, PrimitiveType as P};
use pseudo_types::Span;

use super::{arg_integer, arg_real, arg_string, Builtin};
use crate::error::{ErrorKind, EvalResult};
use crate::interp::Interpreter;
use crate::scope::ScopeId;
use crate::value::{format_real, Value};

pub(crate) const BUILTINS: &[Builtin] = &[
    Builtin { name: "LENGTH", params: &[("String", P::String)], returns: P::Integer, run: length },
    Builtin { name: "RIGHT", params: &[("String", P::String), ("x", P::Integer)], returns: P::String, run: right },
    Builtin {
        name: "MID",
        params: &[("String", P::String), ("x", P::Integer), ("y", P::Integer)],
        returns: P::String,
        run: mid,
    },
    Builtin { name: "LEFT", params: &[("String", P::String), ("x", P::Integer)], returns: P::String, run: left },
    Builtin { name: "TO_UPPER", params: &[("String", P::String)], returns: P::String, run: to_upper },
    Builtin { name: "TO_LOWER", params: &[("String", P::String)], returns: P::String, run: to_lower },
    Builtin { name: "NUM_TO_STR", params: &[("x", P::Real)], returns: P::String, run: num_to_str },
    Builtin { name: "STR_TO_NUM", params: &[("String", P::String)], returns: P::Real, run: str_to_num },
    Builtin { name: "IS_NUM", params: &[("String", P::String)], returns: P::Boolean, run: is_num },
    Builtin { name: "EOF", params: &[("File", P::String)], returns: P::Boolean, run: eof },
];

fn length(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    Ok(Value::Integer(s.chars().count() as i64))
}

/// Validate a `LEFT`/`RIGHT` length against the string.
fn take_len(interp: &Interpreter, scope: ScopeId, span: Span, func: &str, x: i64, len: usize) -> EvalResult<usize> {
    if x < 0 {
        return Err(interp.fail(scope, span, format!("Length for '{func}' function cannot be negative")));
    }
    match usize::try_from(x) {
        Ok(n) if n <= len => Ok(n),
        _ => Err(interp.fail(scope, span, format!("Length for '{func}' function cannot exceed string length"))),
    }
}

fn right(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    let x = arg_integer(interp, scope, "x", span)?;
    let len = s.chars().count();
    let n = take_len(interp, scope, span, "RIGHT", x, len)?;
    Ok(Value::String(s.chars().skip(len - n).collect()))
}

fn left(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    let x = arg_integer(interp, scope, "x", span)?;
    let n = take_len(interp, scope, span, "LEFT", x, s.chars().count())?;
    Ok(Value::String(s.chars().take(n).collect()))
}

/// `MID(s, x, y)`: `y` characters starting at 1-based position `x`.
fn mid(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    let x = arg_integer(interp, scope, "x", span)?;
    let y = arg_integer(interp, scope, "y", span)?;
    let len = s.chars().count() as i64;

    let start = x - 1;
    if start < 0 {
        return Err(interp.fail(scope, span, "Index for 'MID' function cannot be negative"));
    }
    if start >= len {
        return Err(interp.fail(scope, span, "Index for 'MID' function cannot exceed string length"));
    }
    if y < 0 {
        return Err(interp.fail(scope, span, "Length for 'MID' function cannot be negative"));
    }
    if start.saturating_add(y) > len {
        return Err(interp.fail(scope, span, "Substring length in 'MID' function cannot exceed string length"));
    }
    Ok(Value::String(s.chars().skip(start as usize).take(y as usize).collect()))
}

fn to_upper(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    Ok(Value::String(s.to_ascii_uppercase()))
}

fn to_lower(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    Ok(Value::String(s.to_ascii_lowercase()))
}

fn num_to_str(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let x = arg_real(interp, scope, "x", span)?;
    Ok(Value::String(format_real(x)))
}

fn str_to_num(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    s.trim()
        .parse::<f64>()
        .map(Value::Real)
        .map_err(|_| interp.fail(scope, span, format!("Cannot convert '{s}' to a number")))
}

/// Digits with at most one decimal point.
fn is_num(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let s = arg_string(interp, scope, "String", span)?;
    let digits = s.chars().filter(char::is_ascii_digit).count();
    let points = s.chars().filter(|&c| c == '.').count();
    let numeric = digits > 0 && points <= 1 && digits + points == s.chars().count();
    Ok(Value::Boolean(numeric))
}

fn eof(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let name = arg_string(interp, scope, "File", span)?;
    match interp.files.mode(&name) {
        None => return Err(interp.error(scope, span, ErrorKind::FileNotOpen(name))),
        Some(FileMode::Read) => {}
        Some(_) => return Err(interp.fail(scope, span, "File is not open in READ mode")),
    }
    interp
        .files
        .eof(&name)
        .map(Value::Boolean)
        .map_err(|e| interp.fail(scope, span, format!("Failed to read file '{name}': {e}")))
}
