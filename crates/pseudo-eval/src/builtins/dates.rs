//! Date built-ins.

use chrono::{Datelike, Local, NaiveDate};
use pseudo_types::ast::PrimitiveType as P;
use pseudo_types::Span;

use super::{arg_date, arg_integer, Builtin};
use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::scope::ScopeId;
use crate::value::Value;

pub(crate) const BUILTINS: &[Builtin] = &[
    Builtin { name: "DAY", params: &[("Date", P::Date)], returns: P::Integer, run: day },
    Builtin { name: "MONTH", params: &[("Date", P::Date)], returns: P::Integer, run: month },
    Builtin { name: "YEAR", params: &[("Date", P::Date)], returns: P::Integer, run: year },
    Builtin { name: "DAYINDEX", params: &[("Date", P::Date)], returns: P::Integer, run: day_index },
    Builtin {
        name: "SETDATE",
        params: &[("Day", P::Integer), ("Month", P::Integer), ("Year", P::Integer)],
        returns: P::Date,
        run: set_date,
    },
    Builtin { name: "TODAY", params: &[], returns: P::Date, run: today },
];

fn day(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    Ok(Value::Integer(i64::from(arg_date(interp, scope, "Date", span)?.day())))
}

fn month(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    Ok(Value::Integer(i64::from(arg_date(interp, scope, "Date", span)?.month())))
}

fn year(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    Ok(Value::Integer(i64::from(arg_date(interp, scope, "Date", span)?.year())))
}

/// Sunday is 1, Saturday is 7.
fn day_index(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let date = arg_date(interp, scope, "Date", span)?;
    Ok(Value::Integer(i64::from(date.weekday().num_days_from_sunday()) + 1))
}

fn set_date(interp: &mut Interpreter, scope: ScopeId, span: Span) -> EvalResult<Value> {
    let d = arg_integer(interp, scope, "Day", span)?;
    let m = arg_integer(interp, scope, "Month", span)?;
    let y = arg_integer(interp, scope, "Year", span)?;
    let date = match (u32::try_from(d), u32::try_from(m), i32::try_from(y)) {
        (Ok(d), Ok(m), Ok(y)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };
    date.map(Value::Date)
        .ok_or_else(|| interp.fail(scope, span, "Invalid Date!"))
}

fn today(_interp: &mut Interpreter, _scope: ScopeId, _span: Span) -> EvalResult<Value> {
    Ok(Value::Date(Local::now().date_naive()))
}
