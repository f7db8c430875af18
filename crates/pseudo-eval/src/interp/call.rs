//! The call protocol shared by user routines and built-ins.

use std::rc::Rc;

use pseudo_types::ast::{Expr, Ident};
use pseudo_types::Span;

use crate::callable::{Body, Callable};
use crate::error::{ErrorKind, EvalResult};
use crate::scope::{Place, Scope, ScopeId, ScopeKind, Variable};
use crate::value::{DataType, Value};

use super::{ControlFlow, Interpreter, Target};

/// An evaluated argument.
enum Arg {
    Value(Value),
    Ref(Place, DataType),
}

impl Arg {
    fn data_type(&self) -> DataType {
        match self {
            Self::Value(v) => v.data_type(),
            Self::Ref(_, ty) => ty.clone(),
        }
    }
}

impl Interpreter {
    pub(crate) fn call_function(
        &mut self,
        scope: ScopeId,
        name: &Ident,
        args: &[Expr],
        span: Span,
    ) -> EvalResult<Value> {
        let root = self.scopes.root_of(scope);
        let callable = self
            .scopes
            .get(root)
            .and_then(|s| s.functions.get(&name.name))
            .cloned()
            .ok_or_else(|| {
                self.error(
                    scope,
                    name.span,
                    ErrorKind::NotDefined(format!("Function '{}'", name.name)),
                )
            })?;
        match self.invoke(scope, &callable, args, span)? {
            Some(value) => Ok(value),
            None => Err(self.fail(scope, span, "Missing RETURN statement")),
        }
    }

    pub(crate) fn call_procedure(
        &mut self,
        scope: ScopeId,
        name: &Ident,
        args: &[Expr],
        span: Span,
    ) -> EvalResult<()> {
        let root = self.scopes.root_of(scope);
        let callable = self
            .scopes
            .get(root)
            .and_then(|s| s.procedures.get(&name.name))
            .cloned()
            .ok_or_else(|| {
                self.error(
                    scope,
                    name.span,
                    ErrorKind::NotDefined(format!("Procedure '{}'", name.name)),
                )
            })?;
        self.invoke(scope, &callable, args, span).map(|_| ())
    }

    /// Evaluate arguments in the caller, bind them in a fresh call scope,
    /// run the body and tear the scope down again.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %callable.name))]
    fn invoke(
        &mut self,
        caller: ScopeId,
        callable: &Rc<Callable>,
        args: &[Expr],
        span: Span,
    ) -> EvalResult<Option<Value>> {
        let evaluated = self.eval_args(caller, callable, args)?;

        if evaluated.len() != callable.params.len() {
            return Err(self.invalid_args(caller, span, callable, &evaluated));
        }

        let kind = match &callable.return_type {
            Some(return_type) => ScopeKind::Function {
                return_type: return_type.clone(),
            },
            None => ScopeKind::Procedure,
        };
        let frame = self
            .scopes
            .alloc(Scope::new(callable.name.clone(), Some(caller), kind));
        tracing::trace!(scope = ?frame, "call scope created");

        let result = self
            .bind_args(caller, frame, callable, evaluated, span)
            .and_then(|()| self.run_body(frame, callable, span));

        self.scopes.free(frame);
        tracing::trace!(scope = ?frame, "call scope dropped");
        result
    }

    fn eval_args(&mut self, caller: ScopeId, callable: &Callable, args: &[Expr]) -> EvalResult<Vec<Arg>> {
        let mut evaluated = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let by_ref = callable.params.get(i).is_some_and(|p| p.by_ref);
            if !by_ref {
                evaluated.push(Arg::Value(self.eval_expr(caller, arg)?));
                continue;
            }
            let Some(path) = arg.as_access() else {
                let message = if callable.is_function() {
                    "Only variables can be used as arguments when passing by reference"
                } else {
                    "Only variables and array elements can be used as arguments when passing by reference"
                };
                return Err(self.fail(caller, arg.span, message));
            };
            let place = match self.resolve(caller, path)? {
                Target::Variable(place) => place,
                Target::Array(_) => {
                    return Err(self.error(caller, arg.span, ErrorKind::ArrayDirectAccess))
                }
            };
            let ty = self
                .scopes
                .variable(&place)
                .map(|v| v.data_type.clone())
                .ok_or_else(|| self.fail(caller, arg.span, "Attempting to access deleted object"))?;
            evaluated.push(Arg::Ref(place, ty));
        }
        Ok(evaluated)
    }

    fn bind_args(
        &mut self,
        caller: ScopeId,
        frame: ScopeId,
        callable: &Callable,
        evaluated: Vec<Arg>,
        span: Span,
    ) -> EvalResult<()> {
        let actual: Vec<String> = evaluated.iter().map(|a| a.data_type().to_string()).collect();
        let mismatch = |this: &Self| {
            this.error(
                caller,
                span,
                ErrorKind::InvalidArgs {
                    expected: callable.signature(),
                    actual: actual.clone(),
                },
            )
        };

        for (param, arg) in callable.params.iter().zip(evaluated) {
            let variable = match arg {
                Arg::Value(value) => {
                    let value = value.coerce(&param.ty).ok_or_else(|| mismatch(self))?;
                    Variable::new(&param.name, param.ty.clone(), value)
                }
                Arg::Ref(place, ty) => {
                    if ty != param.ty {
                        return Err(mismatch(self));
                    }
                    Variable::alias(&param.name, ty, place)
                }
            };
            self.frame_mut(frame, span)?.members.add_variable(variable);
        }
        Ok(())
    }

    fn run_body(&mut self, frame: ScopeId, callable: &Callable, span: Span) -> EvalResult<Option<Value>> {
        let decl = match &callable.body {
            Body::Native(native) => return native(self, frame, span).map(Some),
            Body::User(decl) => Rc::clone(decl),
        };
        match self.exec_block(frame, &decl.body)? {
            ControlFlow::Return(value) => Ok(Some(value)),
            ControlFlow::Normal if callable.is_function() => {
                Err(self.fail(frame, decl.span, "Missing RETURN statement"))
            }
            ControlFlow::Normal => Ok(None),
            ControlFlow::Break(at) => Err(self.error(
                frame,
                at,
                ErrorKind::InvalidUsage("'BREAK' statement".into()),
            )),
            ControlFlow::Continue(at) => Err(self.error(
                frame,
                at,
                ErrorKind::InvalidUsage("'CONTINUE' statement".into()),
            )),
        }
    }

    fn invalid_args(
        &self,
        caller: ScopeId,
        span: Span,
        callable: &Callable,
        evaluated: &[Arg],
    ) -> crate::error::RuntimeError {
        self.error(
            caller,
            span,
            ErrorKind::InvalidArgs {
                expected: callable.signature(),
                actual: evaluated.iter().map(|a| a.data_type().to_string()).collect(),
            },
        )
    }
}
