//! Procedures and functions, user-defined and built-in.

use std::fmt;
use std::rc::Rc;

use pseudo_types::ast::RoutineDecl;
use pseudo_types::Span;

use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::scope::ScopeId;
use crate::value::{DataType, Value};

/// A built-in body. Reads its parameters by name from the call scope.
pub type NativeFn = fn(&mut Interpreter, ScopeId, Span) -> EvalResult<Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: DataType,
    pub by_ref: bool,
}

#[derive(Clone)]
pub enum Body {
    User(Rc<RoutineDecl>),
    Native(NativeFn),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(decl) => f.debug_tuple("User").field(&decl.name.name).finish(),
            Self::Native(_) => f.write_str("Native"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Callable {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for procedures.
    pub return_type: Option<DataType>,
    pub body: Body,
}

impl Callable {
    pub fn is_function(&self) -> bool {
        self.return_type.is_some()
    }

    /// Parameter types as shown in argument errors.
    pub fn signature(&self) -> Vec<String> {
        self.params.iter().map(|p| p.ty.to_string()).collect()
    }
}
