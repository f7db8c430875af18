//! Runtime error taxonomy.

use pseudo_types::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scope::ScopeId;

/// What went wrong at runtime.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    #[error("{0}")]
    General(String),
    /// An operator or statement used with the wrong operands or outside its context.
    #[error("Invalid usage of {0}")]
    InvalidUsage(String),
    /// An operation the involved types do not support (cast, concat, write).
    #[error("Invalid types for operation {0}")]
    TypeOperation(String),
    #[error("Redeclaration of '{0}'")]
    Redeclaration(String),
    #[error("Redefinition of '{0}'")]
    Redefinition(String),
    #[error("Cannot assign to constant '{0}'")]
    ConstAssign(String),
    /// Carries the full subject, e.g. `Identifier 'x'` or `Type 'Point'`.
    #[error("{0} is not defined")]
    NotDefined(String),
    #[error("Cannot access an array directly")]
    ArrayDirectAccess,
    #[error("Condition must be of type BOOLEAN")]
    ConditionType,
    #[error(
        "Invalid arguments: expected ({}), got ({})",
        .expected.join(", "),
        .actual.join(", ")
    )]
    InvalidArgs {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("File '{0}' is not open")]
    FileNotOpen(String),
}

/// A runtime error with the position and scope it was raised in.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub span: Span,
    /// Name of the active scope: `Program`, a routine name, or a record type.
    pub scope: String,
    #[serde(skip)]
    pub(crate) origin: Option<ScopeId>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, span: Span, scope: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            scope: scope.into(),
            origin: None,
        }
    }

    pub(crate) fn with_origin(mut self, origin: ScopeId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// The user-facing message.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// `true` for a whole-array read raised while evaluating directly in `scope`.
    pub(crate) fn is_direct_array_access_in(&self, scope: ScopeId) -> bool {
        self.kind == ErrorKind::ArrayDirectAccess && self.origin == Some(scope)
    }
}

/// Result alias for engine operations.
pub type EvalResult<T> = Result<T, RuntimeError>;
