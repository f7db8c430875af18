//! Access-path resolution: `name`, `p^`, `r.field`, `a[i, j]` and any
//! composition of them, down to a storage cell or a whole array.

use pseudo_types::ast::{AccessKind, AccessPath, Ident};
use pseudo_types::Span;

use crate::error::{ErrorKind, EvalResult};
use crate::scope::{Array, LookupMode, Place, ScopeId, Storage};
use crate::value::{PointerValue, Value};

use super::Interpreter;

/// A whole array and where it is stored.
#[derive(Debug, Clone)]
pub(crate) struct ArrayRef {
    pub scope: ScopeId,
    /// Path to the record holding the array; empty for a scope-level array.
    pub prefix: Vec<usize>,
    pub array: Array,
}

impl ArrayRef {
    pub fn element(&self, offset: usize) -> Place {
        let mut path = self.prefix.clone();
        path.push(self.array.start + offset);
        Place {
            scope: self.scope,
            path,
        }
    }
}

/// What an access path denotes.
#[derive(Debug, Clone)]
pub(crate) enum Target {
    Variable(Place),
    Array(ArrayRef),
}

impl Interpreter {
    /// Resolve `path` from `scope`. Variable places are canonical: a
    /// by-reference parameter resolves to the caller's cell.
    pub(crate) fn resolve(&mut self, scope: ScopeId, path: &AccessPath) -> EvalResult<Target> {
        match &path.kind {
            AccessKind::Name(ident) => self.resolve_name(scope, ident),
            AccessKind::Deref(base) => {
                let place = match self.resolve(scope, base)? {
                    Target::Variable(place) => place,
                    Target::Array(_) => return Err(self.non_pointer(scope, path.span)),
                };
                let pointer = match self.scopes.variable(&place) {
                    Some(var) => match &var.storage {
                        Storage::Owned(Value::Pointer(p)) => Some((var.name.clone(), p.clone())),
                        _ => None,
                    },
                    None => None,
                };
                let (name, pointer) = pointer.ok_or_else(|| self.non_pointer(scope, path.span))?;
                self.deref(scope, &name, &pointer, path.span).map(Target::Variable)
            }
            AccessKind::Member { base, member } => {
                let place = match self.resolve(scope, base)? {
                    Target::Variable(place) => place,
                    Target::Array(_) => return Err(self.non_composite(scope, path.span)),
                };
                self.resolve_member(scope, place, member, path.span)
            }
            AccessKind::Index { base, indices } => {
                let array = match self.resolve(scope, base)? {
                    Target::Array(array) => array,
                    Target::Variable(place) => {
                        let name = self
                            .scopes
                            .variable(&place)
                            .map(|v| v.name.clone())
                            .unwrap_or_default();
                        return Err(self.fail(
                            scope,
                            path.span,
                            format!("Attempting to index non-array variable '{name}'"),
                        ));
                    }
                };
                if indices.len() != array.array.dims.len() {
                    return Err(self.fail(scope, path.span, "Invalid number of indices"));
                }
                let mut values = Vec::with_capacity(indices.len());
                for index in indices {
                    match self.eval_expr(scope, index)? {
                        Value::Integer(i) => values.push(i),
                        _ => {
                            return Err(self.fail(
                                scope,
                                index.span,
                                "Array indices must be of type INTEGER",
                            ))
                        }
                    }
                }
                let offset = array
                    .array
                    .offset(&values)
                    .ok_or_else(|| self.fail(scope, path.span, "Index out of bounds"))?;
                Ok(Target::Variable(array.element(offset)))
            }
        }
    }

    fn resolve_name(&self, scope: ScopeId, ident: &Ident) -> EvalResult<Target> {
        if let Some(place) = self.scopes.find_variable(scope, &ident.name, LookupMode::Global) {
            return self
                .scopes
                .canonical(&place)
                .map(Target::Variable)
                .ok_or_else(|| {
                    self.fail(scope, ident.span, "Attempting to access deleted object")
                });
        }
        if let Some((owner, array)) = self.scopes.find_array(scope, &ident.name, LookupMode::Global)
        {
            return Ok(Target::Array(ArrayRef {
                scope: owner,
                prefix: Vec::new(),
                array: array.clone(),
            }));
        }
        Err(self.error(
            scope,
            ident.span,
            ErrorKind::NotDefined(format!("Identifier '{}'", ident.name)),
        ))
    }

    fn resolve_member(
        &self,
        scope: ScopeId,
        place: Place,
        member: &Ident,
        span: Span,
    ) -> EvalResult<Target> {
        let record = match self.scopes.variable(&place).map(|v| &v.storage) {
            Some(Storage::Owned(Value::Composite(record))) => record,
            _ => return Err(self.non_composite(scope, span)),
        };
        if let Some(index) = record.members.variable_index(&member.name) {
            return Ok(Target::Variable(place.member(index)));
        }
        if let Some(array) = record.members.array(&member.name) {
            return Ok(Target::Array(ArrayRef {
                scope: place.scope,
                prefix: place.path.clone(),
                array: array.clone(),
            }));
        }
        Err(self.fail(
            scope,
            member.span,
            format!(
                "Type '{}' has no member '{}'",
                record.type_name, member.name
            ),
        ))
    }

    /// Follow a pointer, refusing targets whose owning scope has ended or
    /// is not on the current scope's parent chain.
    pub(crate) fn deref(
        &self,
        scope: ScopeId,
        pointer_name: &str,
        pointer: &PointerValue,
        span: Span,
    ) -> EvalResult<Place> {
        let Some(target) = &pointer.target else {
            return Err(self.fail(scope, span, "Attempt to access uninitialized pointer"));
        };
        let reachable = self.scopes.is_live(target.scope)
            && self.scopes.is_ancestor(target.scope, scope)
            && self.scopes.variable(target).is_some();
        if !reachable {
            return Err(self.fail(
                scope,
                span,
                format!("Attempting to access deleted object from pointer '{pointer_name}'"),
            ));
        }
        Ok(target.clone())
    }

    fn non_pointer(&self, scope: ScopeId, span: Span) -> crate::error::RuntimeError {
        self.error(
            scope,
            span,
            ErrorKind::InvalidUsage("'^' operator: Attempting to dereference non-pointer".into()),
        )
    }

    fn non_composite(&self, scope: ScopeId, span: Span) -> crate::error::RuntimeError {
        self.error(
            scope,
            span,
            ErrorKind::InvalidUsage("'.' operator: Variable is not a composite type".into()),
        )
    }
}
