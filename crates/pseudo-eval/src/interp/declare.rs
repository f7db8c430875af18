//! Declarations and definitions: variables, arrays, constants, user types
//! and routines.

use std::rc::Rc;

use chrono::NaiveDate;
use pseudo_types::ast::{DimBounds, Expr, Ident, RoutineDecl, TypeDef as TypeDefNode, TypeDefBody, TypeName};
use pseudo_types::Span;

use crate::callable::{Body, Callable, Param};
use crate::error::{ErrorKind, EvalResult};
use crate::scope::{Dim, Scope, ScopeId, ScopeKind, TypeDef, Variable};
use crate::value::{DataType, EnumDef, EnumValue, PointerValue, Record, Value};

use super::{ControlFlow, Interpreter};

impl Interpreter {
    // ══════════════════════════════════════════════════════════════════════════
    // Variables
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn exec_declare(&mut self, scope: ScopeId, names: &[Ident], ty: &TypeName) -> EvalResult<()> {
        for name in names {
            self.check_free_name(scope, name)?;
            let data_type = self.resolve_type(scope, ty)?;
            let value = self.default_value(scope, &data_type, name.span)?;
            self.frame_mut(scope, name.span)?
                .members
                .add_variable(Variable::new(&name.name, data_type, value));
        }
        Ok(())
    }

    pub(crate) fn exec_array_declare(
        &mut self,
        scope: ScopeId,
        names: &[Ident],
        dims: &[DimBounds],
        elem: &TypeName,
    ) -> EvalResult<()> {
        for name in names {
            self.check_free_name(scope, name)?;
            let mut bounds = Vec::with_capacity(dims.len());
            for dim in dims {
                let lower = self.array_bound(scope, &dim.lower)?;
                let upper = self.array_bound(scope, &dim.upper)?;
                if upper < lower {
                    return Err(self.fail(
                        scope,
                        dim.upper.span,
                        "Array upper bound must be greater than lower bound",
                    ));
                }
                bounds.push(Dim { lower, upper });
            }
            let elem_type = self.resolve_type(scope, elem)?;
            let fill = self.default_value(scope, &elem_type, name.span)?;
            tracing::trace!(array = %name.name, dims = bounds.len(), "array declared");
            self.frame_mut(scope, name.span)?
                .members
                .add_array(&name.name, elem_type, bounds, fill);
        }
        Ok(())
    }

    fn array_bound(&mut self, scope: ScopeId, expr: &Expr) -> EvalResult<i64> {
        match self.eval_expr(scope, expr)? {
            Value::Integer(n) => Ok(n),
            _ => Err(self.fail(scope, expr.span, "Array indices must be of type INTEGER")),
        }
    }

    pub(crate) fn exec_constant(&mut self, scope: ScopeId, name: &Ident, value: &Expr) -> EvalResult<()> {
        let value = self.eval_expr(scope, value)?;
        if self.frame(scope, name.span)?.members.contains(&name.name) {
            return Err(self.error(scope, name.span, ErrorKind::Redeclaration(name.name.clone())));
        }
        self.frame_mut(scope, name.span)?
            .members
            .add_variable(Variable::constant(&name.name, value));
        Ok(())
    }

    /// A new variable or array name must not exist locally or name a type.
    fn check_free_name(&self, scope: ScopeId, name: &Ident) -> EvalResult<()> {
        if self.frame(scope, name.span)?.members.contains(&name.name) {
            return Err(self.error(scope, name.span, ErrorKind::Redeclaration(name.name.clone())));
        }
        if self.is_type_name(scope, &name.name) {
            return Err(self.fail(
                scope,
                name.span,
                format!("Redefinition of type '{}' as variable", name.name),
            ));
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Types
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn exec_type_def(&mut self, scope: ScopeId, def: &TypeDefNode) -> EvalResult<()> {
        let name = &def.name;
        let taken = {
            let frame = self.frame(scope, name.span)?;
            frame.types.contains_key(&name.name) || frame.enum_element(&name.name).is_some()
        };
        if taken {
            return Err(self.error(scope, name.span, ErrorKind::Redefinition(name.name.clone())));
        }

        let type_def = match &def.body {
            TypeDefBody::Enum(values) => TypeDef::Enum(Rc::new(EnumDef {
                name: name.name.clone(),
                values: values.iter().map(|v| v.name.clone()).collect(),
            })),
            TypeDefBody::Pointer(target) => TypeDef::Pointer {
                name: name.name.clone(),
                target: self.resolve_type(scope, target)?,
            },
            TypeDefBody::Composite(body) => TypeDef::Composite {
                name: name.name.clone(),
                body: Rc::clone(body),
            },
        };
        tracing::trace!(name = %name.name, "type defined");
        self.frame_mut(scope, name.span)?
            .types
            .insert(name.name.clone(), type_def);
        Ok(())
    }

    /// A user type by name, searching this scope then the root.
    pub(crate) fn find_type(&self, scope: ScopeId, name: &str) -> Option<TypeDef> {
        [scope, self.scopes.root_of(scope)]
            .into_iter()
            .filter_map(|id| self.scopes.get(id))
            .find_map(|s| s.types.get(name).cloned())
    }

    /// `true` when `name` is a type or an enum value; such names cannot
    /// be declared implicitly.
    pub(crate) fn is_type_name(&self, scope: ScopeId, name: &str) -> bool {
        self.find_type(scope, name).is_some() || self.find_enum_element(scope, name).is_some()
    }

    pub(crate) fn resolve_type(&self, scope: ScopeId, ty: &TypeName) -> EvalResult<DataType> {
        match ty {
            TypeName::Primitive(p, _) => Ok((*p).into()),
            TypeName::Named(ident) => self
                .find_type(scope, &ident.name)
                .map(|def| def.data_type())
                .ok_or_else(|| {
                    self.error(
                        scope,
                        ident.span,
                        ErrorKind::NotDefined(format!("Type '{}'", ident.name)),
                    )
                }),
        }
    }

    /// The initial value of a fresh variable. Records run their body of
    /// declarations in a scope of their own.
    pub(crate) fn default_value(&mut self, scope: ScopeId, ty: &DataType, span: Span) -> EvalResult<Value> {
        let value = match ty {
            DataType::Integer => Value::Integer(0),
            DataType::Real => Value::Real(0.0),
            DataType::Boolean => Value::Boolean(false),
            DataType::Char => Value::Char('\0'),
            DataType::String => Value::String(String::new()),
            DataType::Date => Value::Date(NaiveDate::default()),
            DataType::Pointer(name) => Value::Pointer(PointerValue {
                type_name: name.clone(),
                target: None,
            }),
            DataType::Enum(name) | DataType::Composite(name) => match self.find_type(scope, name) {
                Some(TypeDef::Enum(def)) => Value::Enum(EnumValue { def, index: 0 }),
                Some(TypeDef::Composite { name, body }) => {
                    return self.new_record(scope, &name, &body, span)
                }
                _ => {
                    return Err(self.error(
                        scope,
                        span,
                        ErrorKind::NotDefined(format!("Type '{name}'")),
                    ))
                }
            },
        };
        Ok(value)
    }

    fn new_record(
        &mut self,
        scope: ScopeId,
        type_name: &str,
        body: &Rc<pseudo_types::ast::Block>,
        span: Span,
    ) -> EvalResult<Value> {
        let record_scope = self
            .scopes
            .alloc(Scope::new(type_name, Some(scope), ScopeKind::Record));
        let result = self.exec_block(record_scope, body);
        let members = self
            .scopes
            .free(record_scope)
            .map(|s| s.members)
            .unwrap_or_default();
        match result? {
            ControlFlow::Normal => Ok(Value::Composite(Record {
                type_name: type_name.to_string(),
                members,
            })),
            _ => Err(self.fail(scope, span, format!("Invalid body for type '{type_name}'"))),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Routines
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn define_routine(&mut self, scope: ScopeId, decl: &Rc<RoutineDecl>) -> EvalResult<()> {
        let is_function = decl.returns.is_some();
        let root = self.scopes.root_of(scope);
        let exists = {
            let frame = self.frame(root, decl.name.span)?;
            if is_function {
                frame.functions.contains_key(&decl.name.name)
            } else {
                frame.procedures.contains_key(&decl.name.name)
            }
        };
        if exists {
            return Err(self.error(
                scope,
                decl.name.span,
                ErrorKind::Redefinition(decl.name.name.clone()),
            ));
        }

        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            params.push(Param {
                name: param.name.name.clone(),
                ty: self.resolve_type(scope, &param.ty)?,
                by_ref: param.by_ref,
            });
        }
        let return_type = match &decl.returns {
            Some(ty) => Some(self.resolve_type(scope, ty)?),
            None => None,
        };

        let callable = Rc::new(Callable {
            name: decl.name.name.clone(),
            params,
            return_type,
            body: Body::User(Rc::clone(decl)),
        });
        tracing::debug!(name = %callable.name, function = is_function, "routine defined");
        let frame = self.frame_mut(root, decl.name.span)?;
        let table = if is_function {
            &mut frame.functions
        } else {
            &mut frame.procedures
        };
        table.insert(callable.name.clone(), callable);
        Ok(())
    }
}
