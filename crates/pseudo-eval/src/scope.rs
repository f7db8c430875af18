//! Scope arena and storage model.
//!
//! Every scope (the program root, one per routine call, one per record
//! initialiser) lives in a [`ScopeArena`] slot addressed by a
//! generation-tagged [`ScopeId`]. Freeing a scope bumps the slot's
//! generation, so a stale id held by a pointer is detected instead of
//! silently reaching whatever reuses the slot.
//!
//! Storage inside a scope is a flat list of [`Variable`] cells. Arrays are
//! contiguous runs of cells; records own their members inline. A [`Place`]
//! names one cell: the owning scope plus a path of cell indices, one per
//! record level.

use std::rc::Rc;

use indexmap::IndexMap;
use pseudo_types::ast::Block;

use crate::callable::Callable;
use crate::value::{DataType, EnumDef, Value};

// ══════════════════════════════════════════════════════════════════════════════
// Identity
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

/// How far a variable or array lookup may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// The current scope only.
    Local,
    /// The current scope, then the root. Intermediate scopes are skipped.
    Global,
}

/// A storage cell: the scope that owns it and the path of cell indices to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub scope: ScopeId,
    pub path: Vec<usize>,
}

impl Place {
    pub fn new(scope: ScopeId, index: usize) -> Self {
        Self {
            scope,
            path: vec![index],
        }
    }

    /// The place of member `index` inside the record stored here.
    pub fn member(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            scope: self.scope,
            path,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Storage
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    Owned(Value),
    /// A by-reference parameter; the aliased cell keeps ownership.
    Alias(Place),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub data_type: DataType,
    pub constant: bool,
    pub storage: Storage,
}

impl Variable {
    pub fn new(name: impl Into<String>, data_type: DataType, value: Value) -> Self {
        Self {
            name: name.into(),
            data_type,
            constant: false,
            storage: Storage::Owned(value),
        }
    }

    pub fn constant(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            data_type: value.data_type(),
            constant: true,
            storage: Storage::Owned(value),
        }
    }

    pub fn alias(name: impl Into<String>, data_type: DataType, target: Place) -> Self {
        Self {
            name: name.into(),
            data_type,
            constant: false,
            storage: Storage::Alias(target),
        }
    }

    /// The owned value; `None` for an alias.
    pub fn value(&self) -> Option<&Value> {
        match &self.storage {
            Storage::Owned(v) => Some(v),
            Storage::Alias(_) => None,
        }
    }
}

/// Inclusive bounds of one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dim {
    pub lower: i64,
    pub upper: i64,
}

impl Dim {
    pub fn len(&self) -> usize {
        (self.upper - self.lower + 1).max(0) as usize
    }
}

/// Array metadata. Elements are cells `start..start + len()` of the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    pub name: String,
    pub elem_type: DataType,
    pub dims: Vec<Dim>,
    pub start: usize,
}

impl Array {
    pub fn len(&self) -> usize {
        self.dims.iter().map(Dim::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat offset of an index tuple, first dimension fastest-varying.
    /// `None` when any index is outside its bounds.
    pub fn offset(&self, indices: &[i64]) -> Option<usize> {
        if indices.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0usize;
        let mut stride = 1usize;
        for (dim, &i) in self.dims.iter().zip(indices) {
            if i < dim.lower || i > dim.upper {
                return None;
            }
            offset += (i - dim.lower) as usize * stride;
            stride *= dim.len();
        }
        Some(offset)
    }
}

/// The variables and arrays of one scope or record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Members {
    cells: Vec<Variable>,
    variables: IndexMap<String, usize>,
    arrays: IndexMap<String, Array>,
}

impl Members {
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.get(name).copied()
    }

    pub fn array(&self, name: &str) -> Option<&Array> {
        self.arrays.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.arrays.contains_key(name)
    }

    pub fn cell(&self, index: usize) -> Option<&Variable> {
        self.cells.get(index)
    }

    pub fn add_variable(&mut self, variable: Variable) -> usize {
        let index = self.cells.len();
        self.variables.insert(variable.name.clone(), index);
        self.cells.push(variable);
        index
    }

    /// Add an array whose every element starts as a copy of `fill`.
    pub fn add_array(&mut self, name: &str, elem_type: DataType, dims: Vec<Dim>, fill: Value) {
        let array = Array {
            name: name.to_string(),
            elem_type: elem_type.clone(),
            dims,
            start: self.cells.len(),
        };
        let len = array.len();
        self.cells.extend(
            std::iter::repeat_with(|| Variable::new(name, elem_type.clone(), fill.clone()))
                .take(len),
        );
        self.arrays.insert(name.to_string(), array);
    }

    /// Named (non-element) variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values().filter_map(|&i| self.cells.get(i))
    }

    pub fn arrays(&self) -> impl Iterator<Item = &Array> {
        self.arrays.values()
    }

    fn walk(&self, path: &[usize]) -> Option<&Variable> {
        let (first, rest) = path.split_first()?;
        let cell = self.cells.get(*first)?;
        if rest.is_empty() {
            return Some(cell);
        }
        match &cell.storage {
            Storage::Owned(Value::Composite(record)) => record.members.walk(rest),
            _ => None,
        }
    }

    fn walk_mut(&mut self, path: &[usize]) -> Option<&mut Variable> {
        let (first, rest) = path.split_first()?;
        let cell = self.cells.get_mut(*first)?;
        if rest.is_empty() {
            return Some(cell);
        }
        match &mut cell.storage {
            Storage::Owned(Value::Composite(record)) => record.members.walk_mut(rest),
            _ => None,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Scope
// ══════════════════════════════════════════════════════════════════════════════

/// A user type definition.
#[derive(Debug, Clone)]
pub enum TypeDef {
    Enum(Rc<EnumDef>),
    Pointer { name: String, target: DataType },
    Composite { name: String, body: Rc<Block> },
}

impl TypeDef {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Enum(def) => DataType::Enum(def.name.clone()),
            Self::Pointer { name, .. } => DataType::Pointer(name.clone()),
            Self::Composite { name, .. } => DataType::Composite(name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    Program,
    Procedure,
    Function { return_type: DataType },
    Record,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub members: Members,
    pub procedures: IndexMap<String, Rc<Callable>>,
    pub functions: IndexMap<String, Rc<Callable>>,
    pub types: IndexMap<String, TypeDef>,
}

impl Scope {
    pub fn new(name: impl Into<String>, parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            name: name.into(),
            parent,
            kind,
            members: Members::default(),
            procedures: IndexMap::new(),
            functions: IndexMap::new(),
            types: IndexMap::new(),
        }
    }

    /// The enum definition declaring `value`, if any in this scope.
    pub fn enum_element(&self, value: &str) -> Option<(Rc<EnumDef>, usize)> {
        self.types.values().find_map(|def| match def {
            TypeDef::Enum(e) => e
                .values
                .iter()
                .position(|v| v == value)
                .map(|i| (Rc::clone(e), i)),
            _ => None,
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Arena
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Slot {
    generation: u32,
    scope: Option<Scope>,
}

#[derive(Debug, Default)]
pub struct ScopeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, scope: Scope) -> ScopeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.scope = Some(scope);
            return ScopeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            scope: Some(scope),
        });
        ScopeId {
            index,
            generation: 0,
        }
    }

    /// Drop a scope and invalidate every id pointing at it.
    pub fn free(&mut self, id: ScopeId) -> Option<Scope> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let scope = slot.scope.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(scope)
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.scope.as_ref()
    }

    pub fn get_mut(&mut self, id: ScopeId) -> Option<&mut Scope> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.scope.as_mut()
    }

    pub fn is_live(&self, id: ScopeId) -> bool {
        self.get(id).is_some()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.scope.is_some()).count()
    }

    /// The outermost scope of `id`'s parent chain.
    pub fn root_of(&self, id: ScopeId) -> ScopeId {
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|s| s.parent) {
            current = parent;
        }
        current
    }

    /// `true` when `ancestor` is `id` itself or on its parent chain.
    pub fn is_ancestor(&self, ancestor: ScopeId, id: ScopeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).and_then(|s| s.parent);
        }
        false
    }

    /// Find a variable cell by name.
    pub fn find_variable(&self, id: ScopeId, name: &str, mode: LookupMode) -> Option<Place> {
        self.search(id, mode, |scope| scope.members.variable_index(name))
            .map(|(sid, index)| Place::new(sid, index))
    }

    /// Find an array by name, returning its owning scope.
    pub fn find_array(&self, id: ScopeId, name: &str, mode: LookupMode) -> Option<(ScopeId, &Array)> {
        let sid = self.search(id, mode, |scope| scope.members.array(name).map(|_| ()))?.0;
        self.get(sid)?.members.array(name).map(|a| (sid, a))
    }

    fn search<T>(
        &self,
        id: ScopeId,
        mode: LookupMode,
        probe: impl Fn(&Scope) -> Option<T>,
    ) -> Option<(ScopeId, T)> {
        if let Some(found) = self.get(id).and_then(&probe) {
            return Some((id, found));
        }
        if mode == LookupMode::Local {
            return None;
        }
        let root = self.root_of(id);
        if root == id {
            return None;
        }
        self.get(root).and_then(&probe).map(|found| (root, found))
    }

    /// Follow aliases until `place` names an owning cell.
    pub fn canonical(&self, place: &Place) -> Option<Place> {
        let mut current = place.clone();
        // Alias targets are owning cells; the bound covers a corrupted chain.
        for _ in 0..8 {
            let var = self.get(current.scope)?.members.walk(&current.path)?;
            match &var.storage {
                Storage::Owned(_) => return Some(current),
                Storage::Alias(target) => current = target.clone(),
            }
        }
        None
    }

    /// The owning cell at `place`, following aliases.
    pub fn variable(&self, place: &Place) -> Option<&Variable> {
        let place = self.canonical(place)?;
        self.get(place.scope)?.members.walk(&place.path)
    }

    pub fn variable_mut(&mut self, place: &Place) -> Option<&mut Variable> {
        let place = self.canonical(place)?;
        self.get_mut(place.scope)?.members.walk_mut(&place.path)
    }

    /// The alias cell itself, without following it.
    pub fn cell(&self, place: &Place) -> Option<&Variable> {
        self.get(place.scope)?.members.walk(&place.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root_and_child() -> (ScopeArena, ScopeId, ScopeId) {
        let mut arena = ScopeArena::new();
        let root = arena.alloc(Scope::new("Program", None, ScopeKind::Program));
        let child = arena.alloc(Scope::new("Call", Some(root), ScopeKind::Procedure));
        (arena, root, child)
    }

    #[test]
    fn freed_ids_go_stale() {
        let (mut arena, root, child) = root_and_child();
        assert!(arena.free(child).is_some());
        assert!(!arena.is_live(child));
        let reused = arena.alloc(Scope::new("Other", Some(root), ScopeKind::Procedure));
        assert_ne!(reused, child);
        assert!(arena.get(child).is_none());
        assert!(arena.free(child).is_none());
        assert_eq!(arena.live_count(), 2);
    }

    #[test]
    fn global_lookup_skips_intermediate_scopes() {
        let (mut arena, root, middle) = root_and_child();
        let inner = arena.alloc(Scope::new("Inner", Some(middle), ScopeKind::Procedure));
        arena
            .get_mut(middle)
            .unwrap()
            .members
            .add_variable(Variable::new("m", DataType::Integer, Value::Integer(1)));
        arena
            .get_mut(root)
            .unwrap()
            .members
            .add_variable(Variable::new("g", DataType::Integer, Value::Integer(2)));

        assert!(arena.find_variable(inner, "m", LookupMode::Global).is_none());
        let g = arena.find_variable(inner, "g", LookupMode::Global).unwrap();
        assert_eq!(g.scope, root);
        assert!(arena.find_variable(inner, "g", LookupMode::Local).is_none());
    }

    #[test]
    fn aliases_resolve_to_the_owner() {
        let (mut arena, root, child) = root_and_child();
        let index = arena
            .get_mut(root)
            .unwrap()
            .members
            .add_variable(Variable::new("x", DataType::Integer, Value::Integer(5)));
        let owner = Place::new(root, index);
        let alias_index = arena
            .get_mut(child)
            .unwrap()
            .members
            .add_variable(Variable::alias("p", DataType::Integer, owner.clone()));
        let alias = Place::new(child, alias_index);

        assert_eq!(arena.canonical(&alias), Some(owner.clone()));
        if let Some(var) = arena.variable_mut(&alias) {
            var.storage = Storage::Owned(Value::Integer(9));
        }
        assert_eq!(
            arena.variable(&owner).and_then(Variable::value),
            Some(&Value::Integer(9))
        );
        arena.free(child);
        assert_eq!(
            arena.variable(&owner).and_then(Variable::value),
            Some(&Value::Integer(9))
        );
    }

    #[test]
    fn array_offsets_are_column_major_and_unique() {
        let array = Array {
            name: "m".into(),
            elem_type: DataType::Integer,
            dims: vec![Dim { lower: 1, upper: 3 }, Dim { lower: 0, upper: 1 }],
            start: 0,
        };
        assert_eq!(array.len(), 6);
        assert_eq!(array.offset(&[1, 0]), Some(0));
        assert_eq!(array.offset(&[2, 0]), Some(1));
        assert_eq!(array.offset(&[1, 1]), Some(3));
        assert_eq!(array.offset(&[4, 0]), None);
        assert_eq!(array.offset(&[1]), None);

        let mut seen = std::collections::HashSet::new();
        for i in 1..=3 {
            for j in 0..=1 {
                let offset = array.offset(&[i, j]).unwrap();
                assert!(offset < array.len());
                assert!(seen.insert(offset));
            }
        }
    }

    #[test]
    fn ancestry() {
        let (mut arena, root, child) = root_and_child();
        let grandchild = arena.alloc(Scope::new("G", Some(child), ScopeKind::Procedure));
        assert!(arena.is_ancestor(root, grandchild));
        assert!(arena.is_ancestor(grandchild, grandchild));
        assert!(!arena.is_ancestor(grandchild, root));
        assert_eq!(arena.root_of(grandchild), root);
    }
}
