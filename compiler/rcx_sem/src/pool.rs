//! Interning type pool.
//!
//! The external binder registers every type a unit references here and
//! hands the instrumenter [`TypeIdx`] handles. Classes carry their
//! qualified name and superclass link (the chain the counted-reference
//! classifier walks); array types intern per element type.

use rustc_hash::FxHashMap;

use rcx_ast::{TypeIdx, TypeNames};

/// One pool entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeInfo {
    Class {
        qualified: String,
        superclass: Option<TypeIdx>,
    },
    Array {
        elem: TypeIdx,
    },
}

/// Shared, append-only type table.
///
/// Read-only during instrumentation (the binder populates it up front;
/// synthesis pre-interns the array types it needs), which is what lets
/// independent units be processed in parallel against one pool.
pub struct Pool {
    types: Vec<TypeInfo>,
    by_qualified: FxHashMap<String, TypeIdx>,
    arrays: FxHashMap<TypeIdx, TypeIdx>,
}

impl Pool {
    pub fn new() -> Self {
        Pool {
            types: Vec::new(),
            by_qualified: FxHashMap::default(),
            arrays: FxHashMap::default(),
        }
    }

    /// Intern a class type by qualified name.
    ///
    /// Re-registering an existing name returns the existing handle; the
    /// first registration's superclass wins.
    pub fn class(&mut self, qualified: &str, superclass: Option<TypeIdx>) -> TypeIdx {
        if let Some(&idx) = self.by_qualified.get(qualified) {
            return idx;
        }
        let idx = TypeIdx::new(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(TypeInfo::Class {
            qualified: qualified.to_owned(),
            superclass,
        });
        self.by_qualified.insert(qualified.to_owned(), idx);
        idx
    }

    /// Intern the array type over `elem`.
    pub fn array_of(&mut self, elem: TypeIdx) -> TypeIdx {
        if let Some(&idx) = self.arrays.get(&elem) {
            return idx;
        }
        let idx = TypeIdx::new(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(TypeInfo::Array { elem });
        self.arrays.insert(elem, idx);
        idx
    }

    pub fn lookup(&self, qualified: &str) -> Option<TypeIdx> {
        self.by_qualified.get(qualified).copied()
    }

    pub fn info(&self, idx: TypeIdx) -> &TypeInfo {
        &self.types[idx.raw() as usize]
    }

    pub fn is_array(&self, idx: TypeIdx) -> bool {
        matches!(self.info(idx), TypeInfo::Array { .. })
    }

    /// Element type for arrays, `None` for classes.
    pub fn element_type(&self, idx: TypeIdx) -> Option<TypeIdx> {
        match self.info(idx) {
            TypeInfo::Array { elem } => Some(*elem),
            TypeInfo::Class { .. } => None,
        }
    }

    /// Direct superclass, `None` for root classes and arrays.
    pub fn superclass(&self, idx: TypeIdx) -> Option<TypeIdx> {
        match self.info(idx) {
            TypeInfo::Class { superclass, .. } => *superclass,
            TypeInfo::Array { .. } => None,
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeNames for Pool {
    fn qualified_name(&self, ty: TypeIdx) -> String {
        match self.info(ty) {
            TypeInfo::Class { qualified, .. } => qualified.clone(),
            TypeInfo::Array { elem } => format!("{}[]", self.qualified_name(*elem)),
        }
    }
}
