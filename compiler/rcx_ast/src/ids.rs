//! Opaque semantic binding handles.
//!
//! The external binder resolves identifiers and types to these handles; the
//! tables they index live in `rcx_sem`. Keeping the newtypes here lets AST
//! nodes carry resolved bindings without a dependency on the semantic crate
//! (the same split as a front-end IR carrying type ids whose pool lives in
//! the type-system crate).

use std::fmt;

/// Handle for a resolved variable binding (local, parameter, lambda
/// parameter, or field).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        VarId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Handle for a resolved type binding in the semantic type pool.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeIdx(u32);

impl TypeIdx {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        TypeIdx(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Name lookup for type handles, implemented by the semantic type pool.
///
/// The debug renderer and diagnostics need type names but must not depend
/// on the semantic crate; this trait is the seam.
pub trait TypeNames {
    /// Fully qualified name, e.g. `rc.demo.DataSet` or `rc.demo.DataSet[]`.
    fn qualified_name(&self, ty: TypeIdx) -> String;

    /// Last segment of the qualified name, e.g. `DataSet` or `DataSet[]`.
    fn simple_name(&self, ty: TypeIdx) -> String {
        let qualified = self.qualified_name(ty);
        qualified
            .rsplit('.')
            .next()
            .map_or(qualified.clone(), ToOwned::to_owned)
    }
}
