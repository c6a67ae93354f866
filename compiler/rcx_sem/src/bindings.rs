//! Per-unit variable bindings.
//!
//! Every ownership site — local, parameter, lambda parameter, field — the
//! binder resolves gets a [`VarId`] and a row here. The syntactic kind
//! decides which scope the release injector analyzes.

use rcx_ast::{Name, TypeIdx, VarId};

/// Syntactic kind of an ownership site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarKind {
    Local,
    Param,
    LambdaParam,
    Field { owner: TypeIdx },
}

/// One resolved variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarInfo {
    pub name: Name,
    pub ty: TypeIdx,
    pub kind: VarKind,
}

/// Append-only per-unit binding table.
pub struct Bindings {
    vars: Vec<VarInfo>,
}

impl Bindings {
    pub fn new() -> Self {
        Bindings { vars: Vec::new() }
    }

    pub fn declare(&mut self, info: VarInfo) -> VarId {
        let id = VarId::new(u32::try_from(self.vars.len()).unwrap_or(u32::MAX));
        self.vars.push(info);
        id
    }

    pub fn info(&self, id: VarId) -> &VarInfo {
        &self.vars[id.raw() as usize]
    }

    pub fn ty(&self, id: VarId) -> TypeIdx {
        self.info(id).ty
    }

    pub fn kind(&self, id: VarId) -> VarKind {
        self.info(id).kind
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}
