//! The per-file work item.

use std::path::PathBuf;

use rcx_ast::{Ast, NodeId};
use rcx_sem::Bindings;

/// One parsed source file, owned by the pipeline for the duration of
/// processing and mutated in place.
///
/// Produced by the external parser/binder: the arena holds the tree, the
/// bindings table holds the resolved ownership sites, and `root` is the
/// unit node. After instrumentation the unit is rendered, diffed against
/// its original rendering, and persisted only when changed.
pub struct ProgramUnit {
    pub path: PathBuf,
    pub ast: Ast,
    pub bindings: Bindings,
    pub root: NodeId,
}

impl ProgramUnit {
    pub fn new(path: impl Into<PathBuf>, ast: Ast, bindings: Bindings, root: NodeId) -> Self {
        ProgramUnit {
            path: path.into(),
            ast,
            bindings,
            root,
        }
    }
}
