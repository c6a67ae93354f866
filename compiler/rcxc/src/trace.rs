//! Verbose pre-rewrite node trace.
//!
//! With `verbose` set, every node of a unit is logged before any pass
//! touches it — the "what did the parser actually hand us" view that
//! makes unsupported-shape warnings actionable.

use std::path::Path;

use rcx_ast::{Ast, NodeId};

pub(crate) fn trace_unit(ast: &Ast, root: NodeId, path: &Path) {
    ast.walk(root, &mut |ast, id| {
        tracing::info!(
            path = %path.display(),
            kind = ast.kind(id).kind_name(),
            span = ?ast.span(id),
            "previsit"
        );
    });
}
