//! Deterministic fresh-name allocation.
//!
//! Rewrites that capture expressions into temporaries need identifiers
//! that collide with nothing in the unit. A monotonic counter plus an
//! existing-identifier check gives reproducible names across runs — the
//! same input always yields the same output, which the idempotence
//! property depends on.

use rustc_hash::FxHashSet;

use crate::node::{Callee, NodeKind};
use crate::{Ast, Name, NodeId};

/// Per-pass fresh-name source.
///
/// Collision checking is against the identifiers reachable in the live
/// tree at construction time — not everything the interner has ever seen.
/// Names from a previous pipeline run whose nodes were stripped away are
/// free again, so re-instrumenting a unit allocates the same temporaries
/// and reproduces the same output.
pub struct NameAllocator {
    counter: u32,
    taken: FxHashSet<String>,
}

impl NameAllocator {
    /// Harvest every identifier-ish name reachable from `root`.
    pub fn for_unit(ast: &Ast, root: NodeId) -> Self {
        let mut taken = FxHashSet::default();
        ast.walk(root, &mut |ast, id| {
            for name in kind_names(ast.kind(id)) {
                taken.insert(ast.name(name).to_owned());
            }
        });
        NameAllocator { counter: 0, taken }
    }

    /// Allocate the next free `<prefix><n>` name and intern it.
    pub fn fresh(&mut self, ast: &mut Ast, prefix: &str) -> Name {
        loop {
            self.counter += 1;
            let candidate = format!("{prefix}{}", self.counter);
            if !self.taken.contains(&candidate) {
                self.taken.insert(candidate.clone());
                return ast.intern(&candidate);
            }
        }
    }
}

/// Every `Name` a node carries, declaration or use.
fn kind_names(kind: &NodeKind) -> Vec<Name> {
    match kind {
        NodeKind::TypeDecl { name, .. }
        | NodeKind::Field { name, .. }
        | NodeKind::Param { name, .. }
        | NodeKind::Local { name, .. }
        | NodeKind::Ident { name, .. }
        | NodeKind::Method { name, .. }
        | NodeKind::FieldAccess { name, .. }
        | NodeKind::MethodRef { name, .. } => vec![*name],
        NodeKind::Call { callee, .. } => match callee {
            Callee::Method { name, .. } => vec![*name],
            Callee::Super { name: Some(name) } => vec![*name],
            Callee::Super { name: None } | Callee::Constructor { .. } => vec![],
        },
        NodeKind::Str(value) => vec![*value],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crate::Ast;

    use super::*;

    #[test]
    fn fresh_names_are_sequential() {
        let mut ast = Ast::new();
        let root = ast.new_block(vec![]);
        let mut names = NameAllocator::for_unit(&ast, root);
        let a = names.fresh(&mut ast, "temp");
        let b = names.fresh(&mut ast, "temp");
        assert_eq!(ast.name(a), "temp1");
        assert_eq!(ast.name(b), "temp2");
    }

    #[test]
    fn fresh_skips_identifiers_in_the_tree() {
        let mut ast = Ast::new();
        let clash = ast.ident_named("temp1", None);
        let stmt = ast.new_expr_stmt(clash);
        let root = ast.new_block(vec![stmt]);

        let mut names = NameAllocator::for_unit(&ast, root);
        let first = names.fresh(&mut ast, "temp");
        assert_eq!(ast.name(first), "temp2");
    }

    #[test]
    fn stripped_names_are_free_again() {
        // A temporary from a previous run whose nodes were deleted must
        // not poison the allocator: only the live tree counts.
        let mut ast = Ast::new();
        let stale = ast.ident_named("temp1", None);
        let stmt = ast.new_expr_stmt(stale);
        let root = ast.new_block(vec![stmt]);
        ast.detach(stmt);

        let mut names = NameAllocator::for_unit(&ast, root);
        let first = names.fresh(&mut ast, "temp");
        assert_eq!(ast.name(first), "temp1");
    }
}
