//! Canonicalization to a fixpoint.
//!
//! Runs after stripping and normalizes the shapes the stripper and earlier
//! instrumentation leave behind, so the injection passes see one canonical
//! form:
//!
//! - a block whose sole statement sits directly inside another block is
//!   replaced by that statement;
//! - `T t = <expr>; x = t;` becomes `x = <expr>;`
//! - `T t = <expr>; return t;` becomes `return <expr>;`
//!
//! The whole traversal repeats until a sweep makes zero changes. Each
//! rewrite strictly removes nodes from the attached tree, so the loop
//! terminates: the change count per sweep is bounded by the shrinking
//! tree.

use rcx_ast::{Ast, Name, NodeId, NodeKind, VarId};
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};

use crate::strip::is_attached;

/// Canonicalize until a full sweep changes nothing. Returns the total
/// number of rewrites applied.
pub fn canonicalize(ast: &mut Ast, root: NodeId, diag: &mut DiagnosticQueue) -> usize {
    let mut total = 0;
    let mut sweeps = 0u32;
    loop {
        sweeps += 1;
        let changes = sweep(ast, root, diag);
        total += changes;
        if changes == 0 {
            break;
        }
    }
    tracing::debug!(sweeps, changes = total, "canonicalizer reached fixpoint");
    total
}

/// One full traversal. A block is rescanned on the next sweep after any
/// rewrite inside it; within a sweep each block applies at most a handful
/// of non-overlapping rewrites from a statement snapshot.
fn sweep(ast: &mut Ast, root: NodeId, diag: &mut DiagnosticQueue) -> usize {
    let mut changes = 0;
    let blocks: Vec<NodeId> = ast
        .preorder(root)
        .into_iter()
        .filter(|&id| matches!(ast.kind(id), NodeKind::Block { .. }))
        .collect();

    for block in blocks {
        if !is_attached(ast, block, root) {
            continue;
        }
        changes += flatten_trivial_blocks(ast, block, diag);
        changes += inline_preceding_locals(ast, block, diag);
    }
    changes
}

/// Replace single-statement blocks nested directly in `block` by their
/// statement.
fn flatten_trivial_blocks(ast: &mut Ast, block: NodeId, diag: &mut DiagnosticQueue) -> usize {
    let mut changes = 0;
    for stmt in ast.block_stmts(block).to_vec() {
        let NodeKind::Block { stmts } = ast.kind(stmt) else {
            continue;
        };
        if stmts.len() != 1 {
            continue;
        }
        let only = stmts[0];
        let span = ast.span(stmt);
        if ast.replace(stmt, only) {
            changes += 1;
            diag.push(Diagnostic::debug(
                "flattened single-statement block",
                "Block",
                span,
            ));
        }
    }
    changes
}

/// Inline `T t = <expr>;` into an immediately following `x = t;` or
/// `return t;`.
fn inline_preceding_locals(ast: &mut Ast, block: NodeId, diag: &mut DiagnosticQueue) -> usize {
    let mut changes = 0;
    let stmts = ast.block_stmts(block).to_vec();
    for (i, &stmt) in stmts.iter().enumerate() {
        // The consumer site: an assignment or return of a bare identifier.
        let (consumer, ident) = match ast.kind(stmt) {
            NodeKind::ExprStmt { expr } => match ast.kind(*expr) {
                NodeKind::Assign { rhs, .. }
                    if matches!(ast.kind(*rhs), NodeKind::Ident { .. }) =>
                {
                    (*expr, *rhs)
                }
                _ => continue,
            },
            NodeKind::Return { value: Some(value) }
                if matches!(ast.kind(*value), NodeKind::Ident { .. }) =>
            {
                (stmt, *value)
            }
            _ => continue,
        };

        let preceding = if i > 0 { Some(stmts[i - 1]) } else { None };
        let Some(local) = preceding.filter(|&p| declares_ident(ast, p, ident)) else {
            diag.push(Diagnostic::debug(
                "bare identifier has no inlinable preceding declaration",
                ast.kind(stmt).kind_name(),
                ast.span(stmt),
            ));
            continue;
        };
        if ast.parent(local) != Some(block) {
            // Consumed by an earlier rewrite in this sweep.
            continue;
        }
        let NodeKind::Local {
            init: Some(init), ..
        } = ast.kind(local)
        else {
            continue;
        };
        let init = *init;

        let span = ast.span(stmt);
        ast.detach(init);
        if ast.rewire(consumer, ident, init) {
            ast.detach(local);
            changes += 1;
            diag.push(Diagnostic::debug(
                "inlined preceding declaration into its single use",
                ast.kind(stmt).kind_name(),
                span,
            ));
        }
    }
    changes
}

/// Whether `stmt` is a single-fragment local declaration, with an
/// initializer, declaring the variable `ident` names.
fn declares_ident(ast: &Ast, stmt: NodeId, ident: NodeId) -> bool {
    let NodeKind::Local {
        name: local_name,
        binding: local_binding,
        init,
        ..
    } = ast.kind(stmt)
    else {
        return false;
    };
    if init.is_none() {
        return false;
    }
    let NodeKind::Ident { name, binding } = ast.kind(ident) else {
        return false;
    };
    bindings_match(*local_binding, *binding, *local_name, *name)
}

/// Bindings decide when both sides have them; names otherwise.
fn bindings_match(
    declared: Option<VarId>,
    used: Option<VarId>,
    declared_name: Name,
    used_name: Name,
) -> bool {
    match (declared, used) {
        (Some(declared), Some(used)) => declared == used,
        _ => declared_name == used_name,
    }
}
