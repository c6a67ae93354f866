//! Instrumentation stripping.
//!
//! Rewinds a unit to its uninstrumented baseline so the later passes can
//! regenerate everything from scratch — which is what makes the whole
//! pipeline idempotent. Two steps:
//!
//! 1. **Protocol members**: every counted-reference type loses its
//!    generated `acquire`/`release`/`acquireAll`/`releaseAll`/`_free`
//!    members, matched by name.
//! 2. **Protocol calls**: every call to a protocol name is replaced by its
//!    *subject* — the receiver for unary calls, the sole argument for bulk
//!    calls. Substitution happens in place when the call sits in an
//!    argument, initializer, or assignment right-hand-side position; a
//!    bare expression statement is deleted outright, collapsing any
//!    wrapper left trivially empty. Anything else is left untouched with
//!    a warning.

use rcx_ast::{Ast, Callee, NodeId, NodeKind};
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};
use rcx_sem::{protocol, RefClassifier};

/// Strip all generated instrumentation from a unit.
pub fn strip_unit(
    ast: &mut Ast,
    root: NodeId,
    classifier: &RefClassifier,
    diag: &mut DiagnosticQueue,
) {
    remove_protocol_members(ast, root, classifier, diag);
    strip_protocol_calls(ast, root, diag);
}

/// Remove protocol members from counted-reference type declarations.
fn remove_protocol_members(
    ast: &mut Ast,
    root: NodeId,
    classifier: &RefClassifier,
    diag: &mut DiagnosticQueue,
) {
    for decl in ast.preorder(root) {
        let NodeKind::TypeDecl { binding, members, .. } = ast.kind(decl) else {
            continue;
        };
        if !classifier.is_counted(*binding) {
            continue;
        }
        let members = members.clone();
        for member in members {
            let NodeKind::Method { name, .. } = ast.kind(member) else {
                continue;
            };
            let name = *name;
            if protocol::is_protocol_member(ast.name(name)) {
                let span = ast.span(member);
                let message = format!("removed protocol member `{}`", ast.name(name));
                ast.detach(member);
                diag.push(Diagnostic::debug(message, "Method", span));
            }
        }
    }
}

/// Replace protocol calls with their subjects, deleting bare statements.
fn strip_protocol_calls(ast: &mut Ast, root: NodeId, diag: &mut DiagnosticQueue) {
    // Snapshot first: member removal and statement deletion detach whole
    // subtrees, and deleted sites must not be revisited.
    let snapshot = ast.preorder(root);
    for call in snapshot {
        if !is_attached(ast, call, root) {
            continue;
        }
        let NodeKind::Call { callee, args, .. } = ast.kind(call) else {
            continue;
        };
        let Callee::Method { receiver, name } = callee else {
            continue;
        };
        let (receiver, name) = (*receiver, *name);
        let name_str = ast.name(name).to_owned();
        if !protocol::is_protocol_call(&name_str) {
            continue;
        }

        let subject = if protocol::is_unary_call(&name_str) {
            receiver
        } else if args.len() == 1 {
            Some(args[0])
        } else {
            None
        };
        let Some(subject) = subject else {
            diag.push(Diagnostic::warning(
                format!("cannot strip `{name_str}` call with no subject"),
                "Call",
                ast.span(call),
            ));
            continue;
        };

        let Some(parent) = ast.parent(call) else {
            continue;
        };
        match ast.kind(parent) {
            NodeKind::Call { args, .. } if args.contains(&call) => {
                substitute(ast, call, subject, &name_str, diag);
            }
            NodeKind::Local { init, .. } if *init == Some(call) => {
                substitute(ast, call, subject, &name_str, diag);
            }
            NodeKind::Assign { rhs, .. } if *rhs == call => {
                substitute(ast, call, subject, &name_str, diag);
            }
            NodeKind::ExprStmt { .. } => {
                let span = ast.span(parent);
                delete_statement(ast, parent);
                diag.push(Diagnostic::debug(
                    format!("removed bare `{name_str}` statement"),
                    "ExprStmt",
                    span,
                ));
            }
            other => {
                diag.push(Diagnostic::warning(
                    format!(
                        "cannot strip `{name_str}` call in {} position",
                        other.kind_name()
                    ),
                    other.kind_name(),
                    ast.span(call),
                ));
            }
        }
    }
}

fn substitute(
    ast: &mut Ast,
    call: NodeId,
    subject: NodeId,
    name: &str,
    diag: &mut DiagnosticQueue,
) {
    let span = ast.span(call);
    if ast.replace(call, subject) {
        diag.push(Diagnostic::debug(
            format!("replaced `{name}` call with its subject"),
            "Call",
            span,
        ));
    } else {
        diag.push(Diagnostic::warning(
            format!("failed to substitute `{name}` call"),
            "Call",
            span,
        ));
    }
}

/// Delete a statement, collapsing wrappers left trivially empty.
///
/// A branch block emptied by the deletion is itself removed when it can be
/// (an `else` slot, a bare nested block); an `if` whose `then` block
/// becomes empty with no `else` is deleted whole. A `then` block that must
/// stay (its `if` still has an `else`) is left empty.
pub(crate) fn delete_statement(ast: &mut Ast, stmt: NodeId) {
    let Some(parent) = ast.parent(stmt) else {
        return;
    };
    match ast.kind(parent) {
        NodeKind::Block { .. } => {
            ast.detach(stmt);
            if ast.block_stmts(parent).is_empty() {
                collapse_empty_block(ast, parent);
            }
        }
        NodeKind::If { else_branch, .. } => {
            // `stmt` is a bare branch statement.
            if *else_branch == Some(stmt) {
                ast.detach(stmt);
            } else {
                // A bare `then` cannot be removed alone; the whole `if` goes.
                delete_statement(ast, parent);
            }
        }
        _ => {
            ast.detach(stmt);
        }
    }
}

/// Collapse an empty block out of its parent where structure allows.
fn collapse_empty_block(ast: &mut Ast, block: NodeId) {
    let Some(parent) = ast.parent(block) else {
        return;
    };
    match ast.kind(parent) {
        NodeKind::Block { .. } => {
            // Bare nested wrapper: remove it, and keep collapsing upward.
            ast.detach(block);
            if ast.block_stmts(parent).is_empty() {
                collapse_empty_block(ast, parent);
            }
        }
        NodeKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            if *else_branch == Some(block) {
                ast.detach(block);
            } else if *then_branch == block && else_branch.is_none() {
                delete_statement(ast, parent);
            }
            // An emptied `then` with a surviving `else` stays in place.
        }
        _ => {}
    }
}

/// Whether `id`'s parent chain still reaches `root`.
pub(crate) fn is_attached(ast: &Ast, id: NodeId, root: NodeId) -> bool {
    let mut current = id;
    loop {
        if current == root {
            return true;
        }
        match ast.parent(current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests;
