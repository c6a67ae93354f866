//! Release injection at scope exits.
//!
//! For every counted-reference ownership site the binder resolved, locates
//! the owning scope and applies last-use analysis:
//!
//! - **method parameter / lambda parameter** — the body block is analyzed;
//!   a lambda passed directly as the callback argument to a lazy-sequence
//!   receiver is exempt (its invocation count and timing are not
//!   guaranteed by ordinary control flow — a known limitation, recorded,
//!   never silently miscompiled); a lambda whose body is not a block is
//!   skipped with a warning.
//! - **block-local declaration** — the enclosing block is analyzed.
//! - **field** — a release of the field is prepended to the enclosing
//!   type's `_free` hook; a missing hook is a warning.
//!
//! Per mention: a non-return last mention gets a release statement right
//! after it; a bare-identifier return transfers ownership to the caller
//! and gets nothing; a complex return is rewritten to capture its operand
//! into a fresh temporary before the release:
//! `T temp1 = <expr>; x.release(); return temp1;` — the release happens
//! after the value is safely captured, and the returned value itself is
//! never released.
//!
//! A binding with no mention at all receives exactly one release
//! immediately after its declaration site (parameters: at body start).

use rcx_ast::{Ast, NameAllocator, NodeId, NodeKind, TypeIdx, VarId};
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};
use rcx_sem::{protocol, Bindings, NamespacePolicy, RefClassifier, VarInfo, VarKind};

use crate::fields::release_of;
use crate::last_use::{last_mentions, MentionKind};

enum Site {
    /// A parameter or local analyzed against a body/enclosing block.
    /// `decl_stmt` is `Some` for locals: an unused local's release goes
    /// right after its declaration, an unused parameter's at body start.
    Scope {
        var: VarId,
        block: NodeId,
        decl_stmt: Option<NodeId>,
    },
    /// A counted field released in its type's free hook.
    Field { var: VarId, decl: NodeId },
}

/// Insert releases for every counted-reference ownership site in the unit.
pub fn inject_releases(
    ast: &mut Ast,
    root: NodeId,
    bindings: &mut Bindings,
    classifier: &RefClassifier,
    policy: &NamespacePolicy,
    diag: &mut DiagnosticQueue,
) {
    let mut names = NameAllocator::for_unit(ast, root);
    let sites = collect_sites(ast, root, bindings, classifier, policy, diag);
    for site in sites {
        match site {
            Site::Scope {
                var,
                block,
                decl_stmt,
            } => {
                release_in_scope(
                    ast, bindings, classifier, &mut names, var, block, decl_stmt, diag,
                );
            }
            Site::Field { var, decl } => {
                release_field(ast, bindings, classifier, policy, var, decl, diag);
            }
        }
    }
}

fn collect_sites(
    ast: &Ast,
    root: NodeId,
    bindings: &Bindings,
    classifier: &RefClassifier,
    policy: &NamespacePolicy,
    diag: &mut DiagnosticQueue,
) -> Vec<Site> {
    let mut sites: Vec<Site> = Vec::new();
    for id in ast.preorder(root) {
        match ast.kind(id) {
            NodeKind::Method { params, body, .. } => {
                let body = *body;
                for var in counted_params(ast, bindings, classifier, params) {
                    match body {
                        Some(block) => sites.push(Site::Scope {
                            var,
                            block,
                            decl_stmt: None,
                        }),
                        None => diag.push(Diagnostic::debug(
                            "counted parameter of a bodyless method; nothing to release",
                            "Param",
                            ast.span(id),
                        )),
                    }
                }
            }
            NodeKind::Lambda { params, body } => {
                let body = *body;
                let counted = counted_params(ast, bindings, classifier, params);
                if counted.is_empty() {
                    continue;
                }
                if is_lazy_seq_callback(ast, id, classifier, policy) {
                    diag.push(Diagnostic::debug(
                        "lazy-sequence callback exempt from release injection",
                        "Lambda",
                        ast.span(id),
                    ));
                    continue;
                }
                if !matches!(ast.kind(body), NodeKind::Block { .. }) {
                    diag.push(Diagnostic::warning(
                        "cannot inject releases into a non-block lambda body",
                        "Lambda",
                        ast.span(id),
                    ));
                    continue;
                }
                for var in counted {
                    sites.push(Site::Scope {
                        var,
                        block: body,
                        decl_stmt: None,
                    });
                }
            }
            NodeKind::Local {
                binding: Some(var), ..
            } => {
                let var = *var;
                if !classifier.is_counted(bindings.ty(var)) {
                    continue;
                }
                match ast.stmt_position(id) {
                    Some((block, _)) => sites.push(Site::Scope {
                        var,
                        block,
                        decl_stmt: Some(id),
                    }),
                    None => diag.push(Diagnostic::warning(
                        "counted local not directly inside a block; site skipped",
                        "Local",
                        ast.span(id),
                    )),
                }
            }
            NodeKind::Field {
                binding: Some(var), ..
            } => {
                let var = *var;
                if classifier.is_counted(bindings.ty(var)) {
                    sites.push(Site::Field { var, decl: id });
                }
            }
            _ => {}
        }
    }
    sites
}

/// Bound parameters of counted-reference type.
fn counted_params(
    ast: &Ast,
    bindings: &Bindings,
    classifier: &RefClassifier,
    params: &[NodeId],
) -> Vec<VarId> {
    params
        .iter()
        .filter_map(|&p| match ast.kind(p) {
            NodeKind::Param {
                binding: Some(var), ..
            } if classifier.is_counted(bindings.ty(*var)) => Some(*var),
            _ => None,
        })
        .collect()
}

/// Whether `lambda` is passed directly as an argument to a call whose
/// declaring type is a lazy-sequence abstraction.
fn is_lazy_seq_callback(
    ast: &Ast,
    lambda: NodeId,
    classifier: &RefClassifier,
    policy: &NamespacePolicy,
) -> bool {
    let Some(parent) = ast.parent(lambda) else {
        return false;
    };
    let NodeKind::Call {
        args,
        target: Some(target),
        ..
    } = ast.kind(parent)
    else {
        return false;
    };
    args.contains(&lambda) && policy.is_lazy_seq(classifier.pool(), target.declaring)
}

#[allow(clippy::too_many_arguments)]
fn release_in_scope(
    ast: &mut Ast,
    bindings: &mut Bindings,
    classifier: &RefClassifier,
    names: &mut NameAllocator,
    var: VarId,
    block: NodeId,
    decl_stmt: Option<NodeId>,
    diag: &mut DiagnosticQueue,
) {
    let mentions = last_mentions(ast, block, var);
    if mentions.is_empty() {
        // Unbound by any mention: one release at the declaration site.
        let at = decl_stmt
            .and_then(|stmt| ast.stmt_position(stmt))
            .map_or(0, |(_, index)| index + 1);
        let release = release_statement(ast, bindings, classifier, var);
        ast.insert_stmt(block, at, release);
        diag.push(Diagnostic::debug(
            format!("released unused `{}`", var_name(ast, bindings, var)),
            "Block",
            ast.span(block),
        ));
        return;
    }

    for mention in mentions {
        match mention.kind {
            MentionKind::Straight => {
                insert_release_after(ast, bindings, classifier, mention.stmt, var, diag);
            }
            MentionKind::Return { complex: false } => {
                // Ownership transfers to the caller with the returned
                // identifier; releasing here would free the result.
                tracing::trace!(
                    var = var_name(ast, bindings, var),
                    "bare-identifier return transfers ownership"
                );
            }
            MentionKind::Return { complex: true } => {
                rewrite_complex_return(
                    ast, bindings, classifier, names, mention.stmt, var, diag,
                );
            }
        }
    }
}

fn insert_release_after(
    ast: &mut Ast,
    bindings: &Bindings,
    classifier: &RefClassifier,
    stmt: NodeId,
    var: VarId,
    diag: &mut DiagnosticQueue,
) {
    let Some((block, index)) = ast.stmt_position(stmt) else {
        diag.push(Diagnostic::warning(
            format!(
                "last mention of `{}` not directly inside a block; release skipped",
                var_name(ast, bindings, var)
            ),
            "Block",
            ast.span(stmt),
        ));
        return;
    };
    let span = ast.span(stmt);
    let release = release_statement(ast, bindings, classifier, var);
    ast.insert_stmt(block, index + 1, release);
    diag.push(Diagnostic::info(
        format!(
            "released `{}` after its last mention",
            var_name(ast, bindings, var)
        ),
        "Block",
        span,
    ));
}

/// `return <expr>;` → `T temp = <expr>; x.release(); return temp;`
fn rewrite_complex_return(
    ast: &mut Ast,
    bindings: &mut Bindings,
    classifier: &RefClassifier,
    names: &mut NameAllocator,
    ret: NodeId,
    var: VarId,
    diag: &mut DiagnosticQueue,
) {
    let NodeKind::Return { value: Some(expr) } = ast.kind(ret) else {
        return;
    };
    let expr = *expr;
    let span = ast.span(ret);

    let Some(temp_ty) = static_type(ast, bindings, expr).or_else(|| enclosing_return_type(ast, ret))
    else {
        diag.push(Diagnostic::warning(
            format!(
                "cannot type the capture temporary for `{}`; release skipped",
                var_name(ast, bindings, var)
            ),
            "Return",
            span,
        ));
        return;
    };

    // A return that is itself a bare branch gets wrapped in a block so the
    // capture sequence has somewhere to live.
    let (block, index) = match ast.stmt_position(ret) {
        Some(position) => position,
        None => {
            let Some(parent) = ast.parent(ret) else {
                return;
            };
            let wrapper = ast.new_block(vec![ret]);
            if !ast.rewire(parent, ret, wrapper) {
                diag.push(Diagnostic::warning(
                    "cannot wrap bare-branch return for the capture rewrite",
                    "Return",
                    span,
                ));
                return;
            }
            (wrapper, 0)
        }
    };

    let temp_name = names.fresh(ast, "temp");
    let temp_var = bindings.declare(VarInfo {
        name: temp_name,
        ty: temp_ty,
        kind: VarKind::Local,
    });
    let local = ast.new_local(temp_name, temp_ty, Some(temp_var), Some(expr));
    let temp_use = ast.new_ident(temp_name, Some(temp_var));
    ast.rewire(ret, expr, temp_use);

    let release = release_statement(ast, bindings, classifier, var);
    ast.insert_stmt(block, index, local);
    ast.insert_stmt(block, index + 1, release);

    diag.push(Diagnostic::info(
        format!(
            "captured complex return into `{}` and released `{}`",
            ast.name(temp_name),
            var_name(ast, bindings, var)
        ),
        "Return",
        span,
    ));
}

fn release_field(
    ast: &mut Ast,
    bindings: &Bindings,
    classifier: &RefClassifier,
    policy: &NamespacePolicy,
    var: VarId,
    decl: NodeId,
    diag: &mut DiagnosticQueue,
) {
    let Some(owner) = ast.parent(decl) else {
        return;
    };
    let NodeKind::TypeDecl {
        binding, members, ..
    } = ast.kind(owner)
    else {
        diag.push(Diagnostic::warning(
            format!(
                "counted field `{}` not owned by a type declaration",
                var_name(ast, bindings, var)
            ),
            "Field",
            ast.span(decl),
        ));
        return;
    };
    if !policy.is_managed(classifier.pool(), *binding) {
        diag.push(Diagnostic::debug(
            "field owner outside the managed namespace; free hook untouched",
            "Field",
            ast.span(decl),
        ));
        return;
    }

    let free_hook = members.iter().copied().find(|&member| {
        matches!(
            ast.kind(member),
            NodeKind::Method { name, .. } if ast.name(*name) == protocol::FREE_HOOK
        )
    });
    let hook_body = free_hook.and_then(|hook| match ast.kind(hook) {
        NodeKind::Method { body, .. } => *body,
        _ => None,
    });
    let Some(hook_body) = hook_body else {
        diag.push(Diagnostic::warning(
            format!(
                "no `{}` hook for counted field `{}`; release skipped",
                protocol::FREE_HOOK,
                var_name(ast, bindings, var)
            ),
            "Field",
            ast.span(decl),
        ));
        return;
    };

    let field_name = bindings.info(var).name;
    let this = ast.new_this();
    let access = ast.new_field_access(this, field_name, Some(var));
    let elem = classifier.counted_element(bindings.ty(var));
    let release = release_of(ast, access, elem);
    let stmt = ast.new_expr_stmt(release);
    ast.insert_stmt(hook_body, 0, stmt);

    diag.push(Diagnostic::info(
        format!(
            "released field `{}` in the free hook",
            ast.name(field_name)
        ),
        "Field",
        ast.span(decl),
    ));
}

/// `x.release();` or `Elem.releaseAll(x);` as a statement.
fn release_statement(
    ast: &mut Ast,
    bindings: &Bindings,
    classifier: &RefClassifier,
    var: VarId,
) -> NodeId {
    let info = bindings.info(var).clone();
    let subject = ast.new_ident(info.name, Some(var));
    let elem = classifier.counted_element(info.ty);
    let release = release_of(ast, subject, elem);
    ast.new_expr_stmt(release)
}

/// Static type of an expression, as far as the resolved bindings carry:
/// identifier and field bindings, call return types, cast targets.
fn static_type(ast: &Ast, bindings: &Bindings, expr: NodeId) -> Option<TypeIdx> {
    match ast.kind(expr) {
        NodeKind::Ident {
            binding: Some(var), ..
        }
        | NodeKind::FieldAccess {
            binding: Some(var), ..
        } => Some(bindings.ty(*var)),
        NodeKind::Call {
            target: Some(target),
            ..
        } => target.ret,
        NodeKind::Cast { ty, .. } => Some(*ty),
        _ => None,
    }
}

/// Return type of the enclosing method, stopping at lambda boundaries
/// (a lambda's return type is not recorded in the tree).
fn enclosing_return_type(ast: &Ast, from: NodeId) -> Option<TypeIdx> {
    let mut current = ast.parent(from);
    while let Some(id) = current {
        match ast.kind(id) {
            NodeKind::Method { return_ty, .. } => return *return_ty,
            NodeKind::Lambda { .. } => return None,
            _ => current = ast.parent(id),
        }
    }
    None
}

fn var_name(ast: &Ast, bindings: &Bindings, var: VarId) -> String {
    ast.name(bindings.info(var).name).to_owned()
}
