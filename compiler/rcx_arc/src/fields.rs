//! Field mutation rewriting: ownership transfer at field stores.
//!
//! A store into a counted-reference field both abandons the field's prior
//! value and takes ownership of the new one. Every assignment targeting an
//! instance field of counted-reference type, appearing as a direct
//! expression statement within a block, becomes a release-old /
//! acquire-new sequence:
//!
//! - bare-identifier right side — a null-guarded release of the current
//!   value goes before the statement, and the right side becomes an
//!   acquire of the identifier:
//!   `if (this.f != null) { this.f.release(); } this.f = x.acquire();`
//! - non-trivial right side — the right side is evaluated into a fresh
//!   temporary first, so it is evaluated exactly once and the old value
//!   is not released before the new one is known to exist:
//!   `X temp1 = <expr>; if (this.f != null) { this.f.release(); }
//!    this.f = temp1.acquire();`
//! - `null` right side — release-then-clear; acquiring null would fault,
//!   so only the guard is inserted.
//!
//! Any other shape (a field assignment in a condition, a bare branch,
//! a nested expression) is skipped with a warning.

use rcx_ast::{Ast, BinOp, NameAllocator, NodeId, NodeKind, TypeIdx};
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};
use rcx_sem::{protocol, Bindings, RefClassifier, VarInfo, VarKind};

struct Site {
    stmt: NodeId,
    assign: NodeId,
    lhs: NodeId,
    rhs: NodeId,
    field_ty: TypeIdx,
    elem: Option<TypeIdx>,
}

/// Rewrite counted-reference field assignments into release-old /
/// acquire-new sequences.
pub fn rewrite_field_mutations(
    ast: &mut Ast,
    root: NodeId,
    bindings: &mut Bindings,
    classifier: &RefClassifier,
    diag: &mut DiagnosticQueue,
) {
    let mut names = NameAllocator::for_unit(ast, root);

    let mut sites: Vec<Site> = Vec::new();
    for id in ast.preorder(root) {
        let NodeKind::ExprStmt { expr } = ast.kind(id) else {
            continue;
        };
        let expr = *expr;
        let NodeKind::Assign { lhs, rhs } = ast.kind(expr) else {
            continue;
        };
        let (lhs, rhs) = (*lhs, *rhs);
        let NodeKind::FieldAccess {
            binding: Some(field_var),
            ..
        } = ast.kind(lhs)
        else {
            continue;
        };
        let field_var = *field_var;
        if !matches!(bindings.kind(field_var), VarKind::Field { .. }) {
            continue;
        }
        let field_ty = bindings.ty(field_var);
        if !classifier.is_counted(field_ty) {
            continue;
        }
        if ast.stmt_position(id).is_none() {
            diag.push(Diagnostic::warning(
                "field assignment not directly inside a block; site skipped",
                "Assign",
                ast.span(id),
            ));
            continue;
        }
        sites.push(Site {
            stmt: id,
            assign: expr,
            lhs,
            rhs,
            field_ty,
            elem: classifier.counted_element(field_ty),
        });
    }

    for site in sites {
        rewrite_site(ast, bindings, &mut names, &site, diag);
    }
}

fn rewrite_site(
    ast: &mut Ast,
    bindings: &mut Bindings,
    names: &mut NameAllocator,
    site: &Site,
    diag: &mut DiagnosticQueue,
) {
    let Some((block, index)) = ast.stmt_position(site.stmt) else {
        diag.push(Diagnostic::warning(
            "field assignment moved out of its block before rewriting",
            "Assign",
            ast.span(site.stmt),
        ));
        return;
    };
    let span = ast.span(site.stmt);

    match ast.kind(site.rhs).clone() {
        NodeKind::Ident { .. } => {
            let guard = null_guarded_release(ast, site.lhs, site.elem);
            let wrapper = acquire_of(ast, site.rhs, site.elem);
            ast.rewire(site.assign, site.rhs, wrapper);
            ast.insert_stmt(block, index, guard);
            diag.push(Diagnostic::info(
                "released prior field value and acquired replacement",
                "Assign",
                span,
            ));
        }
        NodeKind::Null => {
            let guard = null_guarded_release(ast, site.lhs, site.elem);
            ast.insert_stmt(block, index, guard);
            diag.push(Diagnostic::info(
                "released prior field value before clearing",
                "Assign",
                span,
            ));
        }
        _ => {
            let temp_name = names.fresh(ast, "temp");
            let temp_var = bindings.declare(VarInfo {
                name: temp_name,
                ty: site.field_ty,
                kind: VarKind::Local,
            });
            let local = ast.new_local(temp_name, site.field_ty, Some(temp_var), Some(site.rhs));
            let temp_use = ast.new_ident(temp_name, Some(temp_var));
            let wrapper = acquire_of(ast, temp_use, site.elem);
            ast.rewire(site.assign, site.rhs, wrapper);

            let guard = null_guarded_release(ast, site.lhs, site.elem);
            ast.insert_stmt(block, index, local);
            ast.insert_stmt(block, index + 1, guard);
            diag.push(Diagnostic::info(
                format!(
                    "captured replacement into `{}`, released prior field value",
                    ast.name(temp_name)
                ),
                "Assign",
                span,
            ));
        }
    }
}

/// `if (<field> != null) { <release of field>; }`
fn null_guarded_release(ast: &mut Ast, field_access: NodeId, elem: Option<TypeIdx>) -> NodeId {
    let current = ast.clone_subtree(field_access);
    let null = ast.new_null();
    let cond = ast.new_binary(BinOp::Ne, current, null);

    let subject = ast.clone_subtree(field_access);
    let release = release_of(ast, subject, elem);
    let stmt = ast.new_expr_stmt(release);
    let then_block = ast.new_block(vec![stmt]);
    ast.new_if(cond, then_block, None)
}

/// `subject.acquire()`, or `Elem.acquireAll(subject)` for arrays.
pub(crate) fn acquire_of(ast: &mut Ast, subject: NodeId, elem: Option<TypeIdx>) -> NodeId {
    match elem {
        Some(elem) => {
            let receiver = ast.new_type_name(elem);
            let name = ast.intern(protocol::ACQUIRE_ALL);
            ast.new_method_call(Some(receiver), name, vec![subject], None)
        }
        None => {
            let name = ast.intern(protocol::ACQUIRE);
            ast.new_method_call(Some(subject), name, vec![], None)
        }
    }
}

/// `subject.release()`, or `Elem.releaseAll(subject)` for arrays.
pub(crate) fn release_of(ast: &mut Ast, subject: NodeId, elem: Option<TypeIdx>) -> NodeId {
    match elem {
        Some(elem) => {
            let receiver = ast.new_type_name(elem);
            let name = ast.intern(protocol::RELEASE_ALL);
            ast.new_method_call(Some(receiver), name, vec![subject], None)
        }
        None => {
            let name = ast.intern(protocol::RELEASE);
            ast.new_method_call(Some(subject), name, vec![], None)
        }
    }
}
