//! Lifecycle protocol synthesis.
//!
//! Appends the fixed four-member protocol to every counted-reference type
//! declaration:
//!
//! - `void _free()` — a no-op finalization hook. Per-field releases are
//!   prepended later by the release injector, not generated here.
//! - `X acquire()` — delegates to the base capability's generic acquire
//!   and downcasts: `return (X) super.acquire();`
//! - `static X[] acquireAll(X[] values)` — skips null elements, maps the
//!   survivors through `acquire`, produces a new same-typed array.
//! - `static void releaseAll(X[] values)` — skips nulls, releases the
//!   survivors for effect.
//!
//! The bulk helpers are built over the lazy-sequence API:
//! `Seq.of(values).filter(x -> x != null).map(X::acquire).toArray(n -> new X[n])`
//! and `.forEach(X::release)`. Fixed-shape boilerplate, independent of the
//! type's other members; the stripper removed any previous copy, so
//! generation is exactly-once.
//!
//! Generated nodes carry no resolved bindings — the binder has never seen
//! them — which keeps every later pass away from the boilerplate's own
//! parameters and lambdas.

use rcx_ast::{Ast, BinOp, CallTarget, Name, NodeId, NodeKind, TypeIdx, TypeNames};
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};
use rcx_sem::{protocol, Pool, RefClassifier};

/// Qualified name of the lazy-sequence helper the bulk members are built
/// over.
const LAZY_SEQ_TYPE: &str = "stream.Seq";

/// Element-count parameter type for the `toArray` sizing lambda.
const INT_TYPE: &str = "int";

/// Generate the protocol members on every counted-reference type in the
/// unit.
pub fn synthesize_protocol(
    ast: &mut Ast,
    root: NodeId,
    pool: &mut Pool,
    marker: &str,
    diag: &mut DiagnosticQueue,
) {
    let targets: Vec<(NodeId, TypeIdx, Name)> = {
        let classifier = RefClassifier::new(pool, marker);
        ast.preorder(root)
            .into_iter()
            .filter_map(|id| match ast.kind(id) {
                NodeKind::TypeDecl { name, binding, .. } if classifier.is_counted(*binding) => {
                    Some((id, *binding, *name))
                }
                _ => None,
            })
            .collect()
    };
    if targets.is_empty() {
        return;
    }

    let seq_ty = pool.class(LAZY_SEQ_TYPE, None);
    let int_ty = pool.class(INT_TYPE, None);

    for (decl, ty, type_name) in targets {
        let array_ty = pool.array_of(ty);
        let span = ast.span(decl);

        let free_hook = method_free_hook(ast);
        let acquire = method_acquire(ast, ty);
        let acquire_all = method_acquire_all(ast, ty, array_ty, seq_ty, int_ty);
        let release_all = method_release_all(ast, ty, array_ty, seq_ty);
        for member in [free_hook, acquire, acquire_all, release_all] {
            ast.push_member(decl, member);
        }

        tracing::debug!(
            type_name = pool.qualified_name(ty),
            "generated lifecycle protocol"
        );
        diag.push(Diagnostic::info(
            format!(
                "generated lifecycle protocol for `{}`",
                ast.name(type_name)
            ),
            "TypeDecl",
            span,
        ));
    }
}

/// `void _free() { }`
fn method_free_hook(ast: &mut Ast) -> NodeId {
    let name = ast.intern(protocol::FREE_HOOK);
    let body = ast.new_block(vec![]);
    ast.new_method(name, false, vec![], None, Some(body))
}

/// `X acquire() { return (X) super.acquire(); }`
fn method_acquire(ast: &mut Ast, ty: TypeIdx) -> NodeId {
    let name = ast.intern(protocol::ACQUIRE);
    let super_call = ast.new_super_call(Some(name), vec![], None);
    let cast = ast.new_cast(ty, super_call);
    let ret = ast.new_return(Some(cast));
    let body = ast.new_block(vec![ret]);
    ast.new_method(name, false, vec![], Some(ty), Some(body))
}

/// `static X[] acquireAll(X[] values) { return Seq.of(values)
///     .filter(x -> x != null).map(X::acquire).toArray(n -> new X[n]); }`
fn method_acquire_all(
    ast: &mut Ast,
    ty: TypeIdx,
    array_ty: TypeIdx,
    seq_ty: TypeIdx,
    int_ty: TypeIdx,
) -> NodeId {
    let name = ast.intern(protocol::ACQUIRE_ALL);
    let values = ast.intern("values");
    let param = ast.new_param(values, array_ty, None);

    let filtered = seq_filter_non_null(ast, seq_ty, ty, values);

    let map_name = ast.intern("map");
    let acquire_name = ast.intern(protocol::ACQUIRE);
    let acquire_ref = ast.new_method_ref(ty, acquire_name);
    let mapped = ast.new_method_call(
        Some(filtered),
        map_name,
        vec![acquire_ref],
        Some(CallTarget {
            declaring: seq_ty,
            ret: None,
        }),
    );

    let to_array_name = ast.intern("toArray");
    let n = ast.intern("n");
    let n_param = ast.new_param(n, int_ty, None);
    let n_use = ast.new_ident(n, None);
    let array_new = ast.new_array_new(ty, n_use);
    let sizing = ast.new_lambda(vec![n_param], array_new);
    let collected = ast.new_method_call(
        Some(mapped),
        to_array_name,
        vec![sizing],
        Some(CallTarget {
            declaring: seq_ty,
            ret: Some(array_ty),
        }),
    );

    let ret = ast.new_return(Some(collected));
    let body = ast.new_block(vec![ret]);
    ast.new_method(name, true, vec![param], Some(array_ty), Some(body))
}

/// `static void releaseAll(X[] values) { Seq.of(values)
///     .filter(x -> x != null).forEach(X::release); }`
fn method_release_all(ast: &mut Ast, ty: TypeIdx, array_ty: TypeIdx, seq_ty: TypeIdx) -> NodeId {
    let name = ast.intern(protocol::RELEASE_ALL);
    let values = ast.intern("values");
    let param = ast.new_param(values, array_ty, None);

    let filtered = seq_filter_non_null(ast, seq_ty, ty, values);

    let for_each_name = ast.intern("forEach");
    let release_name = ast.intern(protocol::RELEASE);
    let release_ref = ast.new_method_ref(ty, release_name);
    let each = ast.new_method_call(
        Some(filtered),
        for_each_name,
        vec![release_ref],
        Some(CallTarget {
            declaring: seq_ty,
            ret: None,
        }),
    );

    let stmt = ast.new_expr_stmt(each);
    let body = ast.new_block(vec![stmt]);
    ast.new_method(name, true, vec![param], None, Some(body))
}

/// `Seq.of(values).filter(x -> x != null)`
fn seq_filter_non_null(ast: &mut Ast, seq_ty: TypeIdx, elem_ty: TypeIdx, values: Name) -> NodeId {
    let seq_name = ast.new_type_name(seq_ty);
    let of_name = ast.intern("of");
    let values_use = ast.new_ident(values, None);
    let of_call = ast.new_method_call(
        Some(seq_name),
        of_name,
        vec![values_use],
        Some(CallTarget {
            declaring: seq_ty,
            ret: None,
        }),
    );

    let filter_name = ast.intern("filter");
    let x = ast.intern("x");
    let x_param = ast.new_param(x, elem_ty, None);
    let x_use = ast.new_ident(x, None);
    let null = ast.new_null();
    let non_null = ast.new_binary(BinOp::Ne, x_use, null);
    let filter_lambda = ast.new_lambda(vec![x_param], non_null);
    ast.new_method_call(
        Some(of_call),
        filter_name,
        vec![filter_lambda],
        Some(CallTarget {
            declaring: seq_ty,
            ret: None,
        }),
    )
}

#[cfg(test)]
mod tests;
