use pretty_assertions::assert_eq;

use rcx_ast::{Ast, Callee, NodeId, NodeKind};
use rcx_diagnostic::DiagnosticQueue;

use crate::test_helpers::{demo_pool, MARKER};

use super::synthesize_protocol;

/// A counted type declaration with one pre-existing member.
fn counted_decl(ast: &mut Ast, ty: rcx_ast::TypeIdx) -> (NodeId, NodeId) {
    let compute = ast.intern("compute");
    let body = ast.new_block(vec![]);
    let member = ast.new_method(compute, false, vec![], None, Some(body));
    let name = ast.intern("DataSet");
    let decl = ast.new_type_decl(name, ty, vec![member]);
    (decl, member)
}

fn member_names(ast: &Ast, decl: NodeId) -> Vec<String> {
    let NodeKind::TypeDecl { members, .. } = ast.kind(decl) else {
        panic!("expected type decl");
    };
    members
        .iter()
        .map(|&m| match ast.kind(m) {
            NodeKind::Method { name, .. } => ast.name(*name).to_owned(),
            other => other.kind_name().to_owned(),
        })
        .collect()
}

#[test]
fn appends_the_four_protocol_members_in_order() {
    let (mut pool, types) = demo_pool();
    let mut ast = Ast::new();
    let (decl, _) = counted_decl(&mut ast, types.data_set);
    let root = ast.new_unit(vec![decl]);

    let mut diag = DiagnosticQueue::new();
    synthesize_protocol(&mut ast, root, &mut pool, MARKER, &mut diag);

    assert_eq!(
        member_names(&ast, decl),
        vec!["compute", "_free", "acquire", "acquireAll", "releaseAll"]
    );
    assert_eq!(diag.info_count(), 1);
}

#[test]
fn uncounted_types_are_untouched() {
    let (mut pool, types) = demo_pool();
    let mut ast = Ast::new();
    let name = ast.intern("Text");
    let decl = ast.new_type_decl(name, types.text, vec![]);
    let root = ast.new_unit(vec![decl]);

    let mut diag = DiagnosticQueue::new();
    synthesize_protocol(&mut ast, root, &mut pool, MARKER, &mut diag);

    assert_eq!(member_names(&ast, decl), Vec::<String>::new());
    assert!(diag.is_empty());
}

#[test]
fn acquire_downcasts_a_super_delegation() {
    // X acquire() { return (X) super.acquire(); }
    let (mut pool, types) = demo_pool();
    let mut ast = Ast::new();
    let (decl, _) = counted_decl(&mut ast, types.data_set);
    let root = ast.new_unit(vec![decl]);

    let mut diag = DiagnosticQueue::new();
    synthesize_protocol(&mut ast, root, &mut pool, MARKER, &mut diag);

    let NodeKind::TypeDecl { members, .. } = ast.kind(decl) else {
        panic!("expected type decl");
    };
    let acquire = members[2];
    let NodeKind::Method {
        is_static,
        return_ty,
        body: Some(body),
        ..
    } = ast.kind(acquire)
    else {
        panic!("expected acquire method");
    };
    assert!(!*is_static);
    assert_eq!(*return_ty, Some(types.data_set));

    let body = *body;
    let stmts = ast.block_stmts(body);
    assert_eq!(stmts.len(), 1);
    let NodeKind::Return { value: Some(value) } = ast.kind(stmts[0]) else {
        panic!("expected return");
    };
    let NodeKind::Cast { ty, expr } = ast.kind(*value) else {
        panic!("expected cast");
    };
    assert_eq!(*ty, types.data_set);
    assert!(matches!(
        ast.kind(*expr),
        NodeKind::Call {
            callee: Callee::Super { name: Some(_) },
            ..
        }
    ));
}

#[test]
fn bulk_helpers_filter_nulls_and_use_the_array_type() {
    let (mut pool, types) = demo_pool();
    let mut ast = Ast::new();
    let (decl, _) = counted_decl(&mut ast, types.data_set);
    let root = ast.new_unit(vec![decl]);

    let mut diag = DiagnosticQueue::new();
    synthesize_protocol(&mut ast, root, &mut pool, MARKER, &mut diag);

    let NodeKind::TypeDecl { members, .. } = ast.kind(decl) else {
        panic!("expected type decl");
    };
    let acquire_all = members[3];
    let release_all = members[4];

    // acquireAll: static X[](X[]).
    let NodeKind::Method {
        is_static,
        params,
        return_ty,
        ..
    } = ast.kind(acquire_all)
    else {
        panic!("expected acquireAll");
    };
    assert!(*is_static);
    assert_eq!(*return_ty, Some(types.data_set_array));
    assert_eq!(params.len(), 1);
    let NodeKind::Param { ty, binding, .. } = ast.kind(params[0]) else {
        panic!("expected param");
    };
    assert_eq!(*ty, types.data_set_array);
    // Generated nodes carry no bindings: later passes must skip them.
    assert_eq!(*binding, None);

    // Both bodies contain a null filter.
    for member in [acquire_all, release_all] {
        let mut found_null_filter = false;
        ast.walk(member, &mut |ast, id| {
            if let NodeKind::Call {
                callee: Callee::Method { name, .. },
                ..
            } = ast.kind(id)
            {
                if ast.name(*name) == "filter" {
                    found_null_filter = true;
                }
            }
        });
        assert!(found_null_filter, "bulk helper must skip null elements");
    }

    // releaseAll: static void(X[]).
    let NodeKind::Method {
        is_static,
        return_ty,
        ..
    } = ast.kind(release_all)
    else {
        panic!("expected releaseAll");
    };
    assert!(*is_static);
    assert_eq!(*return_ty, None);
}

#[test]
fn free_hook_starts_empty() {
    let (mut pool, types) = demo_pool();
    let mut ast = Ast::new();
    let (decl, _) = counted_decl(&mut ast, types.data_set);
    let root = ast.new_unit(vec![decl]);

    let mut diag = DiagnosticQueue::new();
    synthesize_protocol(&mut ast, root, &mut pool, MARKER, &mut diag);

    let NodeKind::TypeDecl { members, .. } = ast.kind(decl) else {
        panic!("expected type decl");
    };
    let NodeKind::Method {
        body: Some(body), ..
    } = ast.kind(members[1])
    else {
        panic!("expected _free with body");
    };
    assert!(ast.block_stmts(*body).is_empty());
}
