use pretty_assertions::assert_eq;

use rcx_ast::{Ast, Callee, NodeKind};
use rcx_diagnostic::DiagnosticQueue;
use rcx_sem::{Bindings, NamespacePolicy, VarKind};

use crate::test_helpers::{bind, classifier, consuming_call, count_acquires_of, demo_pool};

use super::inject_acquires;

#[test]
fn wraps_bare_identifier_argument_at_managed_call() {
    let (pool, types) = demo_pool();
    let mut ast = Ast::new();
    let mut bindings = Bindings::new();
    let x = bind(&mut ast, &mut bindings, "x", types.data_set, VarKind::Local);

    let arg = ast.ident_named("x", Some(x));
    let call = consuming_call(&mut ast, types.consumer, vec![arg]);
    let stmt = ast.new_expr_stmt(call);
    let root = ast.new_block(vec![stmt]);

    let classifier = classifier(&pool);
    let policy = NamespacePolicy::default();
    let mut diag = DiagnosticQueue::new();
    inject_acquires(&mut ast, root, &bindings, &classifier, &policy, &mut diag);

    let NodeKind::Call { args, .. } = ast.kind(call) else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    let NodeKind::Call {
        callee: Callee::Method { receiver, name },
        ..
    } = ast.kind(args[0])
    else {
        panic!("expected acquire wrapper");
    };
    assert_eq!(ast.name(*name), "acquire");
    assert_eq!(*receiver, Some(arg));
    assert_eq!(count_acquires_of(&ast, root, x), 1);
    assert_eq!(diag.info_count(), 1);
}

#[test]
fn array_arguments_use_the_bulk_form() {
    let (pool, types) = demo_pool();
    let mut ast = Ast::new();
    let mut bindings = Bindings::new();
    let arr = bind(
        &mut ast,
        &mut bindings,
        "arr",
        types.data_set_array,
        VarKind::Local,
    );

    let arg = ast.ident_named("arr", Some(arr));
    let call = consuming_call(&mut ast, types.consumer, vec![arg]);
    let stmt = ast.new_expr_stmt(call);
    let root = ast.new_block(vec![stmt]);

    let classifier = classifier(&pool);
    let policy = NamespacePolicy::default();
    let mut diag = DiagnosticQueue::new();
    inject_acquires(&mut ast, root, &bindings, &classifier, &policy, &mut diag);

    let NodeKind::Call { args, .. } = ast.kind(call) else {
        panic!("expected call");
    };
    let NodeKind::Call {
        callee: Callee::Method { receiver, name },
        args: wrapper_args,
        ..
    } = ast.kind(args[0])
    else {
        panic!("expected acquireAll wrapper");
    };
    assert_eq!(ast.name(*name), "acquireAll");
    assert_eq!(wrapper_args, &vec![arg]);
    let Some(receiver) = *receiver else {
        panic!("expected receiver");
    };
    let NodeKind::TypeName { ty } = ast.kind(receiver) else {
        panic!("expected element type receiver");
    };
    assert_eq!(*ty, types.data_set);
}

#[test]
fn unmanaged_callee_is_untouched() {
    let (pool, types) = demo_pool();
    let mut ast = Ast::new();
    let mut bindings = Bindings::new();
    let x = bind(&mut ast, &mut bindings, "x", types.data_set, VarKind::Local);

    let arg = ast.ident_named("x", Some(x));
    let call = consuming_call(&mut ast, types.text, vec![arg]);
    let stmt = ast.new_expr_stmt(call);
    let root = ast.new_block(vec![stmt]);

    let classifier = classifier(&pool);
    let policy = NamespacePolicy::default();
    let mut diag = DiagnosticQueue::new();
    inject_acquires(&mut ast, root, &bindings, &classifier, &policy, &mut diag);

    assert_eq!(count_acquires_of(&ast, root, x), 0);
    assert!(diag.is_empty());
}

#[test]
fn non_identifier_and_uncounted_arguments_are_untouched() {
    let (pool, types) = demo_pool();
    let mut ast = Ast::new();
    let mut bindings = Bindings::new();
    let x = bind(&mut ast, &mut bindings, "x", types.data_set, VarKind::Local);
    let s = bind(&mut ast, &mut bindings, "s", types.text, VarKind::Local);

    // consume(compute(x), s): neither argument is a bare counted ident.
    let inner_arg = ast.ident_named("x", Some(x));
    let compute = ast.intern("compute");
    let nested = ast.new_method_call(None, compute, vec![inner_arg], None);
    let plain = ast.ident_named("s", Some(s));
    let call = consuming_call(&mut ast, types.consumer, vec![nested, plain]);
    let stmt = ast.new_expr_stmt(call);
    let root = ast.new_block(vec![stmt]);

    let classifier = classifier(&pool);
    let policy = NamespacePolicy::default();
    let mut diag = DiagnosticQueue::new();
    inject_acquires(&mut ast, root, &bindings, &classifier, &policy, &mut diag);

    assert_eq!(count_acquires_of(&ast, root, x), 0);
    assert_eq!(count_acquires_of(&ast, root, s), 0);
}

#[test]
fn constructions_and_super_delegations_are_wrapped_too() {
    let (pool, types) = demo_pool();
    let mut ast = Ast::new();
    let mut bindings = Bindings::new();
    let x = bind(&mut ast, &mut bindings, "x", types.data_set, VarKind::Local);
    let y = bind(&mut ast, &mut bindings, "y", types.data_set, VarKind::Local);

    let ctor_arg = ast.ident_named("x", Some(x));
    let ctor = ast.new_ctor_call(
        types.consumer,
        vec![ctor_arg],
        crate::test_helpers::target(types.consumer),
    );
    let ctor_stmt = ast.new_expr_stmt(ctor);

    let super_arg = ast.ident_named("y", Some(y));
    let super_call =
        ast.new_super_call(None, vec![super_arg], crate::test_helpers::target(types.consumer));
    let super_stmt = ast.new_expr_stmt(super_call);

    let root = ast.new_block(vec![ctor_stmt, super_stmt]);

    let classifier = classifier(&pool);
    let policy = NamespacePolicy::default();
    let mut diag = DiagnosticQueue::new();
    inject_acquires(&mut ast, root, &bindings, &classifier, &policy, &mut diag);

    assert_eq!(count_acquires_of(&ast, root, x), 1);
    assert_eq!(count_acquires_of(&ast, root, y), 1);
}

#[test]
fn unbound_identifiers_are_skipped() {
    let (pool, types) = demo_pool();
    let mut ast = Ast::new();
    let bindings = Bindings::new();

    let arg = ast.ident_named("values", None);
    let call = consuming_call(&mut ast, types.consumer, vec![arg]);
    let stmt = ast.new_expr_stmt(call);
    let root = ast.new_block(vec![stmt]);

    let classifier = classifier(&pool);
    let policy = NamespacePolicy::default();
    let mut diag = DiagnosticQueue::new();
    inject_acquires(&mut ast, root, &bindings, &classifier, &policy, &mut diag);

    let NodeKind::Call { args, .. } = ast.kind(call) else {
        panic!("expected call");
    };
    assert_eq!(args, &vec![arg]);
}
