use pretty_assertions::assert_eq;

use rcx_ast::{Ast, BinOp, NodeId, NodeKind, TypeIdx, VarId};
use rcx_diagnostic::DiagnosticQueue;
use rcx_sem::{Pool, RefClassifier};

use super::strip_unit;

const MARKER: &str = "rc.runtime.RefCounted";

fn counted_pool() -> (Pool, TypeIdx, TypeIdx) {
    let mut pool = Pool::new();
    let marker = pool.class(MARKER, None);
    let data_set = pool.class("rc.demo.DataSet", Some(marker));
    let text = pool.class("util.Text", None);
    (pool, data_set, text)
}

fn v(n: u32) -> VarId {
    VarId::new(n)
}

/// `x.acquire()` with `x` bound to `binding`.
fn acquire_call(ast: &mut Ast, binding: VarId) -> NodeId {
    let x = ast.ident_named("x", Some(binding));
    let acquire = ast.intern("acquire");
    ast.new_method_call(Some(x), acquire, vec![], None)
}

#[test]
fn removes_protocol_members_from_counted_types_only() {
    let (pool, data_set, plain) = counted_pool();
    let mut ast = Ast::new();

    let member = |ast: &mut Ast, name: &str| {
        let name = ast.intern(name);
        let body = ast.new_block(vec![]);
        ast.new_method(name, false, vec![], None, Some(body))
    };
    let m_acquire = member(&mut ast, "acquire");
    let m_free = member(&mut ast, "_free");
    let m_compute = member(&mut ast, "compute");
    let counted_name = ast.intern("DataSet");
    let counted_decl =
        ast.new_type_decl(counted_name, data_set, vec![m_acquire, m_free, m_compute]);

    let p_acquire = member(&mut ast, "acquire");
    let plain_name = ast.intern("Text");
    let plain_decl = ast.new_type_decl(plain_name, plain, vec![p_acquire]);

    let root = ast.new_unit(vec![counted_decl, plain_decl]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    let NodeKind::TypeDecl { members, .. } = ast.kind(counted_decl) else {
        panic!("expected type decl");
    };
    assert_eq!(members, &vec![m_compute]);

    // Non-counted types keep members even with protocol names.
    let NodeKind::TypeDecl { members, .. } = ast.kind(plain_decl) else {
        panic!("expected type decl");
    };
    assert_eq!(members, &vec![p_acquire]);
}

#[test]
fn substitutes_call_argument() {
    let (pool, _, _) = counted_pool();
    let mut ast = Ast::new();

    let inner = acquire_call(&mut ast, v(0));
    let consume = ast.intern("consume");
    let outer = ast.new_method_call(None, consume, vec![inner], None);
    let stmt = ast.new_expr_stmt(outer);
    let root = ast.new_block(vec![stmt]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    let NodeKind::Call { args, .. } = ast.kind(outer) else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    assert!(matches!(ast.kind(args[0]), NodeKind::Ident { .. }));
}

#[test]
fn substitutes_local_initializer() {
    let (pool, data_set, _) = counted_pool();
    let mut ast = Ast::new();

    let init = acquire_call(&mut ast, v(0));
    let y = ast.intern("y");
    let local = ast.new_local(y, data_set, Some(v(1)), Some(init));
    let root = ast.new_block(vec![local]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    let NodeKind::Local { init: Some(init), .. } = ast.kind(local) else {
        panic!("expected initialized local");
    };
    assert!(matches!(ast.kind(*init), NodeKind::Ident { .. }));
}

#[test]
fn substitutes_assignment_rhs_and_bulk_subject() {
    let (pool, data_set, _) = counted_pool();
    let mut ast = Ast::new();

    // y = DataSet.acquireAll(arr);
    let arr = ast.ident_named("arr", Some(v(0)));
    let type_name = ast.new_type_name(data_set);
    let acquire_all = ast.intern("acquireAll");
    let bulk = ast.new_method_call(Some(type_name), acquire_all, vec![arr], None);
    let y = ast.ident_named("y", Some(v(1)));
    let assign = ast.new_assign(y, bulk);
    let stmt = ast.new_expr_stmt(assign);
    let root = ast.new_block(vec![stmt]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    let NodeKind::Assign { rhs, .. } = ast.kind(assign) else {
        panic!("expected assignment");
    };
    assert_eq!(*rhs, arr);
}

#[test]
fn deletes_bare_statement() {
    let (pool, _, _) = counted_pool();
    let mut ast = Ast::new();

    let x = ast.ident_named("x", Some(v(0)));
    let release = ast.intern("release");
    let call = ast.new_method_call(Some(x), release, vec![], None);
    let release_stmt = ast.new_expr_stmt(call);
    let keep = ast.ident_named("other", Some(v(1)));
    let keep_stmt = ast.new_expr_stmt(keep);
    let root = ast.new_block(vec![keep_stmt, release_stmt]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    assert_eq!(ast.block_stmts(root), &[keep_stmt]);
}

#[test]
fn collapses_emptied_null_guard() {
    // if (this.f != null) { this.f.release(); } — stripping the release
    // leaves the whole guard trivially empty; it goes too.
    let (pool, _, _) = counted_pool();
    let mut ast = Ast::new();

    let f = ast.intern("f");
    let this1 = ast.new_this();
    let access1 = ast.new_field_access(this1, f, Some(v(0)));
    let release = ast.intern("release");
    let call = ast.new_method_call(Some(access1), release, vec![], None);
    let release_stmt = ast.new_expr_stmt(call);
    let then_block = ast.new_block(vec![release_stmt]);

    let this2 = ast.new_this();
    let access2 = ast.new_field_access(this2, f, Some(v(0)));
    let null = ast.new_null();
    let cond = ast.new_binary(BinOp::Ne, access2, null);
    let guard = ast.new_if(cond, then_block, None);

    let keep = ast.ident_named("other", Some(v(1)));
    let keep_stmt = ast.new_expr_stmt(keep);
    let root = ast.new_block(vec![guard, keep_stmt]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    assert_eq!(ast.block_stmts(root), &[keep_stmt]);
}

#[test]
fn unsupported_position_warns_and_leaves_site() {
    let (pool, _, _) = counted_pool();
    let mut ast = Ast::new();

    let call = acquire_call(&mut ast, v(0));
    let ret = ast.new_return(Some(call));
    let root = ast.new_block(vec![ret]);

    let classifier = RefClassifier::new(&pool, MARKER);
    let mut diag = DiagnosticQueue::new();
    strip_unit(&mut ast, root, &classifier, &mut diag);

    assert_eq!(diag.warning_count(), 1);
    let NodeKind::Return { value } = ast.kind(ret) else {
        panic!("expected return");
    };
    assert_eq!(*value, Some(call));
}
