use pretty_assertions::assert_eq;

use crate::{Ast, NodeKind, TypeIdx, TypeNames, VarId};

/// Minimal type-name table for rendering in tests; the real pool lives in
/// the semantic crate.
struct Names(Vec<&'static str>);

impl TypeNames for Names {
    fn qualified_name(&self, ty: TypeIdx) -> String {
        self.0
            .get(ty.raw() as usize)
            .map_or_else(|| format!("t{}", ty.raw()), |s| (*s).to_owned())
    }
}

fn t(n: u32) -> TypeIdx {
    TypeIdx::new(n)
}

fn v(n: u32) -> VarId {
    VarId::new(n)
}

#[test]
fn alloc_adopts_children() {
    let mut ast = Ast::new();
    let x = ast.ident_named("x", Some(v(0)));
    let stmt = ast.new_expr_stmt(x);
    let block = ast.new_block(vec![stmt]);
    assert_eq!(ast.parent(x), Some(stmt));
    assert_eq!(ast.parent(stmt), Some(block));
    assert_eq!(ast.parent(block), None);
}

#[test]
fn replace_rewires_parent_links() {
    let mut ast = Ast::new();
    let x = ast.ident_named("x", Some(v(0)));
    let stmt = ast.new_expr_stmt(x);
    let y = ast.ident_named("y", Some(v(1)));

    assert!(ast.replace(x, y));
    assert_eq!(ast.parent(y), Some(stmt));
    assert_eq!(ast.parent(x), None);
    assert!(matches!(
        ast.kind(stmt),
        NodeKind::ExprStmt { expr } if *expr == y
    ));
}

#[test]
fn replace_without_parent_refuses() {
    let mut ast = Ast::new();
    let x = ast.ident_named("x", None);
    let y = ast.ident_named("y", None);
    assert!(!ast.replace(x, y));
}

#[test]
fn detach_statement_shrinks_block() {
    let mut ast = Ast::new();
    let a = ast.ident_named("a", None);
    let s1 = ast.new_expr_stmt(a);
    let b = ast.ident_named("b", None);
    let s2 = ast.new_expr_stmt(b);
    let block = ast.new_block(vec![s1, s2]);

    assert!(ast.detach(s1));
    assert_eq!(ast.block_stmts(block), &[s2]);
    assert_eq!(ast.parent(s1), None);
    // The detached node is still addressable.
    assert!(matches!(ast.kind(s1), NodeKind::ExprStmt { .. }));
}

#[test]
fn detach_required_slot_refuses() {
    let mut ast = Ast::new();
    let cond = ast.ident_named("c", None);
    let then = ast.new_block(vec![]);
    let _if_stmt = ast.new_if(cond, then, None);
    assert!(!ast.detach(cond));
}

#[test]
fn insert_stmt_at_position() {
    let mut ast = Ast::new();
    let a = ast.ident_named("a", None);
    let s1 = ast.new_expr_stmt(a);
    let block = ast.new_block(vec![s1]);
    let b = ast.ident_named("b", None);
    let s2 = ast.new_expr_stmt(b);

    assert!(ast.insert_stmt(block, 0, s2));
    assert_eq!(ast.block_stmts(block), &[s2, s1]);
    assert_eq!(ast.parent(s2), Some(block));
}

#[test]
fn clone_subtree_is_independent() {
    let mut ast = Ast::new();
    let recv = ast.ident_named("x", Some(v(0)));
    let name = ast.intern("acquire");
    let call = ast.new_method_call(Some(recv), name, vec![], None);

    let copy = ast.clone_subtree(call);
    assert_ne!(copy, call);

    // Mutating the copy leaves the original untouched.
    let y = ast.ident_named("y", Some(v(1)));
    let copy_recv = ast.children(copy)[0];
    assert!(ast.replace(copy_recv, y));
    let original_recv = ast.children(call)[0];
    assert_eq!(original_recv, recv);
}

#[test]
fn mentions_var_sees_idents_accesses_and_declarations() {
    let mut ast = Ast::new();
    let x = ast.ident_named("x", Some(v(7)));
    let f = ast.intern("f");
    let access = ast.new_field_access(x, f, Some(v(8)));
    let stmt = ast.new_expr_stmt(access);

    assert!(ast.mentions_var(stmt, v(7)));
    assert!(ast.mentions_var(stmt, v(8)));
    assert!(!ast.mentions_var(stmt, v(9)));

    let name = ast.intern("d");
    let local = ast.new_local(name, t(0), Some(v(3)), None);
    assert!(ast.mentions_var(local, v(3)));
}

#[test]
fn stmt_position_finds_block_slot() {
    let mut ast = Ast::new();
    let a = ast.ident_named("a", None);
    let s1 = ast.new_expr_stmt(a);
    let b = ast.ident_named("b", None);
    let s2 = ast.new_expr_stmt(b);
    let block = ast.new_block(vec![s1, s2]);

    assert_eq!(ast.stmt_position(s2), Some((block, 1)));
    assert_eq!(ast.stmt_position(block), None);
}

#[test]
fn render_round_trips_simple_method() {
    let mut ast = Ast::new();
    let names = Names(vec!["rc.demo.Value"]);

    let value_name = ast.intern("value");
    let x = ast.ident_named("x", Some(v(0)));
    let this = ast.new_this();
    let access = ast.new_field_access(this, value_name, Some(v(1)));
    let assign = ast.new_assign(access, x);
    let stmt = ast.new_expr_stmt(assign);
    let body = ast.new_block(vec![stmt]);

    let param_name = ast.intern("x");
    let param = ast.new_param(param_name, t(0), Some(v(0)));
    let method_name = ast.intern("setValue");
    let method = ast.new_method(method_name, false, vec![param], None, Some(body));

    let rendered = crate::render(&ast, method, &names);
    assert_eq!(
        rendered,
        "void setValue(Value x) {\n  this.value = x;\n}\n"
    );
}
