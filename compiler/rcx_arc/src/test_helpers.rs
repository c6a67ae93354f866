//! Shared fixtures for the instrumentation pass tests.
//!
//! The type vocabulary mirrors the demo project the tool is pointed at in
//! anger: counted data types under `rc.demo.`, a managed consumer, an
//! unmanaged utility type, and the lazy-sequence helper.

use rcx_ast::{Ast, CallTarget, Callee, NodeId, NodeKind, TypeIdx, VarId};
use rcx_sem::{Bindings, Pool, RefClassifier, VarInfo, VarKind};

pub(crate) const MARKER: &str = "rc.runtime.RefCounted";

pub(crate) struct DemoTypes {
    pub(crate) data_set: TypeIdx,
    pub(crate) data_set_array: TypeIdx,
    pub(crate) consumer: TypeIdx,
    pub(crate) text: TypeIdx,
    pub(crate) seq: TypeIdx,
}

pub(crate) fn demo_pool() -> (Pool, DemoTypes) {
    let mut pool = Pool::new();
    let marker = pool.class(MARKER, None);
    let data_set = pool.class("rc.demo.DataSet", Some(marker));
    let data_set_array = pool.array_of(data_set);
    let consumer = pool.class("rc.demo.Consumer", None);
    let text = pool.class("util.Text", None);
    let seq = pool.class("stream.Seq", None);
    (
        pool,
        DemoTypes {
            data_set,
            data_set_array,
            consumer,
            text,
            seq,
        },
    )
}

pub(crate) fn classifier(pool: &Pool) -> RefClassifier<'_> {
    RefClassifier::new(pool, MARKER)
}

/// Declare a variable and return its id.
pub(crate) fn bind(
    ast: &mut Ast,
    bindings: &mut Bindings,
    name: &str,
    ty: TypeIdx,
    kind: VarKind,
) -> VarId {
    let name = ast.intern(name);
    bindings.declare(VarInfo { name, ty, kind })
}

/// A resolved call target declared by `declaring`.
pub(crate) fn target(declaring: TypeIdx) -> Option<CallTarget> {
    Some(CallTarget {
        declaring,
        ret: None,
    })
}

/// `consume(<args>)` against a declaring type.
pub(crate) fn consuming_call(
    ast: &mut Ast,
    declaring: TypeIdx,
    args: Vec<NodeId>,
) -> NodeId {
    let name = ast.intern("consume");
    ast.new_method_call(None, name, args, target(declaring))
}

/// Count release operations naming `var` anywhere under `root` —
/// `x.release()` and `Elem.releaseAll(x)` both count.
pub(crate) fn count_releases_of(ast: &Ast, root: NodeId, var: VarId) -> usize {
    let mut count = 0;
    ast.walk(root, &mut |ast, id| {
        let NodeKind::Call { callee, args, .. } = ast.kind(id) else {
            return;
        };
        let Callee::Method { receiver, name } = callee else {
            return;
        };
        match ast.name(*name) {
            "release" => {
                if receiver.is_some_and(|r| is_ident_of(ast, r, var)) {
                    count += 1;
                }
            }
            "releaseAll" => {
                if args.first().is_some_and(|&a| is_ident_of(ast, a, var)) {
                    count += 1;
                }
            }
            _ => {}
        }
    });
    count
}

/// Count acquire operations naming `var` anywhere under `root`.
pub(crate) fn count_acquires_of(ast: &Ast, root: NodeId, var: VarId) -> usize {
    let mut count = 0;
    ast.walk(root, &mut |ast, id| {
        let NodeKind::Call { callee, args, .. } = ast.kind(id) else {
            return;
        };
        let Callee::Method { receiver, name } = callee else {
            return;
        };
        match ast.name(*name) {
            "acquire" => {
                if receiver.is_some_and(|r| is_ident_of(ast, r, var)) {
                    count += 1;
                }
            }
            "acquireAll" => {
                if args.first().is_some_and(|&a| is_ident_of(ast, a, var)) {
                    count += 1;
                }
            }
            _ => {}
        }
    });
    count
}

fn is_ident_of(ast: &Ast, id: NodeId, var: VarId) -> bool {
    matches!(ast.kind(id), NodeKind::Ident { binding: Some(b), .. } if *b == var)
}
