//! Acquire injection at managed call sites.
//!
//! Callees declared in the managed namespace take ownership of any
//! counted-reference argument passed by identifier. The caller must
//! therefore supply a fresh acquired copy, keeping its own binding valid
//! for its own later release: every bare-identifier argument of
//! counted-reference type at such a call is wrapped in `ident.acquire()`,
//! or `Elem.acquireAll(ident)` when the argument's static type is an
//! array of counted-reference elements.
//!
//! Applies uniformly to method calls, constructions, and
//! super-delegations — anything carrying a resolved call target. Sites
//! are collected before any mutation so freshly inserted wrappers are
//! never revisited.

use rcx_ast::{Ast, NodeId, NodeKind, TypeIdx, VarId};
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};
use rcx_sem::{protocol, Bindings, NamespacePolicy, RefClassifier};

struct Site {
    call: NodeId,
    arg: NodeId,
    var: VarId,
    /// `Some` when the argument is a counted-reference array: bulk form.
    elem: Option<TypeIdx>,
}

/// Wrap counted-reference identifier arguments at managed call sites.
pub fn inject_acquires(
    ast: &mut Ast,
    root: NodeId,
    bindings: &Bindings,
    classifier: &RefClassifier,
    policy: &NamespacePolicy,
    diag: &mut DiagnosticQueue,
) {
    let mut sites: Vec<Site> = Vec::new();
    for id in ast.preorder(root) {
        let NodeKind::Call {
            args,
            target: Some(target),
            ..
        } = ast.kind(id)
        else {
            continue;
        };
        if !policy.is_managed(classifier.pool(), target.declaring) {
            continue;
        }
        for &arg in args {
            let NodeKind::Ident {
                binding: Some(var), ..
            } = ast.kind(arg)
            else {
                continue;
            };
            let ty = bindings.ty(*var);
            if !classifier.is_counted(ty) {
                continue;
            }
            sites.push(Site {
                call: id,
                arg,
                var: *var,
                elem: classifier.counted_element(ty),
            });
        }
    }

    for site in sites {
        let wrapper = match site.elem {
            Some(elem) => {
                let receiver = ast.new_type_name(elem);
                let name = ast.intern(protocol::ACQUIRE_ALL);
                ast.new_method_call(Some(receiver), name, vec![site.arg], None)
            }
            None => {
                let name = ast.intern(protocol::ACQUIRE);
                ast.new_method_call(Some(site.arg), name, vec![], None)
            }
        };
        let span = ast.span(site.call);
        if ast.rewire(site.call, site.arg, wrapper) {
            let var_name = bindings.info(site.var).name;
            tracing::debug!(arg = ast.name(var_name), "acquired argument at managed call");
            diag.push(Diagnostic::info(
                format!(
                    "acquired argument `{}` at managed call",
                    ast.name(var_name)
                ),
                "Call",
                span,
            ));
        } else {
            diag.push(Diagnostic::warning(
                "argument position vanished before acquire injection",
                "Call",
                span,
            ));
        }
    }
}

#[cfg(test)]
mod tests;
