//! Index-addressed mutable AST arena.
//!
//! The source tree the rewriter works on is parent-linked and mutated in
//! place. Instead of a cyclic node↔parent object graph, nodes live in a
//! flat arena addressed by stable [`NodeId`]s, each carrying an optional
//! parent index. Deletion detaches a node from its parent but never removes
//! it from the arena, so outstanding ids stay valid across any sequence of
//! rewrites.
//!
//! Structural operations:
//!
//! - [`Ast::replace`] — swap a child for another node in its parent's slot.
//! - [`Ast::detach`] — remove a node from its parent (list slots shrink,
//!   optional slots become `None`, required slots refuse).
//! - [`Ast::insert_stmt`] — insert a statement at a position in a block.
//! - [`Ast::clone_subtree`] — deep copy for reuse in rewritten positions.
//!
//! Every mutation maintains parent links; passes never touch them directly.

use smallvec::SmallVec;

use crate::node::{Callee, NodeKind};
use crate::{Interner, Name, Span, VarId};

/// Stable index of a node in its unit's arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One arena slot: the node's kind, parent link, and source span.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub span: Span,
}

/// Per-unit AST arena with its own string interner.
pub struct Ast {
    nodes: Vec<Node>,
    interner: Interner,
}

impl Ast {
    pub fn new() -> Self {
        Ast {
            nodes: Vec::new(),
            interner: Interner::new(),
        }
    }

    /// Number of slots ever allocated (detached nodes included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    pub fn intern(&mut self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn name(&self, name: Name) -> &str {
        self.interner.resolve(name)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Allocate a node and adopt every child referenced by `kind`.
    ///
    /// Children are re-parented to the new node; constructors compose
    /// bottom-up, so adoption here keeps parent links correct without any
    /// separate wiring step.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            parent: None,
            span,
        });
        for child in self.children(id) {
            self.nodes[child.index()].parent = Some(id);
        }
        id
    }

    /// All direct children, in source order.
    pub fn children(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        let mut out = SmallVec::new();
        match &self.nodes[id.index()].kind {
            NodeKind::Unit { types } => out.extend_from_slice(types),
            NodeKind::TypeDecl { members, .. } => out.extend_from_slice(members),
            NodeKind::Method { params, body, .. } => {
                out.extend_from_slice(params);
                if let Some(body) = body {
                    out.push(*body);
                }
            }
            NodeKind::Field { init, .. } | NodeKind::Local { init, .. } => {
                if let Some(init) = init {
                    out.push(*init);
                }
            }
            NodeKind::Block { stmts } => out.extend_from_slice(stmts),
            NodeKind::ExprStmt { expr } => out.push(*expr),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                if let Some(else_branch) = else_branch {
                    out.push(*else_branch);
                }
            }
            NodeKind::Return { value } => {
                if let Some(value) = value {
                    out.push(*value);
                }
            }
            NodeKind::FieldAccess { base, .. } => out.push(*base),
            NodeKind::Call { callee, args, .. } => {
                if let Callee::Method {
                    receiver: Some(receiver),
                    ..
                } = callee
                {
                    out.push(*receiver);
                }
                out.extend_from_slice(args);
            }
            NodeKind::Assign { lhs, rhs } | NodeKind::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            NodeKind::Lambda { params, body } => {
                out.extend_from_slice(params);
                out.push(*body);
            }
            NodeKind::ArrayNew { len, .. } => out.push(*len),
            NodeKind::Cast { expr, .. } => out.push(*expr),
            NodeKind::Param { .. }
            | NodeKind::Ident { .. }
            | NodeKind::This
            | NodeKind::MethodRef { .. }
            | NodeKind::TypeName { .. }
            | NodeKind::Null
            | NodeKind::Int(_)
            | NodeKind::Str(_) => {}
        }
        out
    }

    /// Preorder walk of the subtree rooted at `root`.
    pub fn walk(&self, root: NodeId, f: &mut impl FnMut(&Ast, NodeId)) {
        f(self, root);
        for child in self.children(root) {
            self.walk(child, f);
        }
    }

    /// Collect every node of the subtree in preorder.
    ///
    /// Passes snapshot the tree with this before mutating, so freshly
    /// inserted nodes are never revisited within one pass.
    pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(root, &mut |_, id| out.push(id));
        out
    }

    /// Whether the subtree mentions the given variable binding.
    ///
    /// A mention is any identifier or field access resolved to `var`, or
    /// the declaration introducing it (the declaration's own name counts,
    /// matching how the binder resolves declaration names).
    pub fn mentions_var(&self, root: NodeId, var: VarId) -> bool {
        let hit = match &self.nodes[root.index()].kind {
            NodeKind::Ident { binding, .. }
            | NodeKind::FieldAccess { binding, .. }
            | NodeKind::Local { binding, .. }
            | NodeKind::Param { binding, .. } => *binding == Some(var),
            _ => false,
        };
        if hit {
            return true;
        }
        self.children(root)
            .into_iter()
            .any(|child| self.mentions_var(child, var))
    }

    /// Swap `old` for `new` in `old`'s parent slot.
    ///
    /// Returns `false` when `old` has no parent or the parent no longer
    /// references it (already rewritten by an earlier site).
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(parent) = self.nodes[old.index()].parent else {
            return false;
        };
        let mut replaced = false;
        for slot in child_slots_mut(&mut self.nodes[parent.index()].kind) {
            if *slot == old {
                *slot = new;
                replaced = true;
                break;
            }
        }
        if replaced {
            self.nodes[new.index()].parent = Some(parent);
            self.nodes[old.index()].parent = None;
            tracing::trace!(old = old.index(), new = new.index(), "replaced node");
        }
        replaced
    }

    /// Patch `parent`'s slot holding `old` to reference `new` instead,
    /// without touching `old`'s parent link.
    ///
    /// This is the wrap operation: build a new node that adopts `old` as a
    /// child (taking its parent link), then rewire the original parent's
    /// slot to the wrapper. [`Ast::replace`] cannot express this because
    /// adoption has already moved `old`'s parent link to the wrapper.
    pub fn rewire(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> bool {
        let mut rewired = false;
        for slot in child_slots_mut(&mut self.nodes[parent.index()].kind) {
            if *slot == old {
                *slot = new;
                rewired = true;
                break;
            }
        }
        if rewired {
            self.nodes[new.index()].parent = Some(parent);
        }
        rewired
    }

    /// Remove `id` from its parent.
    ///
    /// List slots shrink, optional slots become `None`. Required slots (an
    /// `if` condition, an assignment operand) refuse with `false`; callers
    /// surface a diagnostic instead.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.index()].parent else {
            return false;
        };
        let removed = remove_from_kind(&mut self.nodes[parent.index()].kind, id);
        if removed {
            self.nodes[id.index()].parent = None;
            tracing::trace!(node = id.index(), "detached node");
        }
        removed
    }

    /// Insert `stmt` into a block at `index` (clamped to the statement
    /// count). Returns `false` when `block` is not a `Block`.
    pub fn insert_stmt(&mut self, block: NodeId, index: usize, stmt: NodeId) -> bool {
        let NodeKind::Block { stmts } = &mut self.nodes[block.index()].kind else {
            return false;
        };
        let at = index.min(stmts.len());
        stmts.insert(at, stmt);
        self.nodes[stmt.index()].parent = Some(block);
        true
    }

    /// Append a member declaration to a type declaration.
    pub fn push_member(&mut self, type_decl: NodeId, member: NodeId) -> bool {
        let NodeKind::TypeDecl { members, .. } = &mut self.nodes[type_decl.index()].kind else {
            return false;
        };
        members.push(member);
        self.nodes[member.index()].parent = Some(type_decl);
        true
    }

    /// Position of `stmt` within its parent block, if its parent is one.
    pub fn stmt_position(&self, stmt: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes[stmt.index()].parent?;
        let NodeKind::Block { stmts } = &self.nodes[parent.index()].kind else {
            return None;
        };
        stmts
            .iter()
            .position(|&s| s == stmt)
            .map(|index| (parent, index))
    }

    /// Statements of a block, empty for non-blocks.
    pub fn block_stmts(&self, block: NodeId) -> &[NodeId] {
        match &self.nodes[block.index()].kind {
            NodeKind::Block { stmts } => stmts,
            _ => &[],
        }
    }

    /// Deep-copy the subtree rooted at `id` into fresh nodes.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let span = self.nodes[id.index()].span;
        let mut kind = self.nodes[id.index()].kind.clone();
        // The clone still references the original children; remap each slot
        // to a fresh copy before allocating.
        let mut clones: SmallVec<[(usize, NodeId); 4]> = SmallVec::new();
        for (slot_index, slot) in child_slots_mut(&mut kind).into_iter().enumerate() {
            clones.push((slot_index, *slot));
        }
        for (slot_index, original) in clones {
            let copy = self.clone_subtree(original);
            if let Some(slot) = child_slots_mut(&mut kind).into_iter().nth(slot_index) {
                *slot = copy;
            }
        }
        self.alloc(kind, span)
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable references to every `NodeId` slot of a node, in source order.
///
/// Backbone of [`Ast::replace`] and [`Ast::clone_subtree`]: one exhaustive
/// match instead of per-operation variant lists.
fn child_slots_mut(kind: &mut NodeKind) -> SmallVec<[&mut NodeId; 4]> {
    let mut out: SmallVec<[&mut NodeId; 4]> = SmallVec::new();
    match kind {
        NodeKind::Unit { types } => out.extend(types.iter_mut()),
        NodeKind::TypeDecl { members, .. } => out.extend(members.iter_mut()),
        NodeKind::Method { params, body, .. } => {
            out.extend(params.iter_mut());
            if let Some(body) = body {
                out.push(body);
            }
        }
        NodeKind::Field { init, .. } | NodeKind::Local { init, .. } => {
            if let Some(init) = init {
                out.push(init);
            }
        }
        NodeKind::Block { stmts } => out.extend(stmts.iter_mut()),
        NodeKind::ExprStmt { expr } => out.push(expr),
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.push(cond);
            out.push(then_branch);
            if let Some(else_branch) = else_branch {
                out.push(else_branch);
            }
        }
        NodeKind::Return { value } => {
            if let Some(value) = value {
                out.push(value);
            }
        }
        NodeKind::FieldAccess { base, .. } => out.push(base),
        NodeKind::Call { callee, args, .. } => {
            if let Callee::Method {
                receiver: Some(receiver),
                ..
            } = callee
            {
                out.push(receiver);
            }
            out.extend(args.iter_mut());
        }
        NodeKind::Assign { lhs, rhs } | NodeKind::Binary { lhs, rhs, .. } => {
            out.push(lhs);
            out.push(rhs);
        }
        NodeKind::Lambda { params, body } => {
            out.extend(params.iter_mut());
            out.push(body);
        }
        NodeKind::ArrayNew { len, .. } => out.push(len),
        NodeKind::Cast { expr, .. } => out.push(expr),
        NodeKind::Param { .. }
        | NodeKind::Ident { .. }
        | NodeKind::This
        | NodeKind::MethodRef { .. }
        | NodeKind::TypeName { .. }
        | NodeKind::Null
        | NodeKind::Int(_)
        | NodeKind::Str(_) => {}
    }
    out
}

/// Remove `child` from a parent's kind. List slots shrink, optional slots
/// clear, required slots refuse.
fn remove_from_kind(kind: &mut NodeKind, child: NodeId) -> bool {
    fn remove_from_list(list: &mut Vec<NodeId>, child: NodeId) -> bool {
        match list.iter().position(|&c| c == child) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear_slot(slot: &mut Option<NodeId>, child: NodeId) -> bool {
        if *slot == Some(child) {
            *slot = None;
            true
        } else {
            false
        }
    }

    match kind {
        NodeKind::Unit { types } => remove_from_list(types, child),
        NodeKind::TypeDecl { members, .. } => remove_from_list(members, child),
        NodeKind::Method { params, body, .. } => {
            remove_from_list(params, child) || clear_slot(body, child)
        }
        NodeKind::Field { init, .. } | NodeKind::Local { init, .. } => clear_slot(init, child),
        NodeKind::Block { stmts } => remove_from_list(stmts, child),
        NodeKind::If { else_branch, .. } => clear_slot(else_branch, child),
        NodeKind::Return { value } => clear_slot(value, child),
        NodeKind::Call { callee, args, .. } => {
            if let Callee::Method { receiver, .. } = callee {
                if clear_slot(receiver, child) {
                    return true;
                }
            }
            remove_from_list(args, child)
        }
        NodeKind::Lambda { params, .. } => remove_from_list(params, child),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
