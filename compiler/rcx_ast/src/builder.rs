//! Node constructors.
//!
//! The external parser/binder adapter and the rewriting passes build nodes
//! through these; each constructor allocates with [`Span::NONE`] (synthetic
//! position) and adopts its children. Parsed nodes get their real spans via
//! [`Ast::set_span`].

use crate::node::{BinOp, CallTarget, Callee, NodeKind};
use crate::{Ast, Name, NodeId, Span, TypeIdx, VarId};

impl Ast {
    pub fn new_unit(&mut self, types: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Unit { types }, Span::NONE)
    }

    pub fn new_type_decl(
        &mut self,
        name: Name,
        binding: TypeIdx,
        members: Vec<NodeId>,
    ) -> NodeId {
        self.alloc(
            NodeKind::TypeDecl {
                name,
                binding,
                members,
            },
            Span::NONE,
        )
    }

    pub fn new_method(
        &mut self,
        name: Name,
        is_static: bool,
        params: Vec<NodeId>,
        return_ty: Option<TypeIdx>,
        body: Option<NodeId>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Method {
                name,
                is_static,
                params,
                return_ty,
                body,
            },
            Span::NONE,
        )
    }

    pub fn new_field(
        &mut self,
        name: Name,
        ty: TypeIdx,
        binding: Option<VarId>,
        init: Option<NodeId>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Field {
                name,
                ty,
                binding,
                init,
            },
            Span::NONE,
        )
    }

    pub fn new_param(&mut self, name: Name, ty: TypeIdx, binding: Option<VarId>) -> NodeId {
        self.alloc(NodeKind::Param { name, ty, binding }, Span::NONE)
    }

    pub fn new_block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(NodeKind::Block { stmts }, Span::NONE)
    }

    pub fn new_local(
        &mut self,
        name: Name,
        ty: TypeIdx,
        binding: Option<VarId>,
        init: Option<NodeId>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Local {
                name,
                ty,
                binding,
                init,
            },
            Span::NONE,
        )
    }

    pub fn new_expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.alloc(NodeKind::ExprStmt { expr }, Span::NONE)
    }

    pub fn new_if(
        &mut self,
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        self.alloc(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            Span::NONE,
        )
    }

    pub fn new_return(&mut self, value: Option<NodeId>) -> NodeId {
        self.alloc(NodeKind::Return { value }, Span::NONE)
    }

    pub fn new_ident(&mut self, name: Name, binding: Option<VarId>) -> NodeId {
        self.alloc(NodeKind::Ident { name, binding }, Span::NONE)
    }

    /// Interning convenience for [`Ast::new_ident`].
    pub fn ident_named(&mut self, name: &str, binding: Option<VarId>) -> NodeId {
        let name = self.intern(name);
        self.new_ident(name, binding)
    }

    pub fn new_this(&mut self) -> NodeId {
        self.alloc(NodeKind::This, Span::NONE)
    }

    pub fn new_field_access(
        &mut self,
        base: NodeId,
        name: Name,
        binding: Option<VarId>,
    ) -> NodeId {
        self.alloc(
            NodeKind::FieldAccess {
                base,
                name,
                binding,
            },
            Span::NONE,
        )
    }

    pub fn new_method_call(
        &mut self,
        receiver: Option<NodeId>,
        name: Name,
        args: Vec<NodeId>,
        target: Option<CallTarget>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Call {
                callee: Callee::Method { receiver, name },
                args,
                target,
            },
            Span::NONE,
        )
    }

    pub fn new_ctor_call(
        &mut self,
        class: TypeIdx,
        args: Vec<NodeId>,
        target: Option<CallTarget>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Call {
                callee: Callee::Constructor { class },
                args,
                target,
            },
            Span::NONE,
        )
    }

    pub fn new_super_call(
        &mut self,
        name: Option<Name>,
        args: Vec<NodeId>,
        target: Option<CallTarget>,
    ) -> NodeId {
        self.alloc(
            NodeKind::Call {
                callee: Callee::Super { name },
                args,
                target,
            },
            Span::NONE,
        )
    }

    pub fn new_assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(NodeKind::Assign { lhs, rhs }, Span::NONE)
    }

    pub fn new_lambda(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        self.alloc(NodeKind::Lambda { params, body }, Span::NONE)
    }

    pub fn new_method_ref(&mut self, ty: TypeIdx, name: Name) -> NodeId {
        self.alloc(NodeKind::MethodRef { ty, name }, Span::NONE)
    }

    pub fn new_array_new(&mut self, elem_ty: TypeIdx, len: NodeId) -> NodeId {
        self.alloc(NodeKind::ArrayNew { elem_ty, len }, Span::NONE)
    }

    pub fn new_cast(&mut self, ty: TypeIdx, expr: NodeId) -> NodeId {
        self.alloc(NodeKind::Cast { ty, expr }, Span::NONE)
    }

    pub fn new_binary(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(NodeKind::Binary { op, lhs, rhs }, Span::NONE)
    }

    pub fn new_type_name(&mut self, ty: TypeIdx) -> NodeId {
        self.alloc(NodeKind::TypeName { ty }, Span::NONE)
    }

    pub fn new_null(&mut self) -> NodeId {
        self.alloc(NodeKind::Null, Span::NONE)
    }

    pub fn new_int(&mut self, value: i64) -> NodeId {
        self.alloc(NodeKind::Int(value), Span::NONE)
    }

    pub fn new_str(&mut self, value: Name) -> NodeId {
        self.alloc(NodeKind::Str(value), Span::NONE)
    }
}
