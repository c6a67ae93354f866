//! Deterministic debug rendering.
//!
//! Produces a stable, readable source form of a unit. This is the change
//! oracle — the driver renders a unit before and after the pipeline and
//! persists only when the two differ — and the assertion surface for
//! tests. Production formatting belongs to the external formatter; nothing
//! here tries to be pretty beyond two-space indentation.

use std::fmt::Write as _;

use crate::node::{BinOp, Callee, NodeKind};
use crate::{Ast, NodeId, TypeNames};

/// Render the subtree rooted at `root`.
pub fn render(ast: &Ast, root: NodeId, names: &dyn TypeNames) -> String {
    let mut renderer = Renderer {
        ast,
        names,
        out: String::new(),
        indent: 0,
    };
    renderer.node(root);
    renderer.out
}

struct Renderer<'a> {
    ast: &'a Ast,
    names: &'a dyn TypeNames,
    out: String,
    indent: usize,
}

impl Renderer<'_> {
    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn node(&mut self, id: NodeId) {
        match self.ast.kind(id).clone() {
            NodeKind::Unit { types } => {
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        self.out.push('\n');
                    }
                    self.node(*ty);
                }
            }
            NodeKind::TypeDecl { name, members, .. } => {
                self.pad();
                let _ = writeln!(self.out, "class {} {{", self.ast.name(name));
                self.indent += 1;
                for member in members {
                    self.node(member);
                }
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
            NodeKind::Method {
                name,
                is_static,
                params,
                return_ty,
                body,
            } => {
                self.pad();
                if is_static {
                    self.out.push_str("static ");
                }
                match return_ty {
                    Some(ty) => {
                        let ty = self.names.simple_name(ty);
                        let _ = write!(self.out, "{ty} ");
                    }
                    None => self.out.push_str("void "),
                }
                let _ = write!(self.out, "{}(", self.ast.name(name));
                self.params(&params);
                self.out.push(')');
                match body {
                    Some(body) => {
                        self.out.push(' ');
                        self.block_inline(body);
                        self.out.push('\n');
                    }
                    None => self.out.push_str(";\n"),
                }
            }
            NodeKind::Field {
                name, ty, init, ..
            } => {
                self.pad();
                let ty = self.names.simple_name(ty);
                let _ = write!(self.out, "{ty} {}", self.ast.name(name));
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push_str(";\n");
            }
            NodeKind::Param { name, ty, .. } => {
                let ty = self.names.simple_name(ty);
                let _ = write!(self.out, "{ty} {}", self.ast.name(name));
            }
            other if other.is_statement() => self.stmt(id),
            _ => self.expr(id),
        }
    }

    fn params(&mut self, params: &[NodeId]) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.node(*param);
        }
    }

    fn stmt(&mut self, id: NodeId) {
        match self.ast.kind(id).clone() {
            NodeKind::Block { .. } => {
                self.pad();
                self.block_inline(id);
                self.out.push('\n');
            }
            NodeKind::Local {
                name, ty, init, ..
            } => {
                self.pad();
                let ty = self.names.simple_name(ty);
                let _ = write!(self.out, "{ty} {}", self.ast.name(name));
                if let Some(init) = init {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push_str(";\n");
            }
            NodeKind::ExprStmt { expr } => {
                self.pad();
                self.expr(expr);
                self.out.push_str(";\n");
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.pad();
                self.out.push_str("if (");
                self.expr(cond);
                self.out.push_str(") ");
                self.branch(then_branch);
                if let Some(else_branch) = else_branch {
                    self.pad();
                    self.out.push_str("else ");
                    self.branch(else_branch);
                }
            }
            NodeKind::Return { value } => {
                self.pad();
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
                self.out.push_str(";\n");
            }
            other => {
                // Expression in statement position without a wrapper; a
                // malformed tree, but render something diffable.
                self.pad();
                let _ = write!(self.out, "<{}>;\n", other.kind_name());
            }
        }
    }

    /// Render an `if` branch: blocks inline, single statements indented.
    fn branch(&mut self, id: NodeId) {
        if matches!(self.ast.kind(id), NodeKind::Block { .. }) {
            self.block_inline(id);
            self.out.push('\n');
        } else {
            self.out.push('\n');
            self.indent += 1;
            self.stmt(id);
            self.indent -= 1;
        }
    }

    /// Render a block starting at the current output position.
    fn block_inline(&mut self, id: NodeId) {
        let stmts = self.ast.block_stmts(id).to_vec();
        self.out.push_str("{\n");
        self.indent += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.pad();
        self.out.push('}');
    }

    fn expr(&mut self, id: NodeId) {
        match self.ast.kind(id).clone() {
            NodeKind::Ident { name, .. } => self.out.push_str(self.ast.name(name)),
            NodeKind::This => self.out.push_str("this"),
            NodeKind::FieldAccess { base, name, .. } => {
                self.expr(base);
                let _ = write!(self.out, ".{}", self.ast.name(name));
            }
            NodeKind::Call { callee, args, .. } => {
                match callee {
                    Callee::Method { receiver, name } => {
                        if let Some(receiver) = receiver {
                            self.expr(receiver);
                            self.out.push('.');
                        }
                        self.out.push_str(self.ast.name(name));
                    }
                    Callee::Constructor { class } => {
                        let class = self.names.simple_name(class);
                        let _ = write!(self.out, "new {class}");
                    }
                    Callee::Super { name } => match name {
                        Some(name) => {
                            let _ = write!(self.out, "super.{}", self.ast.name(name));
                        }
                        None => self.out.push_str("super"),
                    },
                }
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(*arg);
                }
                self.out.push(')');
            }
            NodeKind::Assign { lhs, rhs } => {
                self.expr(lhs);
                self.out.push_str(" = ");
                self.expr(rhs);
            }
            NodeKind::Lambda { params, body } => {
                self.out.push('(');
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.node(*param);
                }
                self.out.push_str(") -> ");
                if matches!(self.ast.kind(body), NodeKind::Block { .. }) {
                    self.block_inline(body);
                } else {
                    self.expr(body);
                }
            }
            NodeKind::MethodRef { ty, name } => {
                let ty = self.names.simple_name(ty);
                let _ = write!(self.out, "{ty}::{}", self.ast.name(name));
            }
            NodeKind::ArrayNew { elem_ty, len } => {
                let elem = self.names.simple_name(elem_ty);
                let _ = write!(self.out, "new {elem}[");
                self.expr(len);
                self.out.push(']');
            }
            NodeKind::Cast { ty, expr } => {
                let ty = self.names.simple_name(ty);
                let _ = write!(self.out, "({ty}) ");
                self.expr(expr);
            }
            NodeKind::Binary { op, lhs, rhs } => {
                self.expr(lhs);
                let op = match op {
                    BinOp::Eq => " == ",
                    BinOp::Ne => " != ",
                };
                self.out.push_str(op);
                self.expr(rhs);
            }
            NodeKind::TypeName { ty } => {
                let ty = self.names.simple_name(ty);
                self.out.push_str(&ty);
            }
            NodeKind::Null => self.out.push_str("null"),
            NodeKind::Int(value) => {
                let _ = write!(self.out, "{value}");
            }
            NodeKind::Str(value) => {
                let _ = write!(self.out, "\"{}\"", self.ast.name(value));
            }
            other => {
                let _ = write!(self.out, "<{}>", other.kind_name());
            }
        }
    }
}
