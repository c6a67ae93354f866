//! Arena AST for the RCX instrumenter.
//!
//! This crate provides:
//!
//! - **The node model** ([`NodeKind`]) — a closed tagged union over the
//!   declaration, statement, and expression families of the object
//!   language, each node optionally carrying resolved bindings
//!   ([`VarId`], [`TypeIdx`]) attached by the external binder.
//!
//! - **The arena** ([`Ast`], [`NodeId`]) — a flat, index-addressed store
//!   with parent links and the structural operations the rewriting passes
//!   need: replace, detach, insert-at-position, subtree clone.
//!
//! - **Support** — interned [`Name`]s, [`Span`]s, the deterministic
//!   [`NameAllocator`], and the [`render`] debug form used for change
//!   detection and tests.
//!
//! # Design
//!
//! Node ids are stable for the life of a unit: deletion detaches, it never
//! compacts. That lets a pass collect a preorder snapshot, then mutate
//! freely while holding ids from the snapshot. The semantic tables the
//! binding handles index live in `rcx_sem`; this crate stays free of
//! semantic knowledge.

mod arena;
mod builder;
mod display;
mod fresh;
mod ids;
mod name;
mod node;
mod span;

pub use arena::{Ast, Node, NodeId};
pub use display::render;
pub use fresh::NameAllocator;
pub use ids::{TypeIdx, TypeNames, VarId};
pub use name::{Interner, Name};
pub use node::{BinOp, CallTarget, Callee, NodeKind};
pub use span::Span;
