//! Semantic tables for the RCX instrumenter.
//!
//! This crate provides:
//!
//! - **Type pool** ([`Pool`], [`TypeInfo`]) — interned class and array
//!   types with superclass links, shared across units.
//! - **Variable bindings** ([`Bindings`], [`VarInfo`], [`VarKind`]) —
//!   per-unit ownership sites resolved by the external binder.
//! - **Classification** ([`RefClassifier`]) — which types carry a
//!   reference count, memoized superclass-chain walks.
//! - **Namespace policy** ([`NamespacePolicy`]) — the managed-namespace
//!   and lazy-sequence predicates.
//!
//! The instrumenter never resolves anything itself: bindings arrive
//! attached to the AST, and this crate only answers queries about them.

mod bindings;
mod classify;
mod namespace;
mod pool;
pub mod protocol;

pub use bindings::{Bindings, VarInfo, VarKind};
pub use classify::RefClassifier;
pub use namespace::NamespacePolicy;
pub use pool::{Pool, TypeInfo};
