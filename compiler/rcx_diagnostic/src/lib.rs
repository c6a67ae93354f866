//! Diagnostics for the RCX instrumenter.
//!
//! Every pass degrades to skip-plus-diagnostic on shapes it does not
//! support; nothing in the rewriting core aborts a unit. This crate is the
//! vocabulary for that: leveled [`Diagnostic`]s naming the node kind and
//! source location, collected per unit in a [`DiagnosticQueue`].

mod diagnostic;
mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use queue::DiagnosticQueue;
