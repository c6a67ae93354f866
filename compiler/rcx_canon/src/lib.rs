//! Normalization passes for the RCX instrumenter.
//!
//! Two passes that run before any instrumentation is generated:
//!
//! - [`strip_unit`] — removes every trace of previous instrumentation
//!   (protocol members and protocol calls), rewinding the unit to its
//!   uninstrumented baseline.
//! - [`canonicalize`] — a fixpoint cleanup that flattens trivial blocks
//!   and inlines single-use temporaries, so the injection passes always
//!   see the same canonical shapes regardless of how the source was
//!   written or previously instrumented.
//!
//! Together they make the full pipeline idempotent: instrumenting already
//! instrumented output first rewinds it to the same baseline, then
//! regenerates the same result.

mod canon;
mod strip;

pub use canon::canonicalize;
pub use strip::strip_unit;
