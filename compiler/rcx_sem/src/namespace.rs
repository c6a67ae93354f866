//! Namespace classification.
//!
//! Two configurable predicates gate instrumentation:
//!
//! - **managed** — declaring types whose callees take ownership of
//!   counted-reference arguments; acquire injection and free-hook lookup
//!   apply only inside this namespace.
//! - **lazy-sequence** — higher-order APIs whose callback invocation
//!   count and timing are unguaranteed; lambdas passed straight to them
//!   are exempt from release injection.
//!
//! Both default to a prefix match on the qualified type name. The
//! lazy-sequence list is an explicit allow-list rather than a hard-coded
//! heuristic, so embedders can name exactly the APIs they trust.

use rcx_ast::{TypeIdx, TypeNames};

use crate::Pool;

/// Prefix-based namespace membership rules.
#[derive(Clone, Debug)]
pub struct NamespacePolicy {
    pub managed_prefixes: Vec<String>,
    pub lazy_seq_prefixes: Vec<String>,
}

impl NamespacePolicy {
    pub fn new(managed_prefixes: Vec<String>, lazy_seq_prefixes: Vec<String>) -> Self {
        NamespacePolicy {
            managed_prefixes,
            lazy_seq_prefixes,
        }
    }

    /// Whether callees declared by `ty` consume counted-reference
    /// arguments.
    pub fn is_managed(&self, pool: &Pool, ty: TypeIdx) -> bool {
        let qualified = pool.qualified_name(ty);
        self.managed_prefixes
            .iter()
            .any(|prefix| qualified.starts_with(prefix.as_str()))
    }

    /// Whether `ty` is a lazy-sequence abstraction (callback timing
    /// unguaranteed).
    pub fn is_lazy_seq(&self, pool: &Pool, ty: TypeIdx) -> bool {
        let qualified = pool.qualified_name(ty);
        self.lazy_seq_prefixes
            .iter()
            .any(|prefix| qualified.starts_with(prefix.as_str()))
    }
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        NamespacePolicy {
            managed_prefixes: vec!["rc.".to_owned()],
            lazy_seq_prefixes: vec!["stream.".to_owned()],
        }
    }
}
