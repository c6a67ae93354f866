//! Rewrite configuration.

use rcx_sem::NamespacePolicy;

/// Options recognized by the pipeline.
#[derive(Clone, Debug)]
pub struct RewriteConfig {
    /// Emit a full per-node diagnostic trace before rewriting.
    pub verbose: bool,
    /// When false, only the stripper and canonicalizer run: the result is
    /// a program with no manual reference counting at all.
    pub add_refcounting: bool,
    /// Qualified name of the marker base capability that opts a type into
    /// counted-reference semantics.
    pub marker_base: String,
    /// Managed-namespace and lazy-sequence membership rules.
    pub namespaces: NamespacePolicy,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        RewriteConfig {
            verbose: false,
            add_refcounting: true,
            marker_base: "rc.runtime.RefCounted".to_owned(),
            namespaces: NamespacePolicy::default(),
        }
    }
}

impl RewriteConfig {
    /// Strip-only configuration: rewind instrumentation, add none back.
    pub fn strip_only() -> Self {
        RewriteConfig {
            add_refcounting: false,
            ..RewriteConfig::default()
        }
    }
}
