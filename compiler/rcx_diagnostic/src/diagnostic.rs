use std::fmt;

use rcx_ast::Span;

/// Severity level for rewrite diagnostics.
///
/// The instrumenter never aborts on an unsupported shape; severity encodes
/// what happened at a site instead:
///
/// - `Info` — a structural change was applied.
/// - `Debug` — a per-site action, interesting only when tracing a rewrite.
/// - `Warning` — the site was skipped and needs manual review.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Info,
    Debug,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Debug => write!(f, "debug"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single rewrite diagnostic: what happened, to which node kind, where.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Stable node-kind name of the site (`"Call"`, `"If"`, ...).
    pub node_kind: &'static str,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        node_kind: &'static str,
        span: Span,
    ) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            node_kind,
            span,
        }
    }

    /// A structural change was applied.
    pub fn info(message: impl Into<String>, node_kind: &'static str, span: Span) -> Self {
        Self::new(Severity::Info, message, node_kind, span)
    }

    /// A per-site action worth recording when tracing a rewrite.
    pub fn debug(message: impl Into<String>, node_kind: &'static str, span: Span) -> Self {
        Self::new(Severity::Debug, message, node_kind, span)
    }

    /// The site was skipped and needs manual review.
    pub fn warning(message: impl Into<String>, node_kind: &'static str, span: Span) -> Self {
        Self::new(Severity::Warning, message, node_kind, span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{} at {:?}]",
            self.severity, self.message, self.node_kind, self.span
        )
    }
}
