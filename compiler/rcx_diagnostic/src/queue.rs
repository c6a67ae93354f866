//! Per-unit diagnostic queue.
//!
//! Collects diagnostics in emission order — which, passes being
//! deterministic, is itself deterministic — and keeps per-severity counts
//! so the driver can summarize a unit without re-scanning.

use crate::{Diagnostic, Severity};

/// Ordered diagnostic collector for one program unit.
#[derive(Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    warnings: usize,
    infos: usize,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => self.warnings += 1,
            Severity::Info => self.infos += 1,
            Severity::Debug => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sites skipped for manual review.
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Structural changes applied.
    pub fn info_count(&self) -> usize {
        self.infos
    }

    /// Drain into a plain list, e.g. to attach to a unit outcome.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use rcx_ast::Span;

    use super::*;

    #[test]
    fn counts_by_severity() {
        let mut queue = DiagnosticQueue::new();
        queue.push(Diagnostic::info("inserted acquire", "Call", Span::NONE));
        queue.push(Diagnostic::debug("visited site", "Call", Span::NONE));
        queue.push(Diagnostic::warning("unsupported shape", "Assign", Span::NONE));
        queue.push(Diagnostic::warning("no free hook", "Field", Span::NONE));

        assert_eq!(queue.len(), 4);
        assert_eq!(queue.info_count(), 1);
        assert_eq!(queue.warning_count(), 2);
    }

    #[test]
    fn preserves_emission_order() {
        let mut queue = DiagnosticQueue::new();
        queue.push(Diagnostic::info("first", "Call", Span::NONE));
        queue.push(Diagnostic::info("second", "Call", Span::NONE));
        let messages: Vec<&str> = queue.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
    }
}
