//! Output interfaces.
//!
//! Final text production and file persistence belong to external
//! collaborators; the pipeline only decides *whether* a unit is written
//! (it changed) and hands the work across these seams. The debug renderer
//! doubles as a formatter for embedders that do not bring their own.

use std::fmt;
use std::path::Path;

use rcx_ast::render;
use rcx_sem::Pool;

use crate::pipeline::UnitOutcome;
use crate::unit::ProgramUnit;

/// Produces the final text of a changed unit.
pub trait UnitFormatter {
    fn format(&self, unit: &ProgramUnit, pool: &Pool) -> String;
}

/// The debug renderer as a formatter; embedders with a real
/// pretty-printer supply their own implementation.
pub struct DebugFormatter;

impl UnitFormatter for DebugFormatter {
    fn format(&self, unit: &ProgramUnit, pool: &Pool) -> String {
        render(&unit.ast, unit.root, pool)
    }
}

/// Writes a changed unit back to its originating file.
pub trait UnitSink {
    fn persist(&self, path: &Path, text: &str) -> Result<(), PersistError>;
}

/// Persistence failure — fatal for the unit, never for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistError {
    pub message: String,
}

impl PersistError {
    pub fn new(message: impl Into<String>) -> Self {
        PersistError {
            message: message.into(),
        }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persist failed: {}", self.message)
    }
}

impl std::error::Error for PersistError {}

/// Write every changed unit through the formatter and sink. Unchanged
/// units are discarded without I/O. A failed write is recorded on that
/// unit's outcome and the rest of the run continues.
pub fn persist_changed(
    units: &[ProgramUnit],
    outcomes: &mut [UnitOutcome],
    pool: &Pool,
    formatter: &dyn UnitFormatter,
    sink: &dyn UnitSink,
) -> usize {
    let mut written = 0;
    for (unit, outcome) in units.iter().zip(outcomes.iter_mut()) {
        if !outcome.changed {
            continue;
        }
        let text = formatter.format(unit, pool);
        match sink.persist(&unit.path, &text) {
            Ok(()) => written += 1,
            Err(error) => {
                tracing::warn!(
                    path = %unit.path.display(),
                    error = %error,
                    "failed to persist unit"
                );
                outcome.persist_error = Some(error);
            }
        }
    }
    written
}
