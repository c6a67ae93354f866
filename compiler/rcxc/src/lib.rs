//! Pipeline driver for the RCX reference-count instrumenter.
//!
//! Embedders hand this crate parsed, binder-resolved [`ProgramUnit`]s and
//! a shared type [`Pool`](rcx_sem::Pool); [`instrument_unit`] and
//! [`instrument_units`] run the pass pipeline, and [`persist_changed`]
//! writes changed units back through the external formatter/sink seams.
//!
//! Source discovery, parsing, binding, pretty-printing, and file I/O all
//! live outside this workspace — integrations embed the pipeline rather
//! than shelling out to a binary.

use std::sync::Once;

mod config;
mod output;
mod pipeline;
mod trace;
mod unit;

pub use config::RewriteConfig;
pub use output::{persist_changed, DebugFormatter, PersistError, UnitFormatter, UnitSink};
pub use pipeline::{instrument_unit, instrument_units, UnitOutcome};
pub use unit::ProgramUnit;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for pipeline debug output.
///
/// Call once at startup; safe to call again. With `verbose` the
/// hierarchical tree layer is installed so per-unit spans nest visibly;
/// otherwise the plain formatter is used, gated on `RUST_LOG` as usual.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if verbose {
            EnvFilter::new("info")
        } else {
            return;
        };

        if verbose {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
