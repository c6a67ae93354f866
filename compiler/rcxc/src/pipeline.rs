//! Pass orchestration.
//!
//! Strictly ordered, because each pass assumes invariants established by
//! its predecessor:
//!
//! 1. verbose node trace (when configured)
//! 2. stripper — rewind to the uninstrumented baseline
//! 3. canonicalizer — fixpoint normalization
//! 4. lifecycle synthesizer — regenerate the protocol members
//! 5. acquire injector — wrap consumed arguments
//! 6. field mutation rewriter — release-old / acquire-new at stores
//! 7. release injector — one release per exit path per ownership site
//!
//! Steps 4–7 only run with `add_refcounting`; without it the pipeline
//! produces a program with no manual reference counting at all.
//!
//! Distinct units are independent — no shared mutable state beyond each
//! unit's own tree — so [`instrument_units`] fans them out with rayon.
//! The one exception is lifecycle synthesis, which interns array types
//! into the shared pool; that stage runs sequentially between the
//! parallel ones, and the pool is read-only everywhere else.

use rayon::prelude::*;

use rcx_ast::render;
use rcx_diagnostic::{Diagnostic, DiagnosticQueue};
use rcx_sem::{Pool, RefClassifier};

use crate::config::RewriteConfig;
use crate::output::PersistError;
use crate::trace::trace_unit;
use crate::unit::ProgramUnit;

/// Result of instrumenting one unit.
pub struct UnitOutcome {
    pub path: std::path::PathBuf,
    /// Whether the rendered form differs from the pre-pipeline rendering;
    /// only changed units are persisted.
    pub changed: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Set when persisting this unit failed; fatal for the unit only.
    pub persist_error: Option<PersistError>,
}

/// Run the full pipeline over one unit.
pub fn instrument_unit(
    unit: &mut ProgramUnit,
    pool: &mut Pool,
    config: &RewriteConfig,
) -> UnitOutcome {
    let before = render(&unit.ast, unit.root, pool);
    let mut diag = DiagnosticQueue::new();

    normalize(unit, pool, config, &mut diag);
    if config.add_refcounting {
        synthesize(unit, pool, config, &mut diag);
        inject(unit, pool, config, &mut diag);
    }

    finish(unit, pool, before, diag)
}

/// Run the pipeline over many units, fanning independent stages out in
/// parallel.
pub fn instrument_units(
    units: &mut [ProgramUnit],
    pool: &mut Pool,
    config: &RewriteConfig,
) -> Vec<UnitOutcome> {
    let mut states: Vec<(String, DiagnosticQueue)> = {
        let shared: &Pool = pool;
        units
            .par_iter_mut()
            .map(|unit| {
                let before = render(&unit.ast, unit.root, shared);
                let mut diag = DiagnosticQueue::new();
                normalize(unit, shared, config, &mut diag);
                (before, diag)
            })
            .collect()
    };

    if config.add_refcounting {
        // Lifecycle synthesis interns array types into the shared pool;
        // it is the one sequential stage.
        for (unit, (_, diag)) in units.iter_mut().zip(states.iter_mut()) {
            synthesize(unit, pool, config, diag);
        }

        let shared: &Pool = pool;
        units
            .par_iter_mut()
            .zip(states.par_iter_mut())
            .for_each(|(unit, (_, diag))| {
                inject(unit, shared, config, diag);
            });
    }

    units
        .iter()
        .zip(states)
        .map(|(unit, (before, diag))| finish(unit, pool, before, diag))
        .collect()
}

/// Stages 1–3: trace, strip, canonicalize.
fn normalize(
    unit: &mut ProgramUnit,
    pool: &Pool,
    config: &RewriteConfig,
    diag: &mut DiagnosticQueue,
) {
    let _span = tracing::debug_span!("unit", path = %unit.path.display()).entered();
    if config.verbose {
        trace_unit(&unit.ast, unit.root, &unit.path);
    }
    let classifier = RefClassifier::new(pool, &config.marker_base);
    rcx_canon::strip_unit(&mut unit.ast, unit.root, &classifier, diag);
    rcx_canon::canonicalize(&mut unit.ast, unit.root, diag);
}

/// Stage 4: lifecycle synthesis (mutates the shared pool).
fn synthesize(
    unit: &mut ProgramUnit,
    pool: &mut Pool,
    config: &RewriteConfig,
    diag: &mut DiagnosticQueue,
) {
    rcx_arc::synthesize_protocol(&mut unit.ast, unit.root, pool, &config.marker_base, diag);
}

/// Stages 5–7: acquire, field mutation, release.
fn inject(
    unit: &mut ProgramUnit,
    pool: &Pool,
    config: &RewriteConfig,
    diag: &mut DiagnosticQueue,
) {
    let _span = tracing::debug_span!("unit", path = %unit.path.display()).entered();
    let classifier = RefClassifier::new(pool, &config.marker_base);
    rcx_arc::inject_acquires(
        &mut unit.ast,
        unit.root,
        &unit.bindings,
        &classifier,
        &config.namespaces,
        diag,
    );
    rcx_arc::rewrite_field_mutations(
        &mut unit.ast,
        unit.root,
        &mut unit.bindings,
        &classifier,
        diag,
    );
    rcx_arc::inject_releases(
        &mut unit.ast,
        unit.root,
        &mut unit.bindings,
        &classifier,
        &config.namespaces,
        diag,
    );
}

fn finish(
    unit: &ProgramUnit,
    pool: &Pool,
    before: String,
    diag: DiagnosticQueue,
) -> UnitOutcome {
    let after = render(&unit.ast, unit.root, pool);
    let changed = before != after;
    if changed {
        tracing::info!(path = %unit.path.display(), "unit changed");
    } else {
        tracing::debug!(path = %unit.path.display(), "unit untouched");
    }
    UnitOutcome {
        path: unit.path.clone(),
        changed,
        diagnostics: diag.into_vec(),
        persist_error: None,
    }
}
