//! Structured observability hooks for runner execution.
//!
//! Lifecycle events are emitted at `info!`/`debug!` level under the
//! `spot.execute` span. Filtering follows `RUST_LOG`; see
//! [`init_tracing`](crate::telemetry::init_tracing).

use tracing::{debug, info};

use crate::runner::ExecutionPhase;

/// Span covering one `Runner::execute` call, tagged with the runner uid.
///
/// Attach it with [`tracing::Instrument`] so it stays correct across awaits.
pub fn execute_span(uid: &str) -> tracing::Span {
    let short = uid.get(..12).unwrap_or(uid);
    tracing::info_span!("spot.execute", uid = %short)
}

/// Emit event: execution moved to a new phase.
pub fn emit_phase(phase: ExecutionPhase) {
    debug!(event = "execute.phase", phase = ?phase);
}

/// Emit event: assignment `index` of `total` started.
pub fn emit_fact_started(index: usize, total: usize, version: &str) {
    info!(event = "fact.started", index = index, total = total, version = %version);
}

/// Emit event: a step finished.
pub fn emit_step_finished(command: &str, elapsed: f64, success: bool) {
    info!(
        event = "step.finished",
        command = %command,
        elapsed = elapsed,
        success = success,
    );
}

/// Emit event: all steps of an assignment were recorded.
pub fn emit_fact_finished(index: usize, steps: usize, total_time: f64) {
    info!(
        event = "fact.finished",
        index = index,
        steps = steps,
        total_time = total_time,
    );
}
