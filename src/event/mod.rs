//! Onset scheduler: turns instrument periods into a time-ordered event list.
//!
//! Every instrument fires at `period, 2·period, 3·period, …` up to and
//! including the end of the window. Onsets of all instruments are merged into
//! one list with a stable sort, so simultaneous onsets keep instrument order
//! and the result is identical for identical input.
//!
//! Scheduling is not incremental: any change to any instrument means the
//! whole list is rebuilt.

pub mod points;
pub mod types;

pub use points::{period_points, PlotPoint};
pub use types::{NoteEvent, ScheduledInstrument, MAX_PERIOD, MIN_PERIOD};

use tracing::debug;

use crate::expr::{CompileError, Compiler};

/// Slack for the inclusive end of the window, so `k·period` landing on the
/// boundary through rounding is still scheduled.
const WINDOW_EPSILON: f64 = 1e-9;

/// Compile a period formula and evaluate it once at `x = 1`.
///
/// Returns `Ok(None)` when the formula compiles but yields a non-finite or
/// non-positive value; such an instrument has no notes. Valid periods are
/// clamped into `[MIN_PERIOD, MAX_PERIOD]`.
pub fn compile_period(source: &str) -> Result<Option<f64>, CompileError> {
    let program = Compiler::compile(source)?;
    Ok(clamp_period(program.eval(1.0)))
}

/// Clamp a raw period value, rejecting degenerate ones.
pub fn clamp_period(value: f64) -> Option<f64> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(value.clamp(MIN_PERIOD, MAX_PERIOD))
}

/// Merge the onsets of `instruments` over `[0, duration]`.
pub fn schedule(instruments: &[ScheduledInstrument], duration: f64) -> Vec<NoteEvent> {
    let mut scheduler = Scheduler::new();
    scheduler.run(instruments, duration);
    scheduler.into_events()
}

/// Reusable scheduler. Keeps its event buffer between runs to avoid
/// reallocating on every re-render.
#[derive(Debug, Default)]
pub struct Scheduler {
    events: Vec<NoteEvent>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Rebuild the event list for `instruments` and return it.
    pub fn run(&mut self, instruments: &[ScheduledInstrument], duration: f64) -> &[NoteEvent] {
        self.events.clear();

        if !duration.is_finite() || duration <= 0.0 {
            return &self.events;
        }

        let mut active = 0;
        for (index, inst) in instruments.iter().enumerate() {
            if !inst.is_schedulable() {
                debug!(
                    id = inst.id,
                    period = inst.period,
                    "skipping instrument with degenerate period"
                );
                continue;
            }
            active += 1;
            push_onsets(&mut self.events, inst, index, duration);
        }

        // A single instrument's onsets are already in order.
        if active > 1 {
            self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        }

        &self.events
    }

    /// The events from the last run.
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<NoteEvent> {
        self.events
    }
}

fn push_onsets(
    events: &mut Vec<NoteEvent>,
    inst: &ScheduledInstrument,
    index: usize,
    duration: f64,
) {
    let count = ((duration + WINDOW_EPSILON) / inst.period).floor() as usize;
    events.reserve(count);
    for k in 1..=count {
        events.push(NoteEvent {
            id: inst.id,
            index,
            time: k as f64 * inst.period,
        });
    }
}
