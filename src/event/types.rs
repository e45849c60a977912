//! Scheduler data model: what gets scheduled and what comes out.

use std::sync::Arc;

use crate::expr::Program;

/// Shortest period an instrument may have, in seconds.
pub const MIN_PERIOD: f64 = 0.1;

/// Longest period an instrument may have, in seconds.
pub const MAX_PERIOD: f64 = std::f64::consts::TAU;

/// A single note onset produced by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Stable instrument id (also its audio channel and plot colour).
    pub id: usize,
    /// Position of the instrument within the scheduled set.
    pub index: usize,
    /// Onset time in seconds.
    pub time: f64,
}

/// An instrument as the scheduler sees it.
#[derive(Debug, Clone)]
pub struct ScheduledInstrument {
    pub id: usize,
    pub formula: Arc<Program>,
    /// Seconds between onsets. Non-finite periods and periods below
    /// [`MIN_PERIOD`] produce no events.
    pub period: f64,
}

impl ScheduledInstrument {
    pub fn new(id: usize, formula: Arc<Program>, period: f64) -> Self {
        Self {
            id,
            formula,
            period,
        }
    }

    /// Whether this instrument produces any onsets at all.
    pub fn is_schedulable(&self) -> bool {
        self.period.is_finite() && self.period >= MIN_PERIOD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Compiler;

    fn formula() -> Arc<Program> {
        Arc::new(Compiler::compile("x").unwrap())
    }

    #[test]
    fn degenerate_periods_are_not_schedulable() {
        for period in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(!ScheduledInstrument::new(0, formula(), period).is_schedulable());
        }
        assert!(ScheduledInstrument::new(0, formula(), 0.5).is_schedulable());
    }

    #[test]
    fn periods_below_minimum_are_not_schedulable() {
        for period in [1e-300, f64::MIN_POSITIVE, 0.05, MIN_PERIOD * 0.999] {
            assert!(!ScheduledInstrument::new(0, formula(), period).is_schedulable());
        }
        assert!(ScheduledInstrument::new(0, formula(), MIN_PERIOD).is_schedulable());
        assert!(ScheduledInstrument::new(0, formula(), 100.0).is_schedulable());
    }

    #[test]
    fn period_bounds() {
        assert!(MIN_PERIOD > 0.0);
        assert!((MAX_PERIOD - 2.0 * std::f64::consts::PI).abs() < f64::EPSILON);
    }
}
