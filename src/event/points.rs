//! Plot markers: where one instrument's onsets land on its function plot.

use crate::expr::{Evaluator, Program};

use super::{Scheduler, ScheduledInstrument};

/// A point on the function plot at which a note is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Re-run the scheduler for a single instrument and sample its formula at
/// each onset.
///
/// Values are returned raw: callers decide how to show points whose `|y|`
/// falls outside the audible window.
pub fn period_points(instrument: &ScheduledInstrument, duration: f64) -> Vec<PlotPoint> {
    let mut scheduler = Scheduler::new();
    let events = scheduler.run(std::slice::from_ref(instrument), duration);
    sample_at(&instrument.formula, events.iter().map(|e| e.time))
}

fn sample_at(program: &Program, times: impl Iterator<Item = f64>) -> Vec<PlotPoint> {
    let mut evaluator = Evaluator::new();
    times
        .map(|x| PlotPoint {
            x,
            y: evaluator.run(program, x),
        })
        .collect()
}
