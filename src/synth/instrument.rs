//! Per-instrument edit state: source texts, compiled artifacts and mixer
//! settings.

use std::sync::Arc;

use tracing::warn;

use crate::event::compile_period;
use crate::expr::{CompileError, Compiler, Program};
use crate::instrument::{voice_at, InstrumentKind, Voice, VOICES};

/// What the plot for one instrument should do after a recompile.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotUpdate {
    /// The formula or period compiled; redraw the plot.
    Redraw(usize),
    /// The formula is empty; clear the plot.
    Clear(usize),
    /// Compilation failed. The instrument keeps whatever it had compiled
    /// before.
    Invalid { id: usize, error: CompileError },
}

impl PlotUpdate {
    pub fn id(&self) -> usize {
        match self {
            PlotUpdate::Redraw(id) | PlotUpdate::Clear(id) => *id,
            PlotUpdate::Invalid { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Instrument {
    id: usize,
    formula: String,
    seen_formula: String,
    program: Option<Arc<Program>>,
    period_text: String,
    seen_period: String,
    period: Option<f64>,
    enabled: bool,
    volume: f64,
    voice: usize,
}

impl Instrument {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            formula: String::new(),
            seen_formula: String::new(),
            program: None,
            period_text: String::new(),
            seen_period: String::new(),
            period: None,
            enabled: false,
            volume: 1.0,
            voice: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn period_text(&self) -> &str {
        &self.period_text
    }

    pub fn program(&self) -> Option<&Arc<Program>> {
        self.program.as_ref()
    }

    /// Compiled and clamped period, if the period formula is usable.
    pub fn period(&self) -> Option<f64> {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Volume as a 0..=127 channel level.
    pub fn volume_level(&self) -> u8 {
        (127.0 * self.volume).round() as u8
    }

    pub fn voice_index(&self) -> usize {
        self.voice
    }

    pub fn voice(&self) -> &'static Voice {
        voice_at(self.voice).unwrap_or(&VOICES[0])
    }

    pub fn kind(&self) -> InstrumentKind {
        self.voice().kind
    }

    /// Whether this instrument would take part in a render. A blank formula
    /// is never played, even while its old program waits to be cleared.
    pub fn is_playable(&self) -> bool {
        self.enabled
            && self.program.is_some()
            && self.period.is_some()
            && !self.formula.trim().is_empty()
    }

    pub(crate) fn set_formula(&mut self, text: &str) {
        self.formula.clear();
        self.formula.push_str(text);
    }

    pub(crate) fn set_period_text(&mut self, text: &str) {
        self.period_text.clear();
        self.period_text.push_str(text);
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    pub(crate) fn set_voice(&mut self, index: usize) {
        self.voice = index;
    }

    /// Whether either source text differs from what was last compiled.
    pub fn is_stale(&self) -> bool {
        self.formula != self.seen_formula || self.period_text != self.seen_period
    }

    /// Recompile whatever text changed since the last call.
    ///
    /// Returns `None` when nothing changed.
    pub(crate) fn recompile(&mut self) -> Option<PlotUpdate> {
        if !self.is_stale() {
            return None;
        }

        let mut failure = None;

        if self.formula != self.seen_formula {
            self.seen_formula.clone_from(&self.formula);
            if self.formula.trim().is_empty() {
                self.program = None;
            } else {
                match Compiler::compile(&self.formula) {
                    Ok(program) => self.program = Some(Arc::new(program)),
                    Err(error) => {
                        warn!(id = self.id, formula = %self.formula, "formula: {error}");
                        failure = Some(error);
                    }
                }
            }
        }

        if self.period_text != self.seen_period {
            self.seen_period.clone_from(&self.period_text);
            if self.period_text.trim().is_empty() {
                self.period = None;
            } else {
                match compile_period(&self.period_text) {
                    Ok(period) => self.period = period,
                    Err(error) => {
                        warn!(id = self.id, period = %self.period_text, "period: {error}");
                        if failure.is_none() {
                            failure = Some(error);
                        }
                    }
                }
            }
        }

        let update = match failure {
            Some(error) => PlotUpdate::Invalid { id: self.id, error },
            None if self.program.is_none() => PlotUpdate::Clear(self.id),
            None => PlotUpdate::Redraw(self.id),
        };
        Some(update)
    }
}
