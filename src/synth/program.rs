//! Immutable render snapshots produced by the synthesizer.

use std::sync::Arc;

use crate::event::ScheduledInstrument;
use crate::expr::Program;
use crate::instrument::{InstrumentKind, Voice};

/// Default length of a render, in seconds.
pub const DEFAULT_DURATION: f64 = 20.0;

/// One enabled, compiled instrument inside a [`SynthProgram`].
#[derive(Debug, Clone)]
pub struct ProgramInstrument {
    /// Stable instrument id, also the device channel.
    pub id: usize,
    /// Position within the snapshot.
    pub index: usize,
    pub formula: Arc<Program>,
    pub period: f64,
    pub voice: &'static Voice,
    /// Channel volume, 0..=127.
    pub volume: u8,
}

impl ProgramInstrument {
    pub fn kind(&self) -> InstrumentKind {
        self.voice.kind
    }
}

/// Everything the renderer needs, detached from later edits.
#[derive(Debug, Clone)]
pub struct SynthProgram {
    pub instruments: Vec<ProgramInstrument>,
    /// Render length in seconds.
    pub duration: f64,
}

impl SynthProgram {
    pub fn new(duration: f64) -> Self {
        Self {
            instruments: Vec::new(),
            duration,
        }
    }

    /// Append an instrument, assigning its snapshot index.
    pub fn push(
        &mut self,
        id: usize,
        formula: Arc<Program>,
        period: f64,
        voice: &'static Voice,
        volume: u8,
    ) {
        let index = self.instruments.len();
        self.instruments.push(ProgramInstrument {
            id,
            index,
            formula,
            period,
            voice,
            volume,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// The instruments in the form the scheduler takes, in snapshot order.
    pub fn schedule_input(&self) -> Vec<ScheduledInstrument> {
        self.instruments
            .iter()
            .map(|i| ScheduledInstrument::new(i.id, Arc::clone(&i.formula), i.period))
            .collect()
    }
}

impl Default for SynthProgram {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}
