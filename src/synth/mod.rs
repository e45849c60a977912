//! Synthesizer facade: owns the live-edited instruments, debounces
//! recompilation and decides when a new render is needed.
//!
//! Edits never compile synchronously. Each formula or period edit re-arms a
//! deadline `debounce` into the future; [`Synthesizer::update`] recompiles
//! stale instruments once the deadline has passed and reports what the plots
//! should do.

pub mod clock;
pub mod instrument;
pub mod program;
pub mod track;

pub use clock::{Clock, ManualClock, SystemClock};
pub use instrument::{Instrument, PlotUpdate};
pub use program::{ProgramInstrument, SynthProgram, DEFAULT_DURATION};
pub use track::{
    default_track_dir, load_track, save_track, InstrumentSettings, Track, TrackError,
};

use std::time::Duration;

use tracing::{debug, warn};

use crate::audio::{RenderError, RenderProgress, Renderer, SampleBuffer};
use crate::config::Config;
use crate::event::{period_points, PlotPoint, ScheduledInstrument};
use crate::instrument::{voice_at, voice_index, NoteDevice, VOICES};

/// Default quiet time after an edit before recompiling.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(750);

/// Default number of instrument slots.
pub const DEFAULT_INSTRUMENT_COUNT: usize = 4;

pub struct Synthesizer {
    instruments: Vec<Instrument>,
    clock: Box<dyn Clock>,
    debounce: Duration,
    /// When the pending recompile may run.
    deadline: Option<Duration>,
    changed: bool,
    duration: f64,
    renderer: Renderer,
}

impl Synthesizer {
    /// A synthesizer with `count` empty, disabled instruments.
    pub fn new(count: usize) -> Self {
        Self {
            instruments: (0..count).map(Instrument::new).collect(),
            clock: Box::new(SystemClock::new()),
            debounce: DEFAULT_DEBOUNCE,
            deadline: None,
            changed: true,
            duration: DEFAULT_DURATION,
            renderer: Renderer::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let renderer = Renderer::new(config.sample_rate).with_velocity(config.note_velocity);
        Self {
            debounce: config.debounce(),
            duration: config.duration_secs,
            renderer,
            ..Self::new(config.instrument_count)
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn instrument(&self, id: usize) -> Option<&Instrument> {
        self.instruments.get(id)
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    fn slot(&mut self, id: usize) -> Option<&mut Instrument> {
        let count = self.instruments.len();
        let slot = self.instruments.get_mut(id);
        if slot.is_none() {
            warn!(id, count, "no such instrument");
        }
        slot
    }

    fn arm(&mut self) {
        self.deadline = Some(self.clock.now() + self.debounce);
    }

    pub fn set_formula(&mut self, id: usize, text: &str) {
        let Some(inst) = self.slot(id) else { return };
        inst.set_formula(text);
        self.changed = true;
        self.arm();
    }

    pub fn set_period(&mut self, id: usize, text: &str) {
        let Some(inst) = self.slot(id) else { return };
        inst.set_period_text(text);
        self.changed = true;
        self.arm();
    }

    pub fn set_enabled(&mut self, id: usize, enabled: bool) {
        let Some(inst) = self.slot(id) else { return };
        inst.set_enabled(enabled);
        self.changed = true;
    }

    /// Set volume in `[0, 1]`; out-of-range values are clamped.
    pub fn set_volume(&mut self, id: usize, volume: f64) {
        let Some(inst) = self.slot(id) else { return };
        inst.set_volume(volume);
        self.changed = true;
    }

    /// Select a voice by catalog index.
    pub fn set_voice(&mut self, id: usize, index: usize) {
        if voice_at(index).is_none() {
            warn!(id, index, "no such voice");
            return;
        }
        let Some(inst) = self.slot(id) else { return };
        inst.set_voice(index);
        self.changed = true;
    }

    /// Select a voice by name. Returns false if the name is unknown.
    pub fn set_voice_by_name(&mut self, id: usize, name: &str) -> bool {
        match voice_index(name) {
            Some(index) => {
                self.set_voice(id, index);
                true
            }
            None => {
                warn!(id, name, "unknown voice name");
                false
            }
        }
    }

    /// Whether anything changed since the last render was taken.
    pub fn has_changes(&self) -> bool {
        self.changed
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn mark_rendered(&mut self) {
        self.changed = false;
    }

    /// Whether an edit is waiting for its debounce deadline.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Recompile stale instruments once the debounce deadline has passed.
    ///
    /// Returns one [`PlotUpdate`] per recompiled instrument; empty while the
    /// deadline is still ahead or when nothing is pending.
    pub fn update(&mut self) -> Vec<PlotUpdate> {
        let due = matches!(self.deadline, Some(deadline) if self.clock.now() >= deadline);
        if due {
            self.flush()
        } else {
            Vec::new()
        }
    }

    /// Recompile stale instruments now, ignoring the debounce deadline.
    pub fn flush(&mut self) -> Vec<PlotUpdate> {
        self.deadline = None;
        let updates: Vec<PlotUpdate> = self
            .instruments
            .iter_mut()
            .filter_map(Instrument::recompile)
            .collect();
        if updates
            .iter()
            .any(|u| !matches!(u, PlotUpdate::Invalid { .. }))
        {
            self.changed = true;
        }
        if !updates.is_empty() {
            debug!(count = updates.len(), "recompiled instruments");
        }
        updates
    }

    /// Snapshot every enabled instrument with a compiled formula and a
    /// usable period.
    pub fn create_program(&self) -> SynthProgram {
        let mut program = SynthProgram::new(self.duration);
        for inst in self.instruments.iter().filter(|i| i.is_playable()) {
            if let (Some(formula), Some(period)) = (inst.program(), inst.period()) {
                program.push(
                    inst.id(),
                    formula.clone(),
                    period,
                    inst.voice(),
                    inst.volume_level(),
                );
            }
        }
        program
    }

    /// Take a snapshot if anything changed, clearing the changed flag.
    pub fn take_program(&mut self) -> Option<SynthProgram> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        Some(self.create_program())
    }

    /// Render a fresh snapshot if anything changed since the last one.
    ///
    /// The changed flag is cleared before rendering, so edits made while the
    /// render runs are picked up by the next call. A failed render restores
    /// the flag.
    pub fn render_if_changed(
        &mut self,
        device: &mut dyn NoteDevice,
        progress: &RenderProgress,
    ) -> Option<Result<SampleBuffer, RenderError>> {
        let program = self.take_program()?;
        let result = self.renderer.render(&program, device, progress);
        if result.is_err() {
            self.changed = true;
        }
        Some(result)
    }

    /// Where `id`'s onsets land on its plot over the render window.
    pub fn instrument_period_points(&self, id: usize) -> Vec<PlotPoint> {
        let Some(inst) = self.instruments.get(id) else {
            return Vec::new();
        };
        match (inst.program(), inst.period()) {
            (Some(formula), Some(period)) => period_points(
                &ScheduledInstrument::new(id, formula.clone(), period),
                self.duration,
            ),
            _ => Vec::new(),
        }
    }

    pub fn export_settings(&self) -> Vec<InstrumentSettings> {
        self.instruments
            .iter()
            .map(|inst| InstrumentSettings {
                function: inst.formula().to_string(),
                period_function: inst.period_text().to_string(),
                volume: inst.volume(),
                instrument_name: inst.voice().name.to_string(),
                enabled: inst.is_enabled(),
            })
            .collect()
    }

    /// Replace every instrument's settings and compile them immediately.
    ///
    /// Slots without a matching entry are reset to empty and disabled;
    /// entries beyond the slot count are dropped.
    pub fn import_settings(&mut self, settings: &[InstrumentSettings]) -> Vec<PlotUpdate> {
        if settings.len() > self.instruments.len() {
            warn!(
                given = settings.len(),
                slots = self.instruments.len(),
                "dropping extra instrument settings"
            );
        }
        let empty = InstrumentSettings::default();
        for (id, inst) in self.instruments.iter_mut().enumerate() {
            let s = settings.get(id).unwrap_or(&empty);
            inst.set_formula(&s.function);
            inst.set_period_text(&s.period_function);
            inst.set_volume(s.volume);
            inst.set_enabled(s.enabled);
            let voice = if s.instrument_name.is_empty() {
                Some(0)
            } else {
                voice_index(&s.instrument_name)
            };
            match voice {
                Some(index) => inst.set_voice(index),
                None => {
                    warn!(id, name = %s.instrument_name, "unknown voice, using {}", VOICES[0].name);
                    inst.set_voice(0);
                }
            }
        }
        self.changed = true;
        self.flush()
    }

    pub fn export_track(&self, name: &str) -> Track {
        Track {
            name: name.to_string(),
            instruments: self.export_settings(),
        }
    }

    pub fn import_track(&mut self, track: &Track) -> Vec<PlotUpdate> {
        self.import_settings(&track.instruments)
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUMENT_COUNT)
    }
}
