//! Offline renderer: walks the merged onsets and drives a note device into
//! a complete stereo buffer.

use std::fmt;

use tracing::debug;

use crate::event::Scheduler;
use crate::expr::Evaluator;
use crate::instrument::{formula_note, NoteDevice, CHANNELS};
use crate::synth::SynthProgram;

use super::pcm::SampleBuffer;
use super::progress::RenderProgress;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Velocity of every triggered note unless configured otherwise.
pub const DEFAULT_VELOCITY: u8 = 40;

/// Render errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The progress cell was cancelled between onset groups.
    Cancelled,
    /// Duration is negative or not finite.
    InvalidDuration(f64),
    InvalidSampleRate(u32),
    /// Instrument id does not fit a device channel.
    ChannelOutOfRange(usize),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Cancelled => write!(f, "render cancelled"),
            RenderError::InvalidDuration(d) => write!(f, "invalid render duration: {d}"),
            RenderError::InvalidSampleRate(sr) => write!(f, "invalid sample rate: {sr}"),
            RenderError::ChannelOutOfRange(id) => {
                write!(f, "instrument {id} has no device channel (max {})", CHANNELS - 1)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Stats from the last render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub groups: usize,
    pub notes: usize,
    pub rests: usize,
}

pub struct Renderer {
    sample_rate: u32,
    velocity: u8,
    scheduler: Scheduler,
    stats: RenderStats,
}

impl Renderer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            velocity: DEFAULT_VELOCITY,
            scheduler: Scheduler::new(),
            stats: RenderStats::default(),
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity.min(127);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Render `program` to a buffer of `round(duration × sample_rate)` frames.
    ///
    /// Onsets sharing a time are handled as one group: the device is rendered
    /// up to the group's absolute frame, then every event in the group
    /// silences its channel and either triggers a note or rests.
    pub fn render(
        &mut self,
        program: &SynthProgram,
        device: &mut dyn NoteDevice,
        progress: &RenderProgress,
    ) -> Result<SampleBuffer, RenderError> {
        if self.sample_rate == 0 {
            return Err(RenderError::InvalidSampleRate(self.sample_rate));
        }
        if !program.duration.is_finite() || program.duration < 0.0 {
            return Err(RenderError::InvalidDuration(program.duration));
        }
        if let Some(bad) = program.instruments.iter().find(|i| i.id >= CHANNELS) {
            return Err(RenderError::ChannelOutOfRange(bad.id));
        }

        let rate = f64::from(self.sample_rate);
        let total = (program.duration * rate).round() as usize;
        let mut buffer = SampleBuffer::silent(total, self.sample_rate);
        let mut stats = RenderStats::default();

        device.reset();
        for inst in &program.instruments {
            device.set_voice(inst.id as u8, inst.voice);
            device.set_volume(inst.id as u8, inst.volume);
        }

        let events = self.scheduler.run(&program.schedule_input(), program.duration);
        let mut evaluator = Evaluator::new();
        let mut position = 0;
        let mut start = 0;

        while start < events.len() {
            if progress.is_cancelled() {
                debug!(at = events[start].time, "render cancelled");
                return Err(RenderError::Cancelled);
            }

            let time = events[start].time;
            let end = start + events[start..].iter().take_while(|e| e.time == time).count();

            let target = ((time * rate).round() as usize).min(total);
            buffer.render_span(device, position, target);
            position = target;

            for event in &events[start..end] {
                let inst = &program.instruments[event.index];
                let channel = inst.id as u8;
                device.note_off_all(channel);
                match formula_note(evaluator.run(&inst.formula, event.time)) {
                    Some(key) => {
                        device.note_on(channel, key, self.velocity);
                        stats.notes += 1;
                    }
                    None => stats.rests += 1,
                }
            }

            stats.groups += 1;
            start = end;
            progress.set(start as f64 / events.len() as f64);
        }

        buffer.render_span(device, position, total);
        progress.set(1.0);

        debug!(
            frames = total,
            groups = stats.groups,
            notes = stats.notes,
            rests = stats.rests,
            "render finished"
        );
        self.stats = stats;
        Ok(buffer)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Compiler;
    use crate::instrument::{DeviceCall, RecordingDevice, ToneDevice, VOICES};
    use std::sync::Arc;

    const SR: u32 = 1000;

    fn program(duration: f64, instruments: &[(usize, &str, f64)]) -> SynthProgram {
        let mut p = SynthProgram::new(duration);
        for &(id, formula, period) in instruments {
            p.push(id, Arc::new(Compiler::compile(formula).unwrap()), period, &VOICES[0], 127);
        }
        p
    }

    fn render(p: &SynthProgram) -> (SampleBuffer, RecordingDevice) {
        let mut dev = RecordingDevice::new();
        let buf = Renderer::new(SR)
            .render(p, &mut dev, &RenderProgress::new())
            .unwrap();
        (buf, dev)
    }

    #[test]
    fn notes_land_on_absolute_frames() {
        let (buf, dev) = render(&program(2.0, &[(0, "0", 0.25)]));
        assert_eq!(buf.len(), 2000);
        let frames: Vec<usize> = dev.notes().iter().map(|n| n.0).collect();
        assert_eq!(frames, vec![250, 500, 750, 1000, 1250, 1500, 1750, 2000]);
        assert!(dev.notes().iter().all(|n| n.2 == 36));
    }

    #[test]
    fn out_of_window_values_rest() {
        let p = program(3.0, &[(0, "4", 1.0)]);
        let mut renderer = Renderer::new(SR);
        let mut dev = RecordingDevice::new();
        let buf = renderer.render(&p, &mut dev, &RenderProgress::new()).unwrap();
        assert!(dev.notes().is_empty());
        assert_eq!(buf.len(), 3000);
        assert_eq!(renderer.stats().rests, 3);
        let offs = dev
            .calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::NoteOffAll { .. }))
            .count();
        assert_eq!(offs, 3);
    }

    #[test]
    fn magnitude_is_used() {
        let (_, dev) = render(&program(1.0, &[(0, "-1.5", 1.0)]));
        assert_eq!(dev.notes(), vec![(1000, 0, 60)]);
    }

    #[test]
    fn channel_follows_id() {
        let (_, dev) = render(&program(1.0, &[(2, "0", 1.0), (0, "3", 0.5)]));
        assert_eq!(dev.notes(), vec![(500, 0, 84), (1000, 2, 36), (1000, 0, 84)]);
    }

    #[test]
    fn device_is_configured_before_notes() {
        let (_, dev) = render(&program(1.0, &[(1, "0", 1.0)]));
        assert_eq!(dev.calls[0], DeviceCall::Reset);
        assert_eq!(
            dev.calls[1],
            DeviceCall::SetVoice {
                channel: 1,
                voice: VOICES[0].name
            }
        );
        assert_eq!(dev.calls[2], DeviceCall::SetVolume { channel: 1, volume: 127 });
    }

    #[test]
    fn velocity_is_configurable() {
        let p = program(1.0, &[(0, "0", 1.0)]);
        let mut dev = RecordingDevice::new();
        Renderer::new(SR)
            .with_velocity(90)
            .render(&p, &mut dev, &RenderProgress::new())
            .unwrap();
        assert!(dev
            .calls
            .iter()
            .any(|c| matches!(c, DeviceCall::NoteOn { velocity: 90, .. })));
    }

    #[test]
    fn empty_program_is_silence() {
        let (buf, dev) = render(&program(0.5, &[]));
        assert_eq!(buf.len(), 500);
        assert_eq!(buf.peak(), 0.0);
        assert!(dev.notes().is_empty());
    }

    #[test]
    fn progress_reaches_one() {
        let p = program(2.0, &[(0, "x", 0.5)]);
        let progress = RenderProgress::new();
        Renderer::new(SR)
            .render(&p, &mut RecordingDevice::new(), &progress)
            .unwrap();
        assert_eq!(progress.fraction(), 1.0);
    }

    #[test]
    fn cancelled_render_fails() {
        let p = program(2.0, &[(0, "x", 0.5)]);
        let progress = RenderProgress::new();
        progress.cancel();
        let err = Renderer::new(SR)
            .render(&p, &mut RecordingDevice::new(), &progress)
            .unwrap_err();
        assert_eq!(err, RenderError::Cancelled);
    }

    #[test]
    fn rejects_bad_input() {
        let mut r = Renderer::new(SR);
        let mut dev = RecordingDevice::new();
        let progress = RenderProgress::new();
        assert!(matches!(
            r.render(&program(f64::NAN, &[]), &mut dev, &progress),
            Err(RenderError::InvalidDuration(_))
        ));
        assert_eq!(
            r.render(&program(1.0, &[(CHANNELS, "0", 1.0)]), &mut dev, &progress),
            Err(RenderError::ChannelOutOfRange(CHANNELS))
        );
        assert_eq!(
            Renderer::new(0).render(&program(1.0, &[]), &mut dev, &progress),
            Err(RenderError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn tone_device_render_is_deterministic() {
        let p = program(1.0, &[(0, "sin(x)", 0.1), (1, "x", 0.3)]);
        let run = || {
            let mut dev = ToneDevice::new(SR, 42);
            Renderer::new(SR)
                .render(&p, &mut dev, &RenderProgress::new())
                .unwrap()
        };
        let a = run();
        assert_eq!(a, run());
        assert!(a.peak() > 0.0);
    }
}
