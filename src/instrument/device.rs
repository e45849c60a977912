//! The note device boundary the renderer drives.

use super::voices::Voice;

/// Number of addressable channels on a device.
pub const CHANNELS: usize = 16;

/// A multi-channel note synthesizer.
///
/// Channels are independent: each has a voice, a volume and at most one
/// sounding key. Commands addressed to a channel `>= CHANNELS` are ignored.
pub trait NoteDevice: Send {
    /// Silence everything and restore per-channel defaults.
    fn reset(&mut self);

    fn set_voice(&mut self, channel: u8, voice: &'static Voice);

    /// Channel volume, 0..=127.
    fn set_volume(&mut self, channel: u8, volume: u8);

    /// Start `key` on `channel`, releasing whatever the channel was holding.
    fn note_on(&mut self, channel: u8, key: u8, velocity: u8);

    /// Release every key on `channel`. Release tails keep sounding.
    fn note_off_all(&mut self, channel: u8);

    /// Render the next `left.len()` frames. Both slices have equal length.
    fn render(&mut self, left: &mut [f32], right: &mut [f32]);
}

/// One command received by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Reset,
    SetVoice { channel: u8, voice: &'static str },
    SetVolume { channel: u8, volume: u8 },
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOffAll { channel: u8 },
    /// `frames` frames were rendered after `position` frames.
    Render { position: usize, frames: usize },
}

/// A silent device that logs every command it receives.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub calls: Vec<DeviceCall>,
    position: usize,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(frame, channel, key)` for every note-on, in order.
    pub fn notes(&self) -> Vec<(usize, u8, u8)> {
        let mut frame = 0;
        let mut notes = Vec::new();
        for call in &self.calls {
            match *call {
                DeviceCall::Reset => frame = 0,
                DeviceCall::Render { position, frames } => frame = position + frames,
                DeviceCall::NoteOn { channel, key, .. } => notes.push((frame, channel, key)),
                _ => {}
            }
        }
        notes
    }
}

impl NoteDevice for RecordingDevice {
    fn reset(&mut self) {
        self.position = 0;
        self.calls.push(DeviceCall::Reset);
    }

    fn set_voice(&mut self, channel: u8, voice: &'static Voice) {
        self.calls.push(DeviceCall::SetVoice {
            channel,
            voice: voice.name,
        });
    }

    fn set_volume(&mut self, channel: u8, volume: u8) {
        self.calls.push(DeviceCall::SetVolume { channel, volume });
    }

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8) {
        self.calls.push(DeviceCall::NoteOn {
            channel,
            key,
            velocity,
        });
    }

    fn note_off_all(&mut self, channel: u8) {
        self.calls.push(DeviceCall::NoteOffAll { channel });
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        left.fill(0.0);
        right.fill(0.0);
        self.calls.push(DeviceCall::Render {
            position: self.position,
            frames: left.len(),
        });
        self.position += left.len();
    }
}
