//! Built-in note device: one oscillator voice per channel plus release tails.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use super::device::{NoteDevice, CHANNELS};
use super::oscillator::{advance_phase, midi_to_freq, oscillator};
use super::voices::{Timbre, Voice, VOICES};

/// Output scale applied after mixing all channels.
pub const DEFAULT_MASTER_VOLUME: f64 = 0.75;

const DEFAULT_CHANNEL_VOLUME: u8 = 100;

/// Upper bound on simultaneously sounding notes; the oldest released note is
/// dropped first.
const MAX_SOUNDING: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Channel {
    voice: &'static Voice,
    volume: u8,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            voice: &VOICES[0],
            volume: DEFAULT_CHANNEL_VOLUME,
        }
    }
}

#[derive(Debug, Clone)]
struct Sounding {
    channel: u8,
    timbre: Timbre,
    freq: f64,
    phase: f64,
    gain: f64,
    /// Frames since note-on.
    age: u64,
    /// Frame (relative to note-on) at which the key went up.
    gate_off: Option<u64>,
}

impl Sounding {
    fn is_held(&self) -> bool {
        self.gate_off.is_none()
    }
}

/// Oscillator-based [`NoteDevice`] with a seeded noise source.
pub struct ToneDevice {
    sample_rate: u32,
    master_volume: f64,
    seed: u64,
    rng: ChaCha8Rng,
    channels: [Channel; CHANNELS],
    sounding: Vec<Sounding>,
}

impl ToneDevice {
    pub fn new(sample_rate: u32, seed: u64) -> Self {
        Self {
            sample_rate,
            master_volume: DEFAULT_MASTER_VOLUME,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            channels: [Channel::default(); CHANNELS],
            sounding: Vec::with_capacity(MAX_SOUNDING),
        }
    }

    pub fn with_master_volume(mut self, volume: f64) -> Self {
        self.master_volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of notes currently producing sound, held or releasing.
    pub fn sounding(&self) -> usize {
        self.sounding.len()
    }

    fn channel(&mut self, channel: u8) -> Option<&mut Channel> {
        self.channels.get_mut(usize::from(channel))
    }

    fn release(&mut self, channel: u8) {
        for note in self.sounding.iter_mut() {
            if note.channel == channel && note.is_held() {
                note.gate_off = Some(note.age);
            }
        }
    }

    fn make_room(&mut self) {
        if self.sounding.len() < MAX_SOUNDING {
            return;
        }
        let victim = self
            .sounding
            .iter()
            .position(|n| !n.is_held())
            .unwrap_or(0);
        self.sounding.remove(victim);
    }
}

impl NoteDevice for ToneDevice {
    fn reset(&mut self) {
        self.sounding.clear();
        self.channels = [Channel::default(); CHANNELS];
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    fn set_voice(&mut self, channel: u8, voice: &'static Voice) {
        if let Some(ch) = self.channel(channel) {
            ch.voice = voice;
        }
    }

    fn set_volume(&mut self, channel: u8, volume: u8) {
        if let Some(ch) = self.channel(channel) {
            ch.volume = volume.min(127);
        }
    }

    fn note_on(&mut self, channel: u8, key: u8, velocity: u8) {
        let Some(ch) = self.channels.get(usize::from(channel)).copied() else {
            trace!(channel, "note on ignored: no such channel");
            return;
        };
        self.release(channel);
        self.make_room();

        let timbre = ch.voice.timbre();
        let gain = timbre.gain
            * f64::from(velocity.min(127)) / 127.0
            * f64::from(ch.volume) / 127.0;
        self.sounding.push(Sounding {
            channel,
            timbre,
            freq: midi_to_freq(key),
            phase: 0.0,
            gain,
            age: 0,
            gate_off: None,
        });
    }

    fn note_off_all(&mut self, channel: u8) {
        self.release(channel);
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let rate = f64::from(self.sample_rate);

        for i in 0..frames {
            let mut mix = 0.0;
            for note in self.sounding.iter_mut() {
                let t = note.age as f64 / rate;
                let off = note.gate_off.map(|f| f as f64 / rate);
                let env = note.timbre.envelope.amplitude(t, off);
                mix += oscillator(note.timbre.waveform, note.phase, &mut self.rng) * env * note.gain;
                note.phase = advance_phase(note.phase, note.freq, self.sample_rate);
                note.age += 1;
            }
            let out = (mix * self.master_volume) as f32;
            left[i] = out;
            right[i] = out;
        }

        self.sounding.retain(|n| {
            let t = n.age as f64 / rate;
            let off = n.gate_off.map(|f| f as f64 / rate);
            !n.timbre.envelope.is_finished(t, off)
        });
    }
}
