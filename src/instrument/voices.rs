//! Voice catalog: the General MIDI presets players can pick from.
//!
//! Tracks store the voice by name so saved files survive reordering of this
//! table.

use serde::{Deserialize, Serialize};

use super::envelope::AdsrEnvelope;
use super::oscillator::Waveform;

/// Instrument family. Drives the plot marker shape and level bonus rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    Bass,
    Drum,
    Keyboard,
    Brass,
    String,
    Other,
    Any,
}

/// Marker shape drawn on the plot for an instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Hexagon,
    Star,
    Cross,
    Bonus,
}

impl InstrumentKind {
    pub fn shape(self) -> Shape {
        match self {
            InstrumentKind::Bass => Shape::Star,
            InstrumentKind::Keyboard => Shape::Square,
            InstrumentKind::Brass => Shape::Triangle,
            InstrumentKind::String => Shape::Hexagon,
            InstrumentKind::Drum => Shape::Circle,
            InstrumentKind::Any => Shape::Bonus,
            InstrumentKind::Other => Shape::Cross,
        }
    }

    /// Whether an instrument of this kind satisfies a target asking for `want`.
    pub fn matches(self, want: InstrumentKind) -> bool {
        want == InstrumentKind::Any || self == want
    }
}

/// How the built-in tone device voices a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timbre {
    pub waveform: Waveform,
    pub envelope: AdsrEnvelope,
    /// Linear output gain before channel volume.
    pub gain: f64,
}

/// A selectable voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    pub name: &'static str,
    pub kind: InstrumentKind,
    /// Preset index in the soundfont.
    pub patch: u8,
}

impl Voice {
    pub fn timbre(&self) -> Timbre {
        match self.kind {
            InstrumentKind::Bass => Timbre {
                waveform: Waveform::Saw,
                envelope: AdsrEnvelope::new(0.005, 0.12, 0.6, 0.08),
                gain: 0.5,
            },
            InstrumentKind::Drum => Timbre {
                waveform: Waveform::Noise,
                envelope: AdsrEnvelope::new(0.001, 0.15, 0.0, 0.05),
                gain: 0.6,
            },
            InstrumentKind::Keyboard => Timbre {
                waveform: Waveform::Triangle,
                envelope: AdsrEnvelope::new(0.004, 0.4, 0.35, 0.25),
                gain: 0.7,
            },
            InstrumentKind::Brass => Timbre {
                waveform: Waveform::Square,
                envelope: AdsrEnvelope::new(0.04, 0.1, 0.7, 0.12),
                gain: 0.35,
            },
            InstrumentKind::String => Timbre {
                waveform: Waveform::Saw,
                envelope: AdsrEnvelope::new(0.002, 0.6, 0.2, 0.3),
                gain: 0.45,
            },
            InstrumentKind::Other | InstrumentKind::Any => Timbre {
                waveform: Waveform::Sine,
                envelope: AdsrEnvelope::new(0.08, 0.2, 0.8, 0.5),
                gain: 0.7,
            },
        }
    }
}

const fn voice(kind: InstrumentKind, name: &'static str, patch: u8) -> Voice {
    Voice { name, kind, patch }
}

/// The catalog, grouped by kind.
pub static VOICES: &[Voice] = &[
    voice(InstrumentKind::Bass, "Synth Bass 1", 88),
    voice(InstrumentKind::Bass, "Synth Bass 2", 87),
    voice(InstrumentKind::Bass, "Slap Bass 1", 90),
    voice(InstrumentKind::Bass, "Slap Bass 2", 89),
    voice(InstrumentKind::Bass, "Bass & Lead", 49),
    voice(InstrumentKind::Bass, "Distortion Guitar", 96),
    voice(InstrumentKind::Bass, "5th Saw Wave", 50),
    voice(InstrumentKind::Bass, "Saw Wave", 55),
    voice(InstrumentKind::Bass, "Square Wave", 56),
    voice(InstrumentKind::Keyboard, "Piano 1", 126),
    voice(InstrumentKind::Keyboard, "Piano 2", 125),
    voice(InstrumentKind::Keyboard, "Piano 3", 124),
    voice(InstrumentKind::Keyboard, "Piano 4", 8),
    voice(InstrumentKind::Keyboard, "Honky Tonk", 123),
    voice(InstrumentKind::Keyboard, "Clavinet", 119),
    voice(InstrumentKind::Keyboard, "Harpsichord", 120),
    voice(InstrumentKind::Keyboard, "Polysynth", 46),
    voice(InstrumentKind::Brass, "Synth Brass 1", 70),
    voice(InstrumentKind::Brass, "Synth Brass 2", 69),
    voice(InstrumentKind::Brass, "Brass", 71),
    voice(InstrumentKind::Brass, "Bassoon", 65),
    voice(InstrumentKind::Brass, "French Horns", 68),
    voice(InstrumentKind::Brass, "Tuba", 73),
    voice(InstrumentKind::Brass, "Bagpipe", 27),
    voice(InstrumentKind::Brass, "Mute Trumpet", 72),
    voice(InstrumentKind::String, "Charang", 52),
    voice(InstrumentKind::String, "Banjo", 31),
    voice(InstrumentKind::String, "Koto", 29),
    voice(InstrumentKind::String, "Synth Strings", 79),
    voice(InstrumentKind::String, "Dulcimer", 111),
    voice(InstrumentKind::String, "Guitar Harmonics", 95),
    voice(InstrumentKind::String, "Electronic", 5),
    voice(InstrumentKind::String, "Clean Guitar", 99),
    voice(InstrumentKind::String, "Nylon Guitar", 102),
    voice(InstrumentKind::Drum, "Timpani", 80),
    voice(InstrumentKind::Drum, "Synth Drum", 18),
    voice(InstrumentKind::Drum, "Taiko Drum", 20),
    voice(InstrumentKind::Drum, "Steel Drum", 22),
    voice(InstrumentKind::Drum, "Tom Drum", 19),
    voice(InstrumentKind::Other, "Tinker Bell", 24),
    voice(InstrumentKind::Other, "Voice Oohs", 78),
    voice(InstrumentKind::Other, "Choir Aahs", 131),
    voice(InstrumentKind::Other, "Soundtrack", 39),
];

/// Index of the voice with the given name.
pub fn voice_index(name: &str) -> Option<usize> {
    VOICES.iter().position(|v| v.name == name)
}

/// Look up a voice by catalog index.
pub fn voice_at(index: usize) -> Option<&'static Voice> {
    VOICES.get(index)
}
