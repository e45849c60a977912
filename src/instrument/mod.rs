//! Instruments: the voice catalog, note mapping and the devices that sound
//! scheduled notes.

pub mod device;
pub mod envelope;
pub mod note;
pub mod oscillator;
pub mod tone;
pub mod voices;

pub use device::{DeviceCall, NoteDevice, RecordingDevice, CHANNELS};
pub use envelope::AdsrEnvelope;
pub use note::{formula_note, note_name, AUDIBLE_MAX, LOWEST_NOTE, NOTE_SPAN};
pub use oscillator::Waveform;
pub use tone::{ToneDevice, DEFAULT_MASTER_VOLUME};
pub use voices::{voice_at, voice_index, InstrumentKind, Shape, Timbre, Voice, VOICES};
