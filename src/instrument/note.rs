//! Mapping formula values onto note numbers.

/// Lowest note a formula can produce (C2).
pub const LOWEST_NOTE: u8 = 36;

/// Semitones the audible window is stretched across, four octaves.
pub const NOTE_SPAN: u8 = 48;

/// Largest `|f(t)|` that still produces a note.
pub const AUDIBLE_MAX: f64 = 3.0;

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Map a formula value to a note, or `None` for a rest.
///
/// `|y|` in `[0, 3]` is spread linearly over
/// `LOWEST_NOTE ..= LOWEST_NOTE + NOTE_SPAN`. Anything else, including NaN,
/// is a rest.
pub fn formula_note(y: f64) -> Option<u8> {
    let magnitude = y.abs();
    if !(0.0..=AUDIBLE_MAX).contains(&magnitude) {
        return None;
    }
    let offset = (magnitude * f64::from(NOTE_SPAN) / AUDIBLE_MAX).round() as u8;
    Some(LOWEST_NOTE + offset)
}

/// Note name in scientific pitch notation (MIDI 60 is C4).
pub fn note_name(note: u8) -> String {
    let octave = i32::from(note / 12) - 1;
    format!("{}{}", NAMES[usize::from(note % 12)], octave)
}
