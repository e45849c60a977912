//! Oscillator primitives: waveform generation for the tone device.

use std::f64::consts::PI;

use rand::Rng;

/// Available waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
    /// White noise. Ignores phase.
    Noise,
}

/// Generate a single sample for the given waveform at the specified phase.
///
/// `phase` is in the range [0.0, 1.0), representing one full cycle.
/// `rng` is only drawn from for [`Waveform::Noise`].
/// Returns a value in [-1.0, 1.0].
pub fn oscillator<R: Rng + ?Sized>(waveform: Waveform, phase: f64, rng: &mut R) -> f64 {
    match waveform {
        Waveform::Sine => (phase * 2.0 * PI).sin(),
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
        Waveform::Noise => rng.gen_range(-1.0..1.0),
    }
}

/// Convert a MIDI note number to frequency in Hz.
///
/// Standard tuning: A4 (MIDI 69) = 440 Hz.
pub fn midi_to_freq(note: u8) -> f64 {
    440.0 * 2.0f64.powf((f64::from(note) - 69.0) / 12.0)
}

/// Advance a phase accumulator by one sample, wrapping into [0, 1).
pub fn advance_phase(phase: f64, freq: f64, sample_rate: u32) -> f64 {
    (phase + freq / f64::from(sample_rate)).fract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn sine_quarter_is_peak() {
        assert_approx_eq!(oscillator(Waveform::Sine, 0.25, &mut rng()), 1.0);
        assert_approx_eq!(oscillator(Waveform::Sine, 0.0, &mut rng()), 0.0);
    }

    #[test]
    fn saw_ramps() {
        assert_approx_eq!(oscillator(Waveform::Saw, 0.0, &mut rng()), -1.0);
        assert_approx_eq!(oscillator(Waveform::Saw, 0.5, &mut rng()), 0.0);
    }

    #[test]
    fn square_halves() {
        assert_approx_eq!(oscillator(Waveform::Square, 0.25, &mut rng()), 1.0);
        assert_approx_eq!(oscillator(Waveform::Square, 0.75, &mut rng()), -1.0);
    }

    #[test]
    fn triangle_turns() {
        assert_approx_eq!(oscillator(Waveform::Triangle, 0.25, &mut rng()), 1.0);
        assert_approx_eq!(oscillator(Waveform::Triangle, 0.75, &mut rng()), -1.0);
    }

    #[test]
    fn noise_is_seeded() {
        let a: Vec<f64> = {
            let mut r = rng();
            (0..16).map(|_| oscillator(Waveform::Noise, 0.0, &mut r)).collect()
        };
        let b: Vec<f64> = {
            let mut r = rng();
            (0..16).map(|_| oscillator(Waveform::Noise, 0.0, &mut r)).collect()
        };
        assert_eq!(a, b);
        assert!(a.iter().any(|v| v.abs() > 1e-3));
    }

    #[test]
    fn all_waveforms_bounded() {
        let mut r = rng();
        for wf in [
            Waveform::Sine,
            Waveform::Saw,
            Waveform::Square,
            Waveform::Triangle,
            Waveform::Noise,
        ] {
            for i in 0..1000 {
                let phase = i as f64 / 1000.0;
                let v = oscillator(wf, phase, &mut r);
                assert!(
                    (-1.0..=1.0).contains(&v),
                    "{wf:?} at phase {phase}: {v} out of bounds"
                );
            }
        }
    }

    #[test]
    fn midi_69_is_440() {
        assert_approx_eq!(midi_to_freq(69), 440.0);
    }

    #[test]
    fn midi_octave_doubles_freq() {
        assert_approx_eq!(midi_to_freq(72) / midi_to_freq(60), 2.0);
    }

    #[test]
    fn phase_wraps() {
        let p = advance_phase(0.9, 8820.0, 44100);
        assert_approx_eq!(p, 0.1);
    }
}
