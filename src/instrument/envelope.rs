//! ADSR envelope for gated notes whose length is not known up front.

/// Attack-Decay-Sustain-Release envelope.
///
/// All time values are in seconds. Sustain is a level (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrEnvelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrEnvelope {
    pub const fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Level `t` seconds after note-on while the key is still held.
    ///
    /// - During `[0, attack)`: linear ramp from 0 to 1.
    /// - During `[attack, attack+decay)`: linear ramp from 1 to sustain level.
    /// - After that: sustain level.
    pub fn held(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            let decay_t = (t - self.attack) / self.decay;
            1.0 - decay_t * (1.0 - self.sustain)
        } else {
            self.sustain
        }
    }

    /// Level `t` seconds into the release, starting from `from`.
    pub fn released(&self, from: f64, t: f64) -> f64 {
        if t >= self.release {
            return 0.0;
        }
        from * (1.0 - t / self.release)
    }

    /// Level `t` seconds after note-on for a note whose key went up at
    /// `gate_off` (seconds after note-on), if it has.
    pub fn amplitude(&self, t: f64, gate_off: Option<f64>) -> f64 {
        match gate_off {
            Some(off) if t >= off => self.released(self.held(off), t - off),
            _ => self.held(t),
        }
    }

    /// Whether a released note has fully decayed.
    pub fn is_finished(&self, t: f64, gate_off: Option<f64>) -> bool {
        match gate_off {
            Some(off) => t - off >= self.release,
            None => false,
        }
    }
}
