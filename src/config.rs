//! Configuration: loads optional ~/.sinecord/config.yaml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::audio::{DEFAULT_SAMPLE_RATE, DEFAULT_VELOCITY};
use crate::instrument::{CHANNELS, DEFAULT_MASTER_VOLUME};
use crate::synth::{DEFAULT_DEBOUNCE, DEFAULT_DURATION, DEFAULT_INSTRUMENT_COUNT};

/// Runtime settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Length of each render in seconds.
    pub duration_secs: f64,
    /// Quiet time after the last edit before formulas are recompiled.
    pub debounce_ms: u64,
    /// Number of instrument slots in a session.
    pub instrument_count: usize,
    /// Tone device output scale, 0.0 to 1.0.
    pub master_volume: f64,
    /// Velocity of triggered notes, 0 to 127.
    pub note_velocity: u8,
    /// Seed for the tone device noise source.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: DEFAULT_DURATION,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            instrument_count: DEFAULT_INSTRUMENT_COUNT,
            master_volume: DEFAULT_MASTER_VOLUME,
            note_velocity: DEFAULT_VELOCITY,
            seed: 42,
        }
    }
}

impl Config {
    /// Load from the default path, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        config_path()
            .and_then(|path| Self::from_file(&path))
            .unwrap_or_default()
    }

    /// Parse a config file. Returns None if it doesn't exist or is invalid.
    pub fn from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match Self::from_yaml(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), "ignoring invalid config: {e}");
                None
            }
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<Self>(yaml).map(Self::sanitized)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Pull out-of-range values back to something usable.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.sample_rate == 0 {
            self.sample_rate = defaults.sample_rate;
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            self.duration_secs = defaults.duration_secs;
        }
        self.instrument_count = self.instrument_count.clamp(1, CHANNELS);
        self.master_volume = if self.master_volume.is_finite() {
            self.master_volume.clamp(0.0, 1.0)
        } else {
            defaults.master_volume
        };
        self.note_velocity = self.note_velocity.min(127);
        self
    }
}

/// Get the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".sinecord").join("config.yaml"))
}
