//! Track persistence: saved instrument settings in YAML or JSON.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings for one instrument slot, as saved on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSettings {
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub period_function: String,
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Voice catalog name.
    #[serde(default)]
    pub instrument_name: String,
    #[serde(default)]
    pub enabled: bool,
}

fn default_volume() -> f64 {
    1.0
}

impl InstrumentSettings {
    pub fn new(function: &str, period_function: &str, instrument_name: &str) -> Self {
        Self {
            function: function.to_string(),
            period_function: period_function.to_string(),
            volume: 1.0,
            instrument_name: instrument_name.to_string(),
            enabled: true,
        }
    }
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            function: String::new(),
            period_function: String::new(),
            volume: default_volume(),
            instrument_name: String::new(),
            enabled: false,
        }
    }
}

/// A saved session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instruments: Vec<InstrumentSettings>,
}

impl Track {
    /// The two-instrument session a new game starts with.
    pub fn session_default() -> Self {
        Self {
            name: "session".to_string(),
            instruments: vec![
                InstrumentSettings::new("sin(x/2) - 0.2", "pi/9", "Synth Bass 1"),
                InstrumentSettings::new("pi/4", "pi/3", "Synth Bass 1"),
            ],
        }
    }
}

/// Track file errors.
#[derive(Debug)]
pub enum TrackError {
    Io(io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    /// The file extension is neither YAML nor JSON.
    UnknownFormat(PathBuf),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::Io(e) => write!(f, "track I/O error: {e}"),
            TrackError::Yaml(e) => write!(f, "track YAML error: {e}"),
            TrackError::Json(e) => write!(f, "track JSON error: {e}"),
            TrackError::UnknownFormat(p) => {
                write!(f, "unknown track format: {} (expected .yaml, .yml or .json)", p.display())
            }
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::Io(e) => Some(e),
            TrackError::Yaml(e) => Some(e),
            TrackError::Json(e) => Some(e),
            TrackError::UnknownFormat(_) => None,
        }
    }
}

impl From<io::Error> for TrackError {
    fn from(e: io::Error) -> Self {
        TrackError::Io(e)
    }
}

impl From<serde_yaml::Error> for TrackError {
    fn from(e: serde_yaml::Error) -> Self {
        TrackError::Yaml(e)
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(e: serde_json::Error) -> Self {
        TrackError::Json(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, TrackError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(TrackError::UnknownFormat(path.to_path_buf())),
    }
}

/// Default directory for saved tracks.
pub fn default_track_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".sinecord");
    path.push("tracks");
    path
}

/// Load a track, picking the format from the file extension.
pub fn load_track(path: &Path) -> Result<Track, TrackError> {
    let format = format_of(path)?;
    let content = std::fs::read_to_string(path)?;
    let track = match format {
        Format::Yaml => serde_yaml::from_str(&content)?,
        Format::Json => serde_json::from_str(&content)?,
    };
    Ok(track)
}

/// Save a track, creating parent directories as needed.
pub fn save_track(path: &Path, track: &Track) -> Result<(), TrackError> {
    let content = match format_of(path)? {
        Format::Yaml => serde_yaml::to_string(track)?,
        Format::Json => serde_json::to_string_pretty(track)?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
