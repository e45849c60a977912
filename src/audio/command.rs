//! Commands sent from the main thread to the playback callback.

/// Commands sent from the main thread to the audio thread via ring buffer.
#[derive(Debug)]
pub enum AudioCommand {
    /// Queue a rendered buffer. Interleaved stereo samples (L, R, L, R, ...).
    Samples(Vec<f32>),

    /// Set playback volume (0.0 to 1.0).
    SetVolume(f32),

    /// Drop everything queued and go silent.
    Stop,
}
