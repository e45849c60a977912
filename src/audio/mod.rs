//! Audio: offline rendering of a synth program and playback of the result.
//!
//! Rendering is deterministic and produces a complete [`SampleBuffer`] before
//! anything is played. [`Player`] hands a finished buffer to the default
//! output device through a lock-free command queue.

pub mod callback;
pub mod command;
pub mod pcm;
pub mod progress;
pub mod render;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};
use tracing::{info, warn};

pub use command::AudioCommand;
pub use pcm::SampleBuffer;
pub use progress::RenderProgress;
pub use render::{RenderError, RenderStats, Renderer, DEFAULT_SAMPLE_RATE, DEFAULT_VELOCITY};

use callback::PlaybackCallback;

/// Command queue capacity.
const RING_BUFFER_CAPACITY: usize = 64;

/// Playback errors.
#[derive(Debug)]
pub enum AudioError {
    /// No audio output device found.
    NoOutputDevice,
    /// Failed to build the audio stream.
    StreamBuild(String),
    /// Failed to start or pause the audio stream.
    StreamPlay(String),
    /// The command queue is full.
    BufferFull,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no audio output device found"),
            AudioError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            AudioError::StreamPlay(e) => write!(f, "stream play error: {e}"),
            AudioError::BufferFull => write!(f, "audio command queue is full"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Stereo output on the default device.
pub struct Player {
    stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    sample_rate: u32,
    /// Samples handed to the callback.
    queued: usize,
    played: Arc<AtomicUsize>,
}

impl Player {
    /// Open the default output device as a stereo stream at `sample_rate`.
    pub fn new(sample_rate: u32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let (producer, consumer) = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY).split();
        let played = Arc::new(AtomicUsize::new(0));
        let mut callback = PlaybackCallback::new(consumer, Arc::clone(&played));

        let config = cpal::StreamConfig {
            channels: 2,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| callback.process(data),
                |err: cpal::StreamError| warn!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        info!(sample_rate, "audio output opened");
        Ok(Self {
            stream,
            producer,
            sample_rate,
            queued: 0,
            played,
        })
    }

    /// Queue `buffer` after whatever is already playing.
    pub fn play(&mut self, buffer: &SampleBuffer) -> Result<(), AudioError> {
        if buffer.sample_rate != self.sample_rate {
            warn!(
                buffer = buffer.sample_rate,
                stream = self.sample_rate,
                "sample rate mismatch, playback pitch will be off"
            );
        }
        let samples = buffer.interleaved();
        let len = samples.len();
        self.producer
            .try_push(AudioCommand::Samples(samples))
            .map_err(|_| AudioError::BufferFull)?;
        self.queued += len;
        Ok(())
    }

    /// Set playback volume (clamped to 0.0..=1.0 on the audio thread).
    pub fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.producer
            .try_push(AudioCommand::SetVolume(volume))
            .map_err(|_| AudioError::BufferFull)
    }

    /// Drop all queued audio.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        self.producer
            .try_push(AudioCommand::Stop)
            .map_err(|_| AudioError::BufferFull)?;
        self.queued = self.played.load(Ordering::Relaxed);
        Ok(())
    }

    /// Whether every queued sample has been written to the device.
    pub fn is_finished(&self) -> bool {
        self.played.load(Ordering::Relaxed) >= self.queued
    }

    /// Fraction of queued audio already played.
    pub fn position(&self) -> f64 {
        if self.queued == 0 {
            return 1.0;
        }
        (self.played.load(Ordering::Relaxed) as f64 / self.queued as f64).min(1.0)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))
    }

    pub fn resume(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))
    }
}
