//! Playback callback: runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, copies queued samples to the output
//! with volume applied and hard-clips to `[-1, 1]`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;

/// Consumed samples are compacted away once `read_pos` passes this.
const COMPACT_THRESHOLD: usize = 8192;

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct PlaybackCallback {
    consumer: HeapCons<AudioCommand>,
    queue: Vec<f32>,
    read_pos: usize,
    volume: f32,
    /// Samples written to the output so far, shared with the player.
    played: Arc<AtomicUsize>,
}

impl PlaybackCallback {
    pub fn new(consumer: HeapCons<AudioCommand>, played: Arc<AtomicUsize>) -> Self {
        Self {
            consumer,
            queue: Vec::new(),
            read_pos: 0,
            volume: 1.0,
            played,
        }
    }

    /// Fill `output` with the next queued samples, silence on underrun.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::Samples(data) => self.queue.extend_from_slice(&data),
                AudioCommand::SetVolume(v) => self.volume = v.clamp(0.0, 1.0),
                AudioCommand::Stop => {
                    self.queue.clear();
                    self.read_pos = 0;
                }
            }
        }

        let available = self.queue.len() - self.read_pos;
        let copy_len = output.len().min(available);
        let src = &self.queue[self.read_pos..self.read_pos + copy_len];
        for (out, &s) in output[..copy_len].iter_mut().zip(src) {
            *out = (s * self.volume).clamp(-1.0, 1.0);
        }
        output[copy_len..].fill(0.0);

        self.read_pos += copy_len;
        self.played.fetch_add(copy_len, Ordering::Relaxed);

        if self.read_pos >= COMPACT_THRESHOLD {
            self.queue.drain(..self.read_pos);
            self.read_pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::{
        traits::{Producer, Split},
        HeapRb,
    };

    fn setup() -> (ringbuf::HeapProd<AudioCommand>, PlaybackCallback, Arc<AtomicUsize>) {
        let (prod, cons) = HeapRb::<AudioCommand>::new(16).split();
        let played = Arc::new(AtomicUsize::new(0));
        (prod, PlaybackCallback::new(cons, Arc::clone(&played)), played)
    }

    #[test]
    fn silence_on_empty() {
        let (_prod, mut cb, played) = setup();
        let mut out = vec![9.0f32; 32];
        cb.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(played.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn plays_across_calls_and_counts() {
        let (mut prod, mut cb, played) = setup();
        prod.try_push(AudioCommand::Samples(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]))
            .unwrap();

        let mut out = vec![0.0f32; 4];
        cb.process(&mut out);
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.4]);
        cb.process(&mut out);
        assert_eq!(out, vec![0.5, 0.6, 0.0, 0.0]);
        assert_eq!(played.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn volume_and_hard_clip() {
        let (mut prod, mut cb, _) = setup();
        prod.try_push(AudioCommand::SetVolume(0.5)).unwrap();
        prod.try_push(AudioCommand::Samples(vec![0.4, 4.0, -4.0])).unwrap();
        let mut out = vec![0.0f32; 3];
        cb.process(&mut out);
        assert!((out[0] - 0.2).abs() < 1e-6);
        assert_eq!(out[1], 1.0);
        assert_eq!(out[2], -1.0);
    }

    #[test]
    fn stop_drops_queue() {
        let (mut prod, mut cb, _) = setup();
        prod.try_push(AudioCommand::Samples(vec![0.5; 64])).unwrap();
        prod.try_push(AudioCommand::Stop).unwrap();
        let mut out = vec![9.0f32; 16];
        cb.process(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
