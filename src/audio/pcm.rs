//! Rendered stereo audio and its export formats.

use std::path::Path;

use crate::instrument::NoteDevice;

/// A complete stereo render.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    /// `frames` frames of silence.
    pub fn silent(frames: usize, sample_rate: u32) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
            sample_rate,
        }
    }

    /// Frames per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value across both channels.
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    /// Let `device` fill frames `from..to`.
    pub(crate) fn render_span(&mut self, device: &mut dyn NoteDevice, from: usize, to: usize) {
        if to > from {
            device.render(&mut self.left[from..to], &mut self.right[from..to]);
        }
    }

    /// Interleaved `L, R, L, R, ...` float samples.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (l, r) in self.left.iter().zip(&self.right) {
            out.push(*l);
            out.push(*r);
        }
        out
    }

    /// Interleaved signed 16-bit little-endian PCM.
    ///
    /// Samples are scaled by 32768 and saturate at the `i16` range.
    pub fn to_pcm16_le(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len() * 4);
        for (l, r) in self.left.iter().zip(&self.right) {
            out.extend_from_slice(&to_i16(*l).to_le_bytes());
            out.extend_from_slice(&to_i16(*r).to_le_bytes());
        }
        out
    }

    /// Write a 16-bit stereo WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for (l, r) in self.left.iter().zip(&self.right) {
            writer.write_sample(to_i16(*l))?;
            writer.write_sample(to_i16(*r))?;
        }
        writer.finalize()
    }
}

/// Float-to-int `as` casts saturate, and NaN becomes 0.
fn to_i16(sample: f32) -> i16 {
    (sample * 32768.0) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(left: Vec<f32>, right: Vec<f32>) -> SampleBuffer {
        SampleBuffer {
            left,
            right,
            sample_rate: 44100,
        }
    }

    #[test]
    fn pcm_is_interleaved_little_endian() {
        let b = buffer(vec![0.5, -0.5], vec![0.0, 0.25]);
        let pcm = b.to_pcm16_le();
        assert_eq!(pcm.len(), 8);
        assert_eq!(i16::from_le_bytes([pcm[0], pcm[1]]), 16384);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), 0);
        assert_eq!(i16::from_le_bytes([pcm[4], pcm[5]]), -16384);
        assert_eq!(i16::from_le_bytes([pcm[6], pcm[7]]), 8192);
    }

    #[test]
    fn pcm_saturates() {
        let b = buffer(vec![1.0, 2.0, -1.0, -3.0], vec![f32::NAN; 4]);
        let pcm = b.to_pcm16_le();
        let left: Vec<i16> = pcm
            .chunks(4)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(left, vec![i16::MAX, i16::MAX, i16::MIN, i16::MIN]);
        assert_eq!(i16::from_le_bytes([pcm[2], pcm[3]]), 0);
    }

    #[test]
    fn interleaved_order() {
        let b = buffer(vec![0.1, 0.3], vec![0.2, 0.4]);
        assert_eq!(b.interleaved(), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn silent_buffer_shape() {
        let b = SampleBuffer::silent(22050, 44100);
        assert_eq!(b.len(), 22050);
        assert!((b.duration() - 0.5).abs() < 1e-12);
        assert_eq!(b.peak(), 0.0);
    }

    #[test]
    fn wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let b = buffer(vec![0.5, -0.25, 0.0], vec![0.0, 0.125, -1.0]);
        b.write_wav(&path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![16384, 0, -8192, 4096, 0, -32768]);
    }
}
