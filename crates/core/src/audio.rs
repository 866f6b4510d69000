//! Synthesized speech audio

use serde::{Deserialize, Serialize};

/// Raw audio returned by a text-to-speech backend
///
/// Samples are signed 16-bit little-endian PCM, mono.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechAudio {
    /// PCM bytes
    pub data: Vec<u8>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// MIME type reported by the backend
    pub mime_type: String,
}

impl SpeechAudio {
    pub fn new(data: Vec<u8>, sample_rate: u32, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            sample_rate,
            mime_type: mime_type.into(),
        }
    }

    /// Number of 16-bit samples
    pub fn sample_count(&self) -> usize {
        self.data.len() / 2
    }

    /// Duration of the clip in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.sample_count() as u64 * 1000) / self.sample_rate as u64
    }

    /// Decode the PCM bytes into i16 samples
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        // one second of silence at 24kHz
        let audio = SpeechAudio::new(vec![0u8; 48_000], 24_000, "audio/L16;rate=24000");
        assert_eq!(audio.sample_count(), 24_000);
        assert_eq!(audio.duration_ms(), 1000);
    }

    #[test]
    fn test_samples_little_endian() {
        let audio = SpeechAudio::new(vec![0x01, 0x00, 0xff, 0xff], 24_000, "audio/L16");
        let samples: Vec<i16> = audio.samples().collect();
        assert_eq!(samples, vec![1, -1]);
    }

    #[test]
    fn test_zero_rate() {
        let audio = SpeechAudio::new(vec![0u8; 10], 0, "audio/L16");
        assert_eq!(audio.duration_ms(), 0);
    }
}
