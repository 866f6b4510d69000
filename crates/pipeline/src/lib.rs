//! Speech output pipeline
//!
//! Renders agent responses as audio through an external text-to-speech
//! service. Synthesis is best effort: callers get `None` instead of an error.

pub mod tts;

pub use tts::{write_wav, GeminiTts, SpeechSynthesizer};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("TTS error: {0}")]
    Tts(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
