//! Text-to-speech
//!
//! - `gemini`: Gemini `generateContent` with audio response modality
//! - `wav`: WAV export of synthesized PCM

mod gemini;
mod wav;

pub use gemini::GeminiTts;
pub use wav::write_wav;

use async_trait::async_trait;
use sonocare_core::SpeechAudio;

/// Speech synthesizer
///
/// Implementations never fail loudly: any problem is logged and reported as
/// `None`, so a chat answer is never lost because audio could not be made.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Option<SpeechAudio>;
}
