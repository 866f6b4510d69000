//! Gemini text-to-speech backend
//!
//! Calls `{endpoint}/models/{model}:generateContent` with the AUDIO response
//! modality. Audio comes back as base64 PCM L16 (mono, 24 kHz) in
//! `candidates[0].content.parts[*].inlineData`.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use sonocare_config::constants::audio;
use sonocare_config::TtsConfig;
use sonocare_core::SpeechAudio;

use super::{write_wav, SpeechSynthesizer};
use crate::PipelineError;

/// Gemini TTS client
pub struct GeminiTts {
    client: Client,
    endpoint: String,
    model: String,
    voice: String,
    api_key: Option<String>,
    debug_audio_path: Option<PathBuf>,
}

impl GeminiTts {
    pub fn new(config: &TtsConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PipelineError::Tts(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            api_key: config.api_key().map(str::to_string),
            debug_audio_path: config.debug_audio_path.as_ref().map(PathBuf::from),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        json!({
            "contents": [{"parts": [{"text": text}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {"voiceName": self.voice}
                    }
                }
            }
        })
    }

    async fn try_synthesize(&self, text: &str) -> Result<SpeechAudio, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::Tts("Nothing to synthesize".to_string()));
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PipelineError::Tts("API key not configured".to_string()))?;

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| PipelineError::Tts(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Tts(format!("HTTP {}: {}", status, body)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Tts(format!("Malformed response: {}", e)))?;

        extract_audio(body)
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiTts {
    async fn synthesize(&self, text: &str) -> Option<SpeechAudio> {
        let start = Instant::now();

        match self.try_synthesize(text).await {
            Ok(audio) => {
                tracing::debug!(
                    bytes = audio.data.len(),
                    duration_ms = audio.duration_ms(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Speech synthesized"
                );

                if let Some(ref path) = self.debug_audio_path {
                    if let Err(e) = write_wav(path, &audio) {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to write debug audio");
                    }
                }

                Some(audio)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Text-to-speech failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

fn extract_audio(response: GenerateContentResponse) -> Result<SpeechAudio, PipelineError> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
        .ok_or_else(|| PipelineError::Tts("No audio in response".to_string()))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| PipelineError::Audio(format!("Invalid base64 audio: {}", e)))?;

    if data.is_empty() {
        return Err(PipelineError::Audio("Empty audio payload".to_string()));
    }

    let mime_type = if inline.mime_type.is_empty() {
        audio::TTS_MIME_TYPE.to_string()
    } else {
        inline.mime_type
    };
    let sample_rate = sample_rate_from_mime(&mime_type).unwrap_or(audio::TTS_SAMPLE_RATE);

    Ok(SpeechAudio::new(data, sample_rate, mime_type))
}

/// Read `rate=NNNN` from a MIME type such as `audio/L16;codec=pcm;rate=24000`
fn sample_rate_from_mime(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TtsConfig {
        TtsConfig {
            api_key: None,
            ..TtsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_none() {
        let tts = GeminiTts::new(&config()).unwrap();
        assert!(tts.synthesize("Hello").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_text_returns_none() {
        let tts = GeminiTts::new(&TtsConfig {
            api_key: Some("key".to_string()),
            ..config()
        })
        .unwrap();
        assert!(tts.synthesize("   ").await.is_none());
    }

    #[test]
    fn test_url_and_body() {
        let tts = GeminiTts::new(&config()).unwrap();
        assert_eq!(
            tts.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-tts:generateContent"
        );

        let body = tts.request_body("Fast for 6-8 hours");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Fast for 6-8 hours");
        assert_eq!(body["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn test_extract_audio() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "audio/L16;codec=pcm;rate=16000",
                            "data": base64::engine::general_purpose::STANDARD.encode([1u8, 0, 2, 0])
                        }
                    }]
                }
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let audio = extract_audio(response).unwrap();

        assert_eq!(audio.data, vec![1, 0, 2, 0]);
        assert_eq!(audio.sample_rate, 16000);
        assert_eq!(audio.samples().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_extract_audio_defaults_rate() {
        let raw = json!({
            "candidates": [{"content": {"parts": [
                {"text": "ignored"},
                {"inlineData": {"data": base64::engine::general_purpose::STANDARD.encode([0u8; 4])}}
            ]}}]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let audio = extract_audio(response).unwrap();
        assert_eq!(audio.sample_rate, 24000);
        assert_eq!(audio.mime_type, audio::TTS_MIME_TYPE);
    }

    #[test]
    fn test_extract_audio_failures() {
        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(extract_audio(empty).is_err());

        let bad_base64: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "!!not base64!!"}}]}}]
        }))
        .unwrap();
        assert!(matches!(extract_audio(bad_base64), Err(PipelineError::Audio(_))));
    }

    #[test]
    fn test_sample_rate_from_mime() {
        assert_eq!(sample_rate_from_mime("audio/L16;codec=pcm;rate=24000"), Some(24000));
        assert_eq!(sample_rate_from_mime("audio/L16; rate=8000"), Some(8000));
        assert_eq!(sample_rate_from_mime("audio/L16"), None);
    }
}
