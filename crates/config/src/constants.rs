//! Centralized constants for the chatbot
//!
//! Single source of truth for endpoints, fixed texts and default values used
//! across the workspace.

/// Service endpoints
pub mod endpoints {
    /// Gemini OpenAI-compatible chat completions base URL
    pub const GEMINI_OPENAI_COMPAT: &str =
        "https://generativelanguage.googleapis.com/v1beta/openai";

    /// Gemini native REST base URL (used for generateContent / TTS)
    pub const GEMINI_NATIVE: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// DuckDuckGo Instant Answer API
    pub const DUCKDUCKGO_API: &str = "https://api.duckduckgo.com";
}

/// Model identifiers
pub mod models {
    /// Chat model driving both agents
    pub const CHAT_DEFAULT: &str = "gemini-2.0-flash";

    /// Text-to-speech model
    pub const TTS_DEFAULT: &str = "gemini-2.5-flash-preview-tts";

    /// Prebuilt TTS voice
    pub const TTS_VOICE_DEFAULT: &str = "Kore";
}

/// Environment variables read directly
pub mod env {
    /// Provider API key shared by the model, TTS and search configuration
    pub const API_KEY: &str = "GEMINI_API_KEY";

    /// Selects `config/{env}` overrides
    pub const ENVIRONMENT: &str = "SONOCARE_ENV";

    /// Prefix for setting overrides, e.g. `SONOCARE__SERVER__PORT`
    pub const PREFIX: &str = "SONOCARE";
}

/// Timeouts (in seconds)
pub mod timeouts {
    /// Chat model request timeout
    pub const LLM_REQUEST_SECS: u64 = 60;

    /// Web search request timeout
    pub const SEARCH_SECS: u64 = 10;

    /// TTS synthesis timeout
    pub const TTS_SECS: u64 = 30;

    /// Tool execution timeout
    pub const TOOL_DEFAULT_SECS: u64 = 30;
}

/// Audio defaults for synthesized speech
pub mod audio {
    /// Sample rate of Gemini TTS PCM output (Hz)
    pub const TTS_SAMPLE_RATE: u32 = 24_000;

    /// MIME type of Gemini TTS output
    pub const TTS_MIME_TYPE: &str = "audio/L16;codec=pcm;rate=24000";
}

/// Fixed user-facing texts
pub mod texts {
    /// Booking form for appointments
    pub const BOOKING_FORM_LINK: &str = "https://docs.google.com/forms/d/e/1FAIpQLSeF0RvnrhnpxBlMWOg0hIJlAatg1BE9-0CRi5v7HYcLyaq8pA/viewform?usp=dialog";

    /// Replacement for responses caught by the safety filter
    pub const SAFETY_APOLOGY: &str = "I am sorry, there seems to be an issue with my response. Please try asking again in a different way.";

    /// Phrases that trigger the safety filter (matched case-insensitively)
    pub const UNDESIRED_PHRASES: [&str; 4] =
        ["error", "i am sorry", "i cannot provide", "invalid date"];
}

/// Agent runtime limits
pub mod agent {
    /// Maximum model calls per chat request
    pub const MAX_TURNS: u32 = 10;

    /// Maximum prior history messages replayed to the model
    pub const MAX_HISTORY_MESSAGES: usize = 20;
}
