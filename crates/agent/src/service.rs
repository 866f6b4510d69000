//! Chat service
//!
//! Outermost per-turn wrapper. Every failure of the agent run becomes the
//! user-facing text `An error occurred: {e}`; successful output passes through
//! the safety filter. Audio is attached when requested and available.

use std::sync::Arc;
use std::time::Instant;

use sonocare_config::Settings;
use sonocare_core::{ChatHistory, SpeechAudio};
use sonocare_llm::LlmBackend;
use sonocare_pipeline::SpeechSynthesizer;
use sonocare_tools::ToolRegistry;

use crate::definition::{information_guide_agent, ultrasound_agent, ROUTER_AGENT_NAME};
use crate::runner::Runner;
use crate::safety::SafetyFilter;

/// Response to one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub audio: Option<SpeechAudio>,
}

/// Chat service
pub struct ChatService {
    runner: Runner,
    safety: SafetyFilter,
    tts: Option<Arc<dyn SpeechSynthesizer>>,
}

impl ChatService {
    pub fn new(runner: Runner, safety: SafetyFilter) -> Self {
        Self {
            runner,
            safety,
            tts: None,
        }
    }

    /// Build the standard router + information agent setup
    pub fn from_settings(
        settings: &Settings,
        llm: Arc<dyn LlmBackend>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let runner = Runner::new(llm, tools)
            .with_agent(ultrasound_agent())
            .with_agent(information_guide_agent())
            .with_max_turns(settings.agent.max_turns)
            .with_max_history(settings.agent.max_history_messages);

        Self::new(runner, SafetyFilter::new(&settings.agent.safety))
    }

    pub fn with_tts(mut self, tts: Arc<dyn SpeechSynthesizer>) -> Self {
        self.tts = Some(tts);
        self
    }

    /// Answer one message; never fails
    pub async fn respond(&self, input: &str, history: &ChatHistory) -> String {
        match self.runner.run(ROUTER_AGENT_NAME, input, history).await {
            Ok(result) => {
                tracing::debug!(
                    agent = %result.last_agent,
                    turns = result.turns,
                    "Agent run completed"
                );
                self.safety.check(result.final_output)
            }
            Err(e) => {
                tracing::error!(error = %e, "Agent run failed");
                metrics::counter!("sonocare_agent_errors_total").increment(1);
                format!("An error occurred: {}", e)
            }
        }
    }

    /// Answer one message and, if asked, synthesize the answer
    pub async fn respond_with_audio(
        &self,
        input: &str,
        history: &ChatHistory,
        voice: bool,
    ) -> ChatReply {
        let text = self.respond(input, history).await;

        let audio = match (&self.tts, voice) {
            (Some(tts), true) => {
                let start = Instant::now();
                let audio = tts.synthesize(&text).await;
                metrics::histogram!("sonocare_tts_latency_seconds")
                    .record(start.elapsed().as_secs_f64());
                audio
            }
            _ => None,
        };

        ChatReply { text, audio }
    }
}
