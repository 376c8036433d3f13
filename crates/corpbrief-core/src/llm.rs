//! Client for the external chat-completion service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmSettings;
use crate::error::CorpbriefError;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat-completion service contract: system instructions plus one user
/// message in, the assistant's text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CorpbriefError>;
}

/// Production completion client speaking the OpenAI chat-completions wire
/// format.
pub struct OpenAiCompletions {
    settings: LlmSettings,
    http: reqwest::Client,
}

impl OpenAiCompletions {
    pub fn new(settings: LlmSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiCompletions {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CorpbriefError> {
        debug!(model = %self.settings.model, "requesting completion");

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.settings.temperature,
        };

        let response = self
            .http
            .post(OPENAI_API_URL)
            .bearer_auth(self.settings.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|err| CorpbriefError::Completion(err.to_string()))?
            .error_for_status()
            .map_err(|err| CorpbriefError::Completion(err.to_string()))?;

        let parsed = response
            .json::<ChatResponse>()
            .await
            .map_err(|err| CorpbriefError::Completion(err.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CorpbriefError::Completion("completion reply contained no choices".to_string())
            })
    }
}
