//! Translation backends for genre and tag labels.
//!
//! Two backends are available: the external `translate` command line tool
//! (`translate ru en <text>`, answering with lines such as `en: fantasy`),
//! and an OpenAI-compatible chat completions API. Both only ever see cache
//! misses; see [`crate::translations::TranslationCache`].

use crate::config::{ApiConfig, TranslationBackend, TranslationConfig};
use crate::error::TranslationError;
use crate::utils::check_response_status;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Something that can translate a short label.
///
/// An empty string means the backend had no answer; that is not an error.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

/// Builds the backend selected in the configuration.
pub fn provider_from_config(config: &TranslationConfig) -> Box<dyn TranslationProvider> {
    match config.provider {
        TranslationBackend::Command => Box::new(CommandTranslator::new(
            config.command.clone(),
            config.from_lang.clone(),
            config.to_lang.clone(),
        )),
        TranslationBackend::Api => Box::new(ChatTranslator::new(
            config.api.clone(),
            config.from_lang.clone(),
            config.to_lang.clone(),
        )),
    }
}

/// Runs an external translation tool once per label.
pub struct CommandTranslator {
    command: String,
    from_lang: String,
    to_lang: String,
}

impl CommandTranslator {
    /// Create a new CommandTranslator.
    pub fn new(command: String, from_lang: String, to_lang: String) -> Self {
        Self {
            command,
            from_lang,
            to_lang,
        }
    }

    /// Picks the translation out of the tool's output.
    ///
    /// The tool prints one `<lang>: <text>` line per language; the first
    /// line for the target language wins.
    fn parse_output(&self, output: &str) -> String {
        let prefix = format!("{}: ", self.to_lang);
        output
            .lines()
            .find_map(|line| line.strip_prefix(&prefix))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    fn failed(&self, message: impl Into<String>) -> TranslationError {
        TranslationError::CommandFailed {
            command: self.command.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl TranslationProvider for CommandTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let program = which::which(&self.command).map_err(|e| self.failed(e.to_string()))?;

        let output = Command::new(program)
            .arg(&self.from_lang)
            .arg(&self.to_lang)
            .arg(text)
            .output()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failed(format!("{}: {}", output.status, stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        tracing::debug!(label = text, output = %stdout, "translation command finished");
        Ok(self.parse_output(&stdout))
    }
}

/// A message in a chat request.
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Request body for the chat completions API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

/// Response from the chat completions API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

/// A single choice in the response.
#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Message content in a response.
#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Translates labels with an OpenAI-compatible chat completions API.
pub struct ChatTranslator {
    client: Client,
    api_config: ApiConfig,
    prompt: String,
}

impl ChatTranslator {
    /// Create a new ChatTranslator.
    pub fn new(api_config: ApiConfig, from_lang: String, to_lang: String) -> Self {
        let prompt = format!(
            "Translate the following book genre or tag from language '{}' to language '{}'. \
             Reply with the translated label only, in lowercase, without quotes or explanations.",
            from_lang, to_lang
        );
        Self {
            client: Client::new(),
            api_config,
            prompt,
        }
    }
}

/// Normalises a model answer into a bare label.
fn clean_label(answer: &str) -> String {
    answer
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.')
        .trim()
        .to_string()
}

#[async_trait]
impl TranslationProvider for ChatTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let request = ChatRequest {
            model: self.api_config.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: self.prompt.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.api_config.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_config.key))
            .json(&request)
            .send()
            .await?;
        let response = check_response_status(response)
            .await
            .map_err(TranslationError::ApiError)?;

        let body: ChatResponse = response.json().await?;
        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|choice| clean_label(&choice.message.content))
            .unwrap_or_default();

        Ok(answer)
    }
}
