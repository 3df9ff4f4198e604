//! OpenAI chat-completion backend.

use crate::error::GrittyError;
use crate::http_client::HttpClient;
use crate::provider::{
    MessageProvider, ProviderContext, ProviderDefinition, ProviderSettings, SecretPrompt,
    bound_candidates,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NAME: &str = "openai";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 150;
const API_KEY_ENV: &str = "OPENAI_API_KEY";
const SUMMARY_LIMIT: usize = 200;

const SYSTEM_PROMPT: &str =
    "You are an assistant that helps in writing concise and clear Git commit messages.";
const USER_PROMPT: &str =
    "Based on the following git diff, suggest a concise and clear git commit message:";

/// Registry entry for this backend.
pub fn definition() -> ProviderDefinition {
    ProviderDefinition {
        name: NAME,
        factory: build,
        config_prompt: configure,
    }
}

/// Stored settings: `config: {apiKey: ...}`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(rename = "apiKey", default)]
    pub api_key: String,
}

impl ProviderSettings for OpenAiSettings {}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("OpenAiSettings").field("api_key", &shown).finish()
    }
}

/// Asks for the API key with echo suppressed.
pub fn configure(prompt: &dyn SecretPrompt) -> Result<serde_yaml::Value, GrittyError> {
    let api_key = prompt.read_secret("Enter your OpenAI API Key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(GrittyError::EmptyInput("API Key"));
    }
    OpenAiSettings {
        api_key: api_key.to_string(),
    }
    .encode()
}

fn build(
    settings: &serde_yaml::Value,
    ctx: &ProviderContext,
) -> Result<Box<dyn MessageProvider>, GrittyError> {
    let mut settings = if settings.is_null() {
        OpenAiSettings::default()
    } else {
        OpenAiSettings::decode(settings)?
    };

    if settings.api_key.trim().is_empty() {
        match ctx.env(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                info!("Using OpenAI API key from {}", API_KEY_ENV);
                settings.api_key = key.trim().to_string();
            }
            None => {
                return Err(GrittyError::ConfigInvalid(
                    "openai apiKey is missing in the config file".to_string(),
                ));
            }
        }
    }

    Ok(Box::new(OpenAiProvider::new(settings, Arc::clone(&ctx.http))))
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    n: usize,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: Option<String>,
}

/// Reduces a failed response body to one line: the API's `error.message`
/// when present, otherwise the raw body with whitespace collapsed.
fn summarize_error(body: &str) -> String {
    let text = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.to_string());
    let line = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if line.is_empty() {
        return "empty response body".to_string();
    }
    if line.chars().count() > SUMMARY_LIMIT {
        let cut: String = line.chars().take(SUMMARY_LIMIT).collect();
        return format!("{}...", cut);
    }
    line
}

pub struct OpenAiProvider {
    settings: OpenAiSettings,
    http: Arc<dyn HttpClient>,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(settings: OpenAiSettings, http: Arc<dyn HttpClient>) -> Self {
        Self {
            settings,
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Points the provider at a different chat-completion URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn build_request(diff: &str, count: usize) -> Result<serde_json::Value, GrittyError> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("{}\n\n{}", USER_PROMPT, diff),
                },
            ],
            max_tokens: MAX_TOKENS,
            n: count,
        };
        serde_json::to_value(&request).map_err(|e| GrittyError::RequestEncoding(e.to_string()))
    }

    fn parse_response(body: &str) -> Result<Vec<String>, GrittyError> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
            warn!("Unparseable OpenAI response: {}", e);
            GrittyError::MalformedResponse(e.to_string())
        })?;

        let choices = response.choices.ok_or(GrittyError::EmptyResult)?;
        Ok(choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect())
    }
}

#[async_trait]
impl MessageProvider for OpenAiProvider {
    async fn get_commit_messages(&self, diff: &str, count: usize) -> Result<Vec<String>, GrittyError> {
        let count = count.max(1);
        let body = Self::build_request(diff, count)?;
        let auth = format!("Bearer {}", self.settings.api_key);

        info!("Requesting {} commit message(s) for a {} byte diff", count, diff.len());
        let response = self
            .http
            .post_json(
                &self.endpoint,
                &[("Authorization", auth.as_str()), ("Content-Type", "application/json")],
                &body,
            )
            .await?;

        if matches!(response.status, 401 | 403) {
            return Err(GrittyError::Auth { status: response.status });
        }
        if !response.is_success() {
            warn!("OpenAI request failed with status {}", response.status);
            return Err(GrittyError::Upstream {
                status: response.status,
                summary: summarize_error(&response.body),
            });
        }

        let raw = Self::parse_response(&response.body)?;
        debug!("OpenAI returned {} choice(s)", raw.len());
        bound_candidates(raw, count)
    }
}
