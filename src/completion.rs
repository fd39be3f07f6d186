use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::ScoutConfig;
use crate::errors::{Result, ScoutError};

const TEMPERATURE: f32 = 0.8;
const MAX_TOKENS: u32 = 6000;

/// A single-turn chat request: one system instruction, one user instruction
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// Generates one JSON-formatted completion per request.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    /// Returns the raw content of the first choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct GroqClient {
    pub url: String,
    pub model: String,
    api_key: Zeroizing<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

impl GroqClient {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("scout-intel/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            url: config.groq_url.clone(),
            model: config.model.clone(),
            api_key: config.groq_api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl CompletionSource for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!(model = %self.model, url = %self.url, "completion request");

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ScoutError::Authentication(
                "Groq rejected the API key".to_string(),
            ));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ScoutError::upstream("Groq", Some(status.as_u16()), text));
        }

        let parsed: ChatResponse = resp.json().await?;
        first_content(parsed)
    }
}

fn first_content(resp: ChatResponse) -> Result<String> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ScoutError::Parse("Empty response from Groq".to_string()))
}
