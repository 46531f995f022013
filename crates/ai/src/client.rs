// Chat completions client (Mistral and OpenAI share the wire format)

use serde::{Deserialize, Serialize};

use quillgrid_config::{AIConfigStatus, ResolvedAIConfig};

use crate::prompt::{ChatMessage, PromptRequest};
use crate::selection::SelectionError;

/// Returned when the provider answers without any content
pub const EMPTY_RESPONSE: &str = "No response received";

#[derive(Debug)]
pub enum AiError {
    /// Selection rejected before sending
    Selection(SelectionError),
    /// AI provider is set to none
    NotConfigured,
    /// Provider chosen but no key in keychain or environment
    MissingKey(String),
    /// HTTP 401
    InvalidKey(String),
    /// HTTP 422
    InvalidRequest,
    /// HTTP 429
    RateLimited,
    Api { status: u16, message: String },
    Network(String),
    Parse(String),
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::Selection(e) => write!(f, "{}", e),
            AiError::NotConfigured => write!(f, "AI not configured. Set ai.provider in settings."),
            AiError::MissingKey(reason) => write!(f, "{}", reason),
            AiError::InvalidKey(provider) => {
                write!(f, "Invalid API key. Please check your {} API key.", provider)
            }
            AiError::InvalidRequest => write!(f, "Invalid request format. Please try with shorter text."),
            AiError::RateLimited => write!(f, "Rate limit exceeded. Please try again later."),
            AiError::Api { status, message } if message.is_empty() => {
                write!(f, "API request failed: {}", status)
            }
            AiError::Api { status, message } => write!(f, "API request failed: {} {}", status, message),
            AiError::Network(e) => write!(f, "Network error: {}", e),
            AiError::Parse(e) => write!(f, "Failed to parse response: {}", e),
        }
    }
}

impl std::error::Error for AiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AiError::Selection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SelectionError> for AiError {
    fn from(e: SelectionError) -> Self {
        AiError::Selection(e)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error bodies: OpenAI nests the message, Mistral puts it at the top level
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct ChatClient {
    http: reqwest::blocking::Client,
    provider: &'static str,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl ChatClient {
    /// Build a client for a resolved configuration; fails unless it is ready.
    pub fn new(config: &ResolvedAIConfig) -> Result<Self, AiError> {
        let api_key = match (config.status, &config.api_key) {
            (AIConfigStatus::Disabled, _) => return Err(AiError::NotConfigured),
            (AIConfigStatus::Ready, Some(key)) => key.clone(),
            _ => {
                return Err(AiError::MissingKey(
                    config
                        .blocking_reason
                        .clone()
                        .unwrap_or_else(|| "No API key found".to_string()),
                ))
            }
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            provider: config.provider_name(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    /// Send requests to `endpoint` instead of the configured URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one completion and return the first choice's text
    pub fn complete(&self, request: &PromptRequest) -> Result<String, AiError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        log::debug!(
            "POST {} model={} max_tokens={}",
            self.endpoint,
            self.model,
            request.max_tokens
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            log::warn!("{} API error {}: {}", self.provider, status.as_u16(), error_text);
            return Err(self.status_error(status.as_u16(), &error_text));
        }

        let body: CompletionResponse = response
            .json()
            .map_err(|e| AiError::Parse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_RESPONSE.to_string());

        Ok(content)
    }

    fn status_error(&self, status: u16, error_text: &str) -> AiError {
        match status {
            401 => AiError::InvalidKey(self.provider.to_string()),
            422 => AiError::InvalidRequest,
            429 => AiError::RateLimited,
            _ => {
                let message = match serde_json::from_str::<ErrorBody>(error_text) {
                    Ok(ErrorBody { error: Some(detail), .. }) => detail.message,
                    Ok(ErrorBody { message: Some(message), .. }) => message,
                    _ => error_text.trim().to_string(),
                };
                AiError::Api { status, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillgrid_config::{AIProvider, AISettings, KeyLookup, KeySource};

    fn ready() -> ResolvedAIConfig {
        let settings = AISettings {
            provider: AIProvider::Mistral,
            ..AISettings::default()
        };
        let lookup = KeyLookup {
            key: Some("secret".to_string()),
            source: KeySource::Environment,
        };
        ResolvedAIConfig::with_key(&settings, lookup)
    }

    #[test]
    fn test_new_requires_ready_config() {
        let disabled = ResolvedAIConfig::with_key(&AISettings::default(), KeyLookup::missing());
        assert!(matches!(ChatClient::new(&disabled), Err(AiError::NotConfigured)));

        let settings = AISettings {
            provider: AIProvider::OpenAI,
            ..AISettings::default()
        };
        let missing = ResolvedAIConfig::with_key(&settings, KeyLookup::missing());
        match ChatClient::new(&missing) {
            Err(AiError::MissingKey(reason)) => assert!(reason.contains("QUILLGRID_OPENAI_KEY")),
            _ => panic!("expected MissingKey"),
        }
    }

    #[test]
    fn test_status_errors() {
        let client = ChatClient::new(&ready()).unwrap();
        assert_eq!(
            client.status_error(401, "").to_string(),
            "Invalid API key. Please check your mistral API key."
        );
        assert!(matches!(client.status_error(422, ""), AiError::InvalidRequest));
        assert!(matches!(client.status_error(429, ""), AiError::RateLimited));

        let openai_style = client.status_error(500, r#"{"error":{"message":"boom"}}"#);
        assert_eq!(openai_style.to_string(), "API request failed: 500 boom");
        let mistral_style = client.status_error(400, r#"{"message":"bad model"}"#);
        assert_eq!(mistral_style.to_string(), "API request failed: 400 bad model");
        assert_eq!(client.status_error(503, "").to_string(), "API request failed: 503");
    }

    #[test]
    fn test_completion_request_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let body = CompletionRequest {
            model: "m",
            messages: &messages,
            max_tokens: 300,
            temperature: 0.5,
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["stream"], false);
    }
}
