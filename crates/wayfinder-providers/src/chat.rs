//! Chat-completion proxy.
//!
//! Forwards a single user prompt to an OpenAI-compatible chat-completions
//! endpoint (Groq by default) and shapes the outcome as the `{text}` /
//! `{error}` bodies the map frontend expects.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use crate::ChatError;

pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Incoming proxy request. A missing or `null` prompt counts as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponseBody {
    Text { text: String },
    Error { error: String },
}

/// Status code plus JSON body, ready to hand to whatever HTTP layer hosts the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub status: u16,
    pub body: ChatResponseBody,
}

impl ChatReply {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatProxy {
    http: Client,
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl ChatProxy {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.filter(|key| !key.is_empty()),
            endpoint: DEFAULT_CHAT_ENDPOINT.to_owned(),
            model: DEFAULT_CHAT_MODEL.to_owned(),
        }
    }

    /// Read the API key from `GROQ_API_KEY`. A missing key is reported per
    /// request, not here.
    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Generate a completion for `prompt`. An absent message content yields an
    /// empty string rather than an error.
    #[instrument(name = "Chat completion", skip_all, fields(model = %self.model), level = "info")]
    pub async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        let request = CompletionRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };
        let response: CompletionResponse = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }

    /// Answer a proxied request. Never fails: every error becomes a non-2xx reply.
    pub async fn handle(&self, request: ChatRequest) -> ChatReply {
        match self.complete(request.prompt.as_deref().unwrap_or_default()).await {
            Ok(text) => ChatReply {
                status: 200,
                body: ChatResponseBody::Text { text },
            },
            Err(e) => {
                error!(error = %e, "Error generating content");
                ChatReply {
                    status: e.status(),
                    body: ChatResponseBody::Error {
                        error: e.to_string(),
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_checked_before_prompt() {
        let proxy = ChatProxy::new(None);
        let reply = proxy.handle(ChatRequest::default()).await;

        assert_eq!(reply.status, 500);
        assert_eq!(
            reply.body,
            ChatResponseBody::Error {
                error: "GROQ_API_KEY is not defined in environment variables".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_empty_key_counts_as_missing() {
        let proxy = ChatProxy::new(Some(String::new()));
        let err = proxy.complete("hello").await.unwrap_err();
        assert!(matches!(err, ChatError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_blank_prompt_is_bad_request() {
        let proxy = ChatProxy::new(Some("gsk_test".to_owned()));
        let reply = proxy
            .handle(ChatRequest::new("  "))
            .await;

        assert_eq!(reply.status, 400);
        assert!(!reply.is_success());
        assert_eq!(
            reply.body,
            ChatResponseBody::Error {
                error: "Prompt is required".to_owned()
            }
        );
    }

    #[test]
    fn test_request_body_deserializes_without_prompt() {
        let request: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(request.prompt.is_none());
    }

    #[tokio::test]
    async fn test_null_prompt_is_bad_request() {
        let request: ChatRequest = serde_json::from_str(r#"{"prompt": null}"#).unwrap();
        assert!(request.prompt.is_none());

        let reply = ChatProxy::new(Some("gsk_test".to_owned()))
            .handle(request)
            .await;
        assert_eq!(reply.status, 400);
        assert_eq!(
            reply.body,
            ChatResponseBody::Error {
                error: "Prompt is required".to_owned()
            }
        );
    }

    #[test]
    fn test_reply_body_shapes() {
        let text = serde_json::to_string(&ChatResponseBody::Text {
            text: "hi".to_owned(),
        })
        .unwrap();
        assert_eq!(text, r#"{"text":"hi"}"#);

        let error = serde_json::to_string(&ChatResponseBody::Error {
            error: "nope".to_owned(),
        })
        .unwrap();
        assert_eq!(error, r#"{"error":"nope"}"#);
    }
}
