use crate::chat::{Message, Prompt, SessionId};
use anyhow::Result;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

pub const DEFAULT_WEBHOOK_URL: &str =
    "https://myamigo.app.n8n.cloud/webhook/a04b6c7c-bb85-4f77-ac9f-06c3fa7743fa/chat";
pub const DEFAULT_ACTION: &str = "sendMessage";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook answered with status {0}")]
    Status(StatusCode),
    #[error("webhook reported an error: {0}")]
    Service(String),
    #[error("response carried neither text nor output")]
    Unexpected,
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response body was null")]
    NullBody,
}

impl WebhookError {
    /// The bot message text a visitor sees for this failure.
    pub fn user_text(&self) -> String {
        match self {
            WebhookError::Status(status) => format!(
                "Error: Could not connect to the chat service (status: {}). Please try again later.",
                status.as_u16()
            ),
            WebhookError::Service(message) => format!("Chat service error: {}", message),
            WebhookError::Unexpected => {
                "Sorry, I received an unexpected response from the chat service.".to_string()
            }
            WebhookError::Http(_) | WebhookError::Decode(_) | WebhookError::NullBody => {
                "Error: Failed to communicate with the chat service. Please check your connection and try again."
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    chat_input: &'a str,
    session_id: &'a str,
}

pub struct WebhookClient {
    http: reqwest::Client,
    endpoint: String,
    action: String,
}

impl WebhookClient {
    pub fn new(
        endpoint: impl Into<String>,
        action: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: endpoint.into(),
            action: action.into(),
        })
    }

    /// Sends one visitor message and always resolves to a bot message,
    /// either the assistant's reply or a description of what went wrong.
    pub async fn send_message(&self, prompt: &Prompt, session_id: &SessionId) -> Message {
        match self.exchange(prompt, session_id).await {
            Ok(reply) => Message::bot(reply),
            Err(e) => {
                match &e {
                    WebhookError::Unexpected => {
                        warn!("Webhook response did not contain text or output fields")
                    }
                    _ => error!("Webhook exchange failed: {}", e),
                }
                Message::bot(e.user_text())
            }
        }
    }

    /// One POST, no retries.
    pub async fn exchange(
        &self,
        prompt: &Prompt,
        session_id: &SessionId,
    ) -> Result<String, WebhookError> {
        let body = WebhookRequest {
            chat_input: prompt.as_str(),
            session_id: session_id.as_str(),
        };

        debug!("-> Sending to webhook (session {}): {}", session_id, prompt);

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("action", self.action.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Webhook response not OK: {} {}", status, detail);
            return Err(WebhookError::Status(status));
        }

        let raw = response.text().await?;
        debug!("<- Received from webhook: {}", raw);
        interpret(&raw)
    }
}

/// Resolves a successful response body to the reply text.
///
/// `error` wins over `text`, which wins over `output`. Empty strings,
/// `null`, `false` and `0` count as absent. An array body is read through
/// its first element.
pub fn interpret(raw: &str) -> Result<String, WebhookError> {
    let reply = match serde_json::from_str::<Value>(raw)? {
        Value::Null => return Err(WebhookError::NullBody),
        Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };

    if let Some(message) = field(&reply, "error") {
        return Err(WebhookError::Service(message));
    }

    field(&reply, "text")
        .or_else(|| field(&reply, "output"))
        .ok_or(WebhookError::Unexpected)
}

fn field(reply: &Value, name: &str) -> Option<String> {
    match reply.get(name)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
