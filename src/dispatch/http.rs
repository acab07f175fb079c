//! HTTP implementation of the dispatcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::WidgetConfig;
use crate::conversation::{ConversationId, Message};

use super::error::DispatchError;
use super::{AssistantReply, MessageDispatcher};

/// Request body for the chat endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    /// The user's message.
    message: &'a str,
    /// Conversation the message belongs to.
    conversation_id: ConversationId,
    /// Full history including the just-appended user message.
    history: &'a [Message],
}

/// Response body of the chat endpoint. A 2xx answer carries either a
/// reply or an `error` field.
#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Dispatcher POSTing to the configured endpoint with a client built once.
pub struct HttpDispatcher {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpDispatcher {
    /// Build the HTTP client from the widget configuration.
    ///
    /// # Errors
    /// Returns a [`DispatchError`] if the client cannot be constructed.
    pub fn new(config: &WidgetConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl MessageDispatcher for HttpDispatcher {
    async fn send(
        &self,
        message: &str,
        conversation_id: ConversationId,
        history: &[Message],
    ) -> Result<AssistantReply, DispatchError> {
        let request = ChatRequest {
            message,
            conversation_id,
            history,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Transport {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        let body: ChatResponseBody = serde_json::from_str(&raw)?;
        if let Some(message) = body.error {
            return Err(DispatchError::Remote { message });
        }

        tracing::debug!(conversation = %conversation_id, "assistant reply received");
        Ok(AssistantReply {
            text: body.response.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;

    use crate::conversation::MessageRole;

    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let id = ConversationId::new();
        let history = vec![Message::at(MessageRole::User, "hello", Utc::now())];
        let request = ChatRequest {
            message: "hello",
            conversation_id: id,
            history: &history,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"], "hello");
        assert_eq!(value["conversationId"], id.to_string());
        assert_eq!(value["history"][0]["type"], "user");
        assert!(value["history"][0]["timestamp"].is_string());
    }

    #[test]
    fn test_response_body_with_error_field() {
        let body: ChatResponseBody =
            serde_json::from_str(r#"{"error":"agent unavailable"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("agent unavailable"));
        assert!(body.response.is_none());
    }

    #[test]
    fn test_response_body_with_reply() {
        let body: ChatResponseBody =
            serde_json::from_str(r#"{"response":"Hello back"}"#).unwrap();
        assert_eq!(body.response.as_deref(), Some("Hello back"));
        assert!(body.error.is_none());
    }
}
