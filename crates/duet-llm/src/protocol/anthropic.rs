//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};

use crate::types::{CompletionRequest, CompletionResponse, FinishReason, Role, Usage};

/// Used when the request carries no explicit limit; Anthropic requires one
const DEFAULT_MAX_TOKENS: u32 = 4096;

// -- Request types --

/// Anthropic messages API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicRequest {
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate (required by Anthropic)
    pub max_tokens: u32,
    /// System prompt (top-level, not in messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation messages
    pub messages: Vec<AnthropicMessage>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Anthropic message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Role ("user" or "assistant")
    pub role: String,
    /// Plain text content
    pub content: String,
}

impl From<&CompletionRequest> for AnthropicRequest {
    fn from(request: &CompletionRequest) -> Self {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        Self {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: (!system.is_empty()).then(|| system.join("\n\n")),
            messages: request
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .map(|m| AnthropicMessage {
                    role: m.role.as_str().to_owned(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
        }
    }
}

// -- Response types --

/// Anthropic messages API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponse {
    /// Response identifier
    pub id: String,
    /// Model that served the request
    pub model: String,
    /// Content blocks
    pub content: Vec<AnthropicContentBlock>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

/// Content block in an Anthropic response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
    /// Any block type without a text payload
    #[serde(other)]
    Other,
}

/// Anthropic usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicUsage {
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
}

impl From<AnthropicResponse> for CompletionResponse {
    fn from(response: AnthropicResponse) -> Self {
        let text: String = response
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect();

        Self {
            id: response.id,
            model: response.model,
            content: (!text.is_empty()).then_some(text),
            finish_reason: response.stop_reason.map(|reason| match reason.as_str() {
                "end_turn" | "stop_sequence" => FinishReason::Stop,
                "max_tokens" => FinishReason::Length,
                _ => FinishReason::Other(reason),
            }),
            usage: response.usage.map_or_else(Usage::default, |u| Usage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::Message;

    use super::*;

    #[test]
    fn system_messages_move_to_top_level() {
        let request = CompletionRequest {
            model: "claude-sonnet-4-5".to_owned(),
            messages: vec![Message::system("rules"), Message::user("article")],
            temperature: None,
            max_tokens: None,
            json_output: true,
        };

        let wire = AnthropicRequest::from(&request);

        assert_eq!(wire.system.as_deref(), Some("rules"));
        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].role, "user");
        assert_eq!(wire.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn text_blocks_are_joined() {
        let wire: AnthropicResponse = serde_json::from_str(
            r#"{
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "model": "claude-sonnet-4-5",
                "content": [{"type": "text", "text": "{\"lines\":"}, {"type": "thinking", "thinking": "..."}, {"type": "text", "text": "[]}"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 5, "output_tokens": 7}
            }"#,
        )
        .unwrap();

        let response = CompletionResponse::from(wire);

        assert_eq!(response.content.as_deref(), Some("{\"lines\":[]}"));
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.prompt_tokens, 5);
    }
}
