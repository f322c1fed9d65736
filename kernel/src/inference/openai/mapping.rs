//! OpenAI API type mapping.
//!
//! Request bodies for streaming chat completions and the chunk payloads
//! carried by the `data:` lines of the response.

use serde::{Deserialize, Serialize};

use crate::inference::EditRequest;

/// Instructions sent ahead of every edit.
pub const SYSTEM_PROMPT: &str = "You are a code assistant. The user will provide code and an \
instruction. Return the modified code directly, without any explanations or markdown \
formatting. Just output the raw modified code.";

/// Payload marking the end of a stream.
pub const DONE_MARKER: &str = "[DONE]";

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system" or "user".
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Streaming chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct StreamingChatRequest {
    /// The model identifier
    pub model: String,
    /// The conversation messages
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Always true
    pub stream: bool,
}

/// Builds the request body for an edit.
#[must_use]
pub fn build_request(model: &str, temperature: f32, request: &EditRequest) -> StreamingChatRequest {
    StreamingChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Instruction: {}\n\nCode to modify:\n{}",
                    request.instruction, request.text_to_edit
                ),
            },
        ],
        temperature,
        stream: true,
    }
}

/// Content delta of a streamed choice.
#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    /// Text appended by this chunk, absent on role-only and final deltas
    #[serde(default)]
    pub content: Option<String>,
}

/// A streamed choice.
#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    /// The delta for this choice
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Error object some servers send in-band.
#[derive(Debug, Deserialize)]
pub struct ChunkError {
    /// Human-readable message
    pub message: String,
}

/// One `data:` payload of a streaming response.
#[derive(Debug, Deserialize)]
pub struct CompletionChunk {
    /// Streamed choices; only the first is used
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// In-band error
    #[serde(default)]
    pub error: Option<ChunkError>,
}

impl CompletionChunk {
    /// Text carried by the first choice, if non-empty.
    #[must_use]
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_prompt_and_instruction() -> anyhow::Result<()> {
        let request = build_request("gpt-test", 0.7, &EditRequest::new("a\nb", "shout"));
        let json = serde_json::to_value(&request)?;
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(
            json["messages"][1]["content"],
            "Instruction: shout\n\nCode to modify:\na\nb"
        );
        Ok(())
    }

    #[test]
    fn chunk_content_extraction() -> anyhow::Result<()> {
        let chunk: CompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"hi"}}]}"#)?;
        assert_eq!(chunk.into_content().as_deref(), Some("hi"));

        let role_only: CompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#)?;
        assert_eq!(role_only.into_content(), None);

        let empty: CompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":""},"finish_reason":"stop"}]}"#)?;
        assert_eq!(empty.into_content(), None);
        Ok(())
    }

    #[test]
    fn in_band_error_parses() -> anyhow::Result<()> {
        let chunk: CompletionChunk = serde_json::from_str(r#"{"error":{"message":"overloaded"}}"#)?;
        assert_eq!(chunk.error.map(|e| e.message).as_deref(), Some("overloaded"));
        Ok(())
    }
}
