//! OpenAI-compatible streaming chat completions.
//!
//! This module provides the [`OpenAiTokenSource`] and the Server-Sent Events
//! decoding it relies on.

pub mod client;
pub mod mapping;
pub mod streaming;

pub use client::{OpenAiConfig, OpenAiTokenSource};
pub use mapping::{ChatMessage, CompletionChunk, StreamingChatRequest, build_request};
pub use streaming::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_RETRIES, MAX_DELAY_MS, RetryConfig, SseDecoder,
    rand_jitter_factor,
};
