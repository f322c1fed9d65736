//! Token stream sources.
//!
//! A [`TokenSource`] turns a piece of text and an instruction into a stream
//! of text chunks whose concatenation is the rewritten text. The stream ends
//! after the last chunk; an `Err` item is terminal.

pub mod error;
pub mod openai;
pub mod scripted;
pub mod source;

pub use error::InferenceError;
pub use openai::{OpenAiConfig, OpenAiTokenSource, RetryConfig};
pub use scripted::ScriptedTokenSource;
pub use source::{EditRequest, TokenSource, TokenStream};
