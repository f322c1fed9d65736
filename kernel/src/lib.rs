//! Scrivener Kernel - host runtime for AI-assisted note edits.
//!
//! This crate connects the diff engine and edit sessions to the outside
//! world: a streaming LLM token source, a notes backend, a session manager
//! that pumps tokens into coordinators, and an event channel frontends
//! render from.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]

/// Session events and their broadcaster.
pub mod events;
/// Token sources (OpenAI-compatible streaming, scripted).
pub mod inference;
/// Infrastructure components (config, telemetry).
pub mod infrastructure;
/// Session manager and edit tasks.
pub mod sessions;
/// Document stores (HTTP notes backend, in-memory).
pub mod store;
