//! Vera: a voice/text assistant host.
//!
//! This crate wires the [`vera_web`] answering pipeline to a configuration
//! file and an OpenAI-compatible chat-completion endpoint. Speech I/O and
//! the local command router live elsewhere; here a query arrives as text
//! and the answer leaves as text with its source list.

pub mod config;
pub mod error;
pub mod llm;
pub mod repl;

pub use config::{LlmConfig, VeraConfig};
pub use error::{Result, VeraError};
pub use llm::OpenAiChat;
