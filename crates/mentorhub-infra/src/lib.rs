//! Infrastructure layer for Mentor Hub.
//!
//! Contains the concrete [`LlmProvider`](mentorhub_core::llm::provider::LlmProvider)
//! implementations, the `config.toml` loader, and API key resolution from the
//! environment.

pub mod config;
pub mod llm;
pub mod secret;
