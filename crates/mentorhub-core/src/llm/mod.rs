//! LLM provider abstractions for Mentor Hub.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `structured_output`: JSON schema helpers for typed replies

pub mod box_provider;
pub mod provider;
pub mod structured_output;
