//! Shared domain types for Mentor Hub.
//!
//! This crate contains the core domain types used across the Mentor Hub
//! back-end: chat transcripts, LLM requests, rendered content nodes, flow
//! inputs/outputs, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, schemars.

pub mod chat;
pub mod config;
pub mod error;
pub mod flow;
pub mod llm;
pub mod render;
