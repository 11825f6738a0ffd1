//! Business logic for Mentor Hub.
//!
//! This crate holds the conversation controller, the render pipeline, the
//! form flows, and the `LlmProvider` port that the infrastructure layer
//! implements. It depends only on `mentorhub-types` -- never on
//! `mentorhub-infra` or any network crate.

pub mod chat;
pub mod flow;
pub mod llm;
pub mod render;
