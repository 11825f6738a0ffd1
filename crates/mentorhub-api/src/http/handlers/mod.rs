//! REST API endpoint handlers.

pub mod chat;
pub mod flow;
pub mod render;
