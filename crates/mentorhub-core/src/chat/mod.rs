//! Chat assistants, the conversation state machine, and the model-call boundary.

pub mod assistant;
pub mod boundary;
pub mod controller;
pub mod session;
