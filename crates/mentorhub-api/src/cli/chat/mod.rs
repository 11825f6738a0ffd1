//! Interactive CLI chat for Mentor Hub.
//!
//! Implements the chat loop: welcome banner, greeting, a thinking spinner
//! while the model call is in flight, terminal rendering of replies, and
//! slash commands. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
