//! Server crate for the movie agent.
//!
//! This crate contains the `MovieAgent` that wraps the dialogue engine
//! with paging, details and summary enrichment, plus the HTTP transport
//! built on it.

pub mod config;
pub mod orchestrator;
pub mod render;
pub mod web;

pub use config::{AgentArgs, AgentConfig};
pub use dialogue::Session;
pub use orchestrator::{AgentError, AgentReply, HELP_MESSAGE, MovieAgent, ReplyAction};
pub use render::{render_brief, render_full};
pub use web::{SessionLimits, router, router_with_limits};
