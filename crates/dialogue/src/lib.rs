//! # Dialogue Crate
//!
//! The conversational core of the movie agent: one session, one state
//! machine, driven one utterance at a time.
//!
//! ## Main Components
//!
//! - **command**: classify input as search, refine or restart
//! - **policy**: the clarify / narrow / return decision and its threshold
//! - **session**: per-conversation filters, append-only turn log, paging
//! - **questions**: model-phrased follow-up questions with fixed fallbacks
//! - **engine**: `TurnEngine`, which runs a whole turn end to end
//!
//! ## Example Usage
//!
//! ```ignore
//! use dialogue::{Session, TurnEngine};
//!
//! let engine = TurnEngine::new(llm, search);
//! let mut session = Session::new();
//!
//! let reply = engine.process(&mut session, "romantic comedy from 2005").await;
//! println!("{}: {}", reply.action.as_str(), reply.message);
//! ```

pub mod command;
pub mod engine;
pub mod policy;
pub mod questions;
pub mod session;

pub use command::classify;
pub use engine::{DEFAULT_CALL_TIMEOUT, TurnEngine, TurnReply};
pub use policy::{Action, DialogueState, NARROW_THRESHOLD};
pub use questions::QuestionWriter;
pub use session::{DEFAULT_PAGE_SIZE, Session, Turn};
