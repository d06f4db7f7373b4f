//! Picture-to-dialogue language practice
//!
//! Turns a photo and a learner profile into a short two-speaker dialogue in the
//! target language via Gemini, and reads the lines aloud through a pluggable
//! speech engine.

pub mod ai;
pub mod dialogue;
pub mod error;
pub mod intake;
pub mod languages;
pub mod models;
pub mod prompts;
pub mod session;
pub mod speech;

pub use error::{Error, Result};
