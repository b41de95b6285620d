//! SketchBuddy - Terminal Chat Tutor for Processing
//!
//! A terminal chat client that turns a hosted completion API into a patient
//! Processing and creative-coding tutor. Replies stream into the terminal as
//! they are generated; one-shot questions can fall back to a buffered request
//! with a bounded retry budget.
//!
//! # Architecture
//!
//! - **Core**: error taxonomy + shared chat types
//! - **Streaming**: incremental record decoder + fragment stream
//! - **API**: request construction, streaming and buffered clients
//! - **Interface**: CLI arguments, config file, interactive REPL

// Core protocol layers
pub mod api;
pub mod errors;
pub mod streaming;
pub mod types;

// Re-export commonly used types
pub use errors::{ChatError, Result};

// Interface layer
pub mod cli;
pub mod config;
pub mod repl;

pub use api::ChatClient;
