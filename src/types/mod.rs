//! Type definitions module
//!
//! Core conversation and reply types shared by the API client and the
//! interactive session.

pub mod messages;

// Re-export commonly used types
pub use messages::{ApiReply, ChatEntry, ChatRole, ChatTurn, EntryStatus};
