//! Completion API access
//!
//! Request construction, the HTTP client, and the retry policy.

pub mod client;
pub mod request;
pub mod retry;

// Re-export commonly used types
pub use client::{ChatClient, DEFAULT_API_URL, DEFAULT_MODEL};
pub use request::{ChatRequest, SYSTEM_PROMPT};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
