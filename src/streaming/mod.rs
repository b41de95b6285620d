//! Streaming response pipeline
//!
//! Decodes event-tagged byte deliveries into ordered text fragments.

pub mod decoder;
pub mod stream;

// Re-export commonly used types
pub use decoder::{RecordOutcome, StreamDecoder, DATA_TAG, DONE_LITERAL};
pub use stream::fragment_stream;
