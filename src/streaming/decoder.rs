//! Incremental decoder for the event-tagged completion stream
//!
//! Turns raw byte deliveries into ordered text fragments with:
//! - Buffer: one accumulator holding the trailing partial record
//! - Encoding: streaming UTF-8, multi-byte characters may span deliveries
//! - Recovery: malformed records are skipped, never fatal

use log::warn;
use serde_json::Value;

/// Tag prefixing every payload-bearing record
pub const DATA_TAG: &str = "data: ";

/// Reserved payload signalling normal end of emission
pub const DONE_LITERAL: &str = "[DONE]";

/// Outcome of decoding one complete record
///
/// Every call site matches all three cases; a skipped record is an explicit
/// decision, not a silently dropped value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// One decoded text fragment, emitted in wire order
    Fragment(String),

    /// The termination literal; emission ends, no error raised
    Terminator,

    /// Payload failed to parse; logged and skipped
    Malformed(String),
}

/// Streaming record decoder
///
/// Owned by exactly one in-progress stream. Feed it each raw delivery as it
/// arrives, then call [`StreamDecoder::finish`] once the transport reports
/// completion to flush a trailing record that was never followed by a line
/// break.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Decoded text not yet terminated by a line break
    buffer: String,

    /// Raw bytes not yet decoded; between deliveries this holds at most one
    /// incomplete multi-byte sequence
    pending: Vec<u8>,

    /// Latched once the termination literal has been seen
    finished: bool,
}

impl StreamDecoder {
    /// Create a decoder with empty state
    pub fn new() -> Self {
        StreamDecoder {
            buffer: String::new(),
            pending: Vec::new(),
            finished: false,
        }
    }

    /// Consume one raw delivery and return the fragments it completed.
    ///
    /// ```text
    /// feed(chunk):
    /// 1. text ← utf8_decode(carry ++ chunk), keeping a truncated trailing
    ///    sequence as the next carry
    /// 2. buffer ← buffer ++ text
    /// 3. while buffer contains '\n':
    ///      record ← buffer[..newline], buffer ← buffer[newline+1..]
    ///      decode record → fragment | terminator | malformed | blank
    /// ```
    ///
    /// Fragments come back in wire order. After the termination literal has
    /// been seen, further deliveries decode to nothing.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut fragments = Vec::new();
        if self.finished {
            return fragments;
        }

        self.decode_bytes(chunk);

        while let Some(newline) = self.buffer.find('\n') {
            let outcome = decode_record(&self.buffer[..newline]);
            self.buffer.drain(..=newline);
            self.handle_outcome(outcome, &mut fragments);
            if self.finished {
                break;
            }
        }

        if self.finished {
            self.buffer.clear();
            self.pending.clear();
        }

        fragments
    }

    /// Flush the trailing record once the transport has completed.
    ///
    /// The buffer may hold exactly one more record that was never followed
    /// by a line break; it gets the same per-record treatment as any other.
    /// A dangling incomplete UTF-8 sequence at end of stream is dropped.
    pub fn finish(&mut self) -> Vec<String> {
        let mut fragments = Vec::new();
        self.pending.clear();

        if self.finished {
            self.buffer.clear();
            return fragments;
        }

        if !self.buffer.is_empty() {
            let remainder = std::mem::take(&mut self.buffer);
            let outcome = decode_record(&remainder);
            self.handle_outcome(outcome, &mut fragments);
        }

        fragments
    }

    /// True once the termination literal has been observed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode a delivery into the text buffer, carrying an incomplete
    /// multi-byte sequence over to the next delivery instead of emitting
    /// replacement characters for it.
    fn decode_bytes(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buffer.push_str(&String::from_utf8_lossy(
                        &self.pending[consumed..consumed + valid],
                    ));
                    match err.error_len() {
                        // Truncated sequence at the end of the delivery;
                        // the rest of the character arrives with the next one
                        None => {
                            consumed += valid;
                            break;
                        }
                        Some(invalid) => {
                            self.buffer.push('\u{FFFD}');
                            consumed += valid + invalid;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }

    fn handle_outcome(&mut self, outcome: Option<RecordOutcome>, fragments: &mut Vec<String>) {
        match outcome {
            Some(RecordOutcome::Fragment(text)) => fragments.push(text),
            Some(RecordOutcome::Terminator) => self.finished = true,
            Some(RecordOutcome::Malformed(reason)) => {
                warn!("skipping malformed stream record: {}", reason);
            }
            None => {}
        }
    }
}

/// Decode one complete record line.
///
/// Returns `None` for blank lines and lines without the data tag; those
/// carry no payload. The fragment lives at `choices[0].delta.content`; a
/// record without it (or with an empty string there) contributes nothing.
fn decode_record(line: &str) -> Option<RecordOutcome> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let payload = trimmed.strip_prefix(DATA_TAG)?;
    if payload == DONE_LITERAL {
        return Some(RecordOutcome::Terminator);
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(value) => {
            let content = value
                .pointer("/choices/0/delta/content")
                .and_then(Value::as_str)
                .unwrap_or("");
            if content.is_empty() {
                None
            } else {
                Some(RecordOutcome::Fragment(content.to_string()))
            }
        }
        Err(err) => Some(RecordOutcome::Malformed(err.to_string())),
    }
}
