//! Conversation store for the interactive session
//!
//! Keeps the entries shown on screen and derives the prior-turn list
//! handed to the API from completed exchanges.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::types::{ChatEntry, ChatRole, ChatTurn, EntryStatus};

/// Maximum number of entries to keep in memory
const MAX_HISTORY_SIZE: usize = 1000;

/// Conversation history maintaining session state
///
/// Tracks:
/// - Display entries (bounded to MAX_HISTORY_SIZE)
/// - Completed exchanges for request context
/// - Session metadata
pub struct ChatHistory {
    /// Conversation entries (FIFO queue, max 1000)
    entries: VecDeque<ChatEntry>,

    /// Session start time
    session_start: DateTime<Utc>,

    /// Total entries recorded, including evicted ones
    entry_count: usize,
}

impl ChatHistory {
    /// Create an empty history
    pub fn new() -> Self {
        ChatHistory {
            entries: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            session_start: Utc::now(),
            entry_count: 0,
        }
    }

    /// Record an entry
    ///
    /// Complexity: O(1) append, O(1) eviction at capacity
    pub fn push(&mut self, entry: ChatEntry) -> Uuid {
        let id = entry.id;

        if self.entries.len() >= MAX_HISTORY_SIZE {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);

        self.entry_count += 1;
        id
    }

    /// Append streamed text to an entry's content
    pub fn append_content(&mut self, id: Uuid, fragment: &str) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.content.push_str(fragment);
                true
            }
            None => false,
        }
    }

    /// Mark an entry as completed
    pub fn complete_entry(&mut self, id: Uuid) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.status = EntryStatus::Sent;
                true
            }
            None => false,
        }
    }

    /// Mark an entry as failed, replacing its content with `message`
    pub fn fail_entry(&mut self, id: Uuid, message: &str) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.content = message.to_string();
                entry.status = EntryStatus::Error;
                true
            }
            None => false,
        }
    }

    /// Prior turns for the next request, oldest first.
    ///
    /// Only completed exchanges qualify: a user entry immediately followed
    /// by a successful reply. Failed and still-streaming exchanges carry no
    /// context.
    ///
    /// Complexity: O(n) over stored entries
    pub fn api_history(&self) -> Vec<ChatTurn> {
        let entries: Vec<&ChatEntry> = self.entries.iter().collect();
        let mut turns = Vec::new();

        let mut i = 0;
        while i + 1 < entries.len() {
            let (user, reply) = (entries[i], entries[i + 1]);
            let completed_pair = user.role == ChatRole::User
                && reply.role == ChatRole::Ai
                && reply.status == EntryStatus::Sent
                && !reply.content.is_empty();

            if completed_pair {
                turns.push(user.to_turn());
                turns.push(reply.to_turn());
                i += 2;
            } else {
                i += 1;
            }
        }

        turns
    }

    /// Get entries newest first, up to `limit`
    pub fn recent(&self, limit: usize) -> Vec<&ChatEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Number of entries currently stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total entries recorded this session, including evicted ones
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Completed exchanges currently usable as context
    pub fn exchange_count(&self) -> usize {
        self.api_history().len() / 2
    }

    /// Session duration in seconds
    pub fn session_duration_secs(&self) -> i64 {
        (Utc::now() - self.session_start).num_seconds()
    }

    /// Clear all entries and restart the session clock
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entry_count = 0;
        self.session_start = Utc::now();
    }

    fn entry_mut(&mut self, id: Uuid) -> Option<&mut ChatEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}
