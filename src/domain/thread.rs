//! Thread domain types.
//!
//! A thread groups the messages of one conversation, oldest first.

use serde::{Deserialize, Serialize};

use super::{Email, ThreadId};

/// A complete email thread with all messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Provider thread ID.
    pub id: ThreadId,
    /// Provider history marker at the time of fetch.
    pub history_id: String,
    /// Messages in provider order (oldest first).
    pub messages: Vec<Email>,
    /// Short preview of the thread.
    pub snippet: String,
}

impl Thread {
    /// Returns the most recent message, if the thread has any.
    pub fn last_message(&self) -> Option<&Email> {
        self.messages.last()
    }

    /// Returns true if the provider returned no messages for this thread.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
