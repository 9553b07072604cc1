//! Email provider trait definition.
//!
//! This module defines the [`EmailProvider`] trait which abstracts over mailbox
//! backends. Consumers depend only on its four read operations and the
//! provider-neutral [`Email`] and [`Thread`] shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Email, ProviderType, Thread};

/// Result type alias for email provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during email provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Authentication failed or credentials expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-specific error.
    #[error("provider error: {0}")]
    Provider(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Search and pagination options shared by thread and message listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Provider search query (Gmail `q` syntax).
    pub query: Option<String>,
    /// Only return items carrying all of these labels.
    pub label_ids: Vec<String>,
    /// Maximum number of items to return.
    pub max_results: Option<u32>,
    /// Opaque cursor from a previous page.
    pub page_token: Option<String>,
}

impl ListOptions {
    /// Options with only a search query.
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Restricts results to the given labels.
    pub fn labels<I, S>(mut self, label_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.label_ids = label_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Caps the page size.
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Continues from the cursor returned by a previous page.
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }
}

/// A page of threads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPage {
    pub threads: Vec<Thread>,
    /// Cursor for the next page; `None` on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// A page of messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Email>,
    /// Cursor for the next page; `None` on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Normalizes a provider page token: absent and empty both become `None`.
pub fn normalize_page_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// Read access to a mailbox.
///
/// Implementations fetch fresh data on every call; nothing is cached.
///
/// # Example
///
/// ```ignore
/// use reply_tracker::providers::email::{EmailProvider, ListOptions};
///
/// async fn unread(provider: &dyn EmailProvider) -> Result<()> {
///     let page = provider
///         .get_threads(ListOptions::with_query("is:unread").max_results(20))
///         .await?;
///     for thread in page.threads {
///         println!("{}: {} messages", thread.id, thread.messages.len());
///     }
///     Ok(())
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Returns the type of this provider.
    fn provider_type(&self) -> ProviderType;

    /// Lists threads matching `options` with their full messages.
    ///
    /// Returns an empty page, not an error, when nothing matches.
    ///
    /// # Errors
    ///
    /// Fails if the underlying transport or provider call fails.
    async fn get_threads(&self, options: ListOptions) -> Result<ThreadPage>;

    /// Fetches a complete thread. `Ok(None)` means the thread does not exist
    /// or is no longer accessible.
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// Lists messages matching `options` with their payloads.
    async fn get_messages(&self, options: ListOptions) -> Result<MessagePage>;

    /// Fetches a single message. `Ok(None)` means not found.
    async fn get_message(&self, message_id: &str) -> Result<Option<Email>>;
}
