//! Reply tracker service.
//!
//! Joins the stored thread trackers for an account with live thread data from
//! the mailbox provider:
//! - one page of trackers is read from the [`TrackerStore`]
//! - every tracked thread is fetched from the provider concurrently
//! - each thread is summarized from its newest message

use async_trait::async_trait;
use chrono::Utc;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AccountId, ReplyTrackerType, Thread, ThreadId, TimeRange};
use crate::providers::email::{EmailProvider, ProviderError};
use crate::storage::queries::trackers;
use crate::storage::{Database, DatabaseError, TrackerPage, TrackerQuery};

/// Errors that can occur while listing tracked emails.
#[derive(Debug, Error)]
pub enum ReplyTrackerError {
    /// Tracker lookup failed.
    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// A thread fetch failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result type for reply tracker operations.
pub type ReplyTrackerResult<T> = Result<T, ReplyTrackerError>;

/// Source of tracked threads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// Returns one page of unresolved trackers plus the total count.
    async fn tracker_page(&self, query: &TrackerQuery) -> ReplyTrackerResult<TrackerPage>;
}

#[async_trait]
impl TrackerStore for Database {
    async fn tracker_page(&self, query: &TrackerQuery) -> ReplyTrackerResult<TrackerPage> {
        Ok(trackers::get_paginated(self, query, Utc::now()).await?)
    }
}

/// What to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTrackerRequest {
    pub email_account_id: AccountId,
    pub tracker_type: ReplyTrackerType,
    /// 1-based page number.
    pub page: u32,
    pub time_range: TimeRange,
}

/// Summary of a tracked thread, taken from its newest message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyTrackerEmail {
    pub thread_id: ThreadId,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub snippet: String,
}

/// A page of tracked emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTrackerResponse {
    pub emails: Vec<ReplyTrackerEmail>,
    /// Total tracked threads across all pages. Threads that no longer exist
    /// at the provider still count, so this can exceed what paging through
    /// `emails` yields.
    pub count: u64,
}

/// Service listing tracked emails for an account.
pub struct ReplyTrackerService<S: TrackerStore> {
    store: S,
}

impl<S: TrackerStore> ReplyTrackerService<S> {
    /// Creates a new reply tracker service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists one page of tracked emails.
    ///
    /// Fails as a whole if any thread fetch fails. Threads the provider no
    /// longer has, and threads without messages, are left out of `emails`.
    pub async fn list_emails(
        &self,
        provider: &dyn EmailProvider,
        request: &ReplyTrackerRequest,
    ) -> ReplyTrackerResult<ReplyTrackerResponse> {
        let query = TrackerQuery {
            email_account_id: request.email_account_id.clone(),
            tracker_type: request.tracker_type.tracker_type(),
            page: request.page,
            time_range: request.time_range,
        };

        let page = self.store.tracker_page(&query).await?;
        tracing::debug!(
            email_account_id = %request.email_account_id,
            trackers = page.trackers.len(),
            count = page.count,
            "loaded tracker page"
        );

        let threads = try_join_all(
            page.trackers
                .iter()
                .map(|tracker| provider.get_thread(&tracker.thread_id.0)),
        )
        .await?;

        let emails = threads
            .into_iter()
            .flatten()
            .filter_map(|thread| summarize(&thread))
            .collect();

        Ok(ReplyTrackerResponse {
            emails,
            count: page.count,
        })
    }
}

fn summarize(thread: &Thread) -> Option<ReplyTrackerEmail> {
    let last = thread.last_message()?;
    let header = |name: &str| last.header(name).unwrap_or_default().to_string();

    Some(ReplyTrackerEmail {
        thread_id: thread.id.clone(),
        subject: header("Subject"),
        from: header("From"),
        date: header("Date"),
        snippet: last.snippet.clone(),
    })
}
