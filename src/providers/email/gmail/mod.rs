//! Gmail provider implementation.
//!
//! Listings go through `users.threads.list` / `users.messages.list`, which
//! only return ids. Full payloads for a page are then fetched with a single
//! multipart batch call per 100 ids.

mod api;
mod batch;
mod client;
mod transform;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use self::api::{GmailMessage, GmailThread, MessageListResponse, ThreadListResponse};
use self::client::GmailClient;
use super::traits::{
    normalize_page_token, EmailProvider, ListOptions, MessagePage, ProviderError, Result,
    ThreadPage,
};
use crate::config::{GmailSettings, GoogleSettings};
use crate::domain::{Email, EmailAccount, OAuthTokens, ProviderType, Thread};

/// Tokens expiring within this window are refreshed before use.
const REFRESH_LEEWAY_SECS: i64 = 60;

/// Gmail REST API provider.
#[derive(Debug, Clone)]
pub struct GmailProvider {
    client: GmailClient,
}

impl GmailProvider {
    /// Creates a provider using an access token that is known to be valid.
    pub fn new(access_token: impl Into<String>, settings: GmailSettings) -> Self {
        Self {
            client: GmailClient::new(reqwest::Client::new(), settings, access_token.into()),
        }
    }

    /// Creates a provider for `account`, refreshing its access token first
    /// when it is missing or about to expire.
    ///
    /// Returns the refreshed token set alongside the provider so the caller
    /// can persist it; `None` means the stored tokens were used as-is.
    pub async fn connect(
        account: &EmailAccount,
        google: &GoogleSettings,
        gmail: &GmailSettings,
    ) -> Result<(Self, Option<OAuthTokens>)> {
        let http = reqwest::Client::new();
        let now = Utc::now();
        let tokens = &account.tokens;

        let refreshed = if tokens.needs_refresh(now, Duration::seconds(REFRESH_LEEWAY_SECS))
            && tokens.refresh_token.is_some()
        {
            tracing::debug!(email_account_id = %account.id, "refreshing gmail access token");
            Some(client::refresh_tokens(&http, google, tokens, now).await?)
        } else {
            None
        };

        let access_token = refreshed
            .as_ref()
            .unwrap_or(tokens)
            .access_token
            .clone()
            .ok_or_else(|| ProviderError::Authentication("missing access token".to_string()))?;

        let provider = Self {
            client: GmailClient::new(http, gmail.clone(), access_token),
        };
        Ok((provider, refreshed))
    }
}

fn list_query(options: &ListOptions) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(q) = options.query.as_ref().filter(|q| !q.is_empty()) {
        query.push(("q", q.clone()));
    }
    for label in &options.label_ids {
        query.push(("labelIds", label.clone()));
    }
    if let Some(max) = options.max_results {
        query.push(("maxResults", max.to_string()));
    }
    if let Some(token) = options.page_token.as_ref().filter(|t| !t.is_empty()) {
        query.push(("pageToken", token.clone()));
    }
    query
}

fn full_format() -> [(&'static str, String); 1] {
    [("format", "full".to_string())]
}

#[async_trait]
impl EmailProvider for GmailProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Gmail
    }

    async fn get_threads(&self, options: ListOptions) -> Result<ThreadPage> {
        let listing: ThreadListResponse = self
            .client
            .get_json(&["threads"], &list_query(&options))
            .await?;

        let next_page_token = normalize_page_token(listing.next_page_token);
        let ids: Vec<String> = listing
            .threads
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| t.id)
            .collect();

        if ids.is_empty() {
            return Ok(ThreadPage {
                threads: Vec::new(),
                next_page_token,
            });
        }

        let threads: Vec<GmailThread> = self.client.batch_get("threads", &ids).await?;
        tracing::debug!(listed = ids.len(), fetched = threads.len(), "fetched gmail threads");

        Ok(ThreadPage {
            threads: threads.into_iter().map(transform::to_thread).collect(),
            next_page_token,
        })
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let thread: Option<GmailThread> = self
            .client
            .get_optional(&["threads", thread_id], &full_format())
            .await?;
        Ok(thread.map(transform::to_thread))
    }

    async fn get_messages(&self, options: ListOptions) -> Result<MessagePage> {
        let listing: MessageListResponse = self
            .client
            .get_json(&["messages"], &list_query(&options))
            .await?;

        let next_page_token = normalize_page_token(listing.next_page_token);
        let ids: Vec<String> = listing
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        if ids.is_empty() {
            return Ok(MessagePage {
                messages: Vec::new(),
                next_page_token,
            });
        }

        let messages: Vec<GmailMessage> = self.client.batch_get("messages", &ids).await?;
        tracing::debug!(listed = ids.len(), fetched = messages.len(), "fetched gmail messages");

        Ok(MessagePage {
            messages: messages.into_iter().map(transform::to_email).collect(),
            next_page_token,
        })
    }

    async fn get_message(&self, message_id: &str) -> Result<Option<Email>> {
        let message: Option<GmailMessage> = self
            .client
            .get_optional(&["messages", message_id], &full_format())
            .await?;
        Ok(message.map(transform::to_email))
    }
}
