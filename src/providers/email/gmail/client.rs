//! Authenticated HTTP access to the Gmail REST API.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::api::TokenResponse;
use super::batch;
use crate::config::{GmailSettings, GoogleSettings};
use crate::domain::OAuthTokens;
use crate::providers::email::traits::{ProviderError, Result};

/// Thin wrapper around `reqwest` carrying the bearer token and endpoints.
#[derive(Debug, Clone)]
pub(crate) struct GmailClient {
    http: Client,
    settings: GmailSettings,
    access_token: String,
}

impl GmailClient {
    pub(crate) fn new(http: Client, settings: GmailSettings, access_token: String) -> Self {
        Self {
            http,
            settings,
            access_token,
        }
    }

    /// GET `{api_base}/{segments..}?{query}` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments, query)?;
        tracing::trace!(%url, "gmail request");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Internal(format!("parse response: {}", e)))
    }

    /// Like [`get_json`](Self::get_json) but maps 404 to `None`.
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        match self.get_json(segments, query).await {
            Ok(value) => Ok(Some(value)),
            Err(ProviderError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetches `resource/{id}?format=full` for every id through the batch
    /// endpoint, in id order. Ids whose sub-response is 404 are skipped.
    pub(crate) async fn batch_get<T: DeserializeOwned>(
        &self,
        resource: &str,
        ids: &[String],
    ) -> Result<Vec<T>> {
        let mut results = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(batch::MAX_BATCH_SIZE) {
            let boundary = format!("batch_{}", uuid::Uuid::new_v4().simple());
            let body = batch::build_request(
                &self.settings.batch_path_prefix,
                resource,
                chunk,
                &boundary,
            );

            let response = self
                .http
                .post(&self.settings.batch_url)
                .bearer_auth(&self.access_token)
                .header(CONTENT_TYPE, batch::content_type(&boundary))
                .body(body)
                .send()
                .await
                .map_err(|e| ProviderError::Connection(e.to_string()))?;

            if !response.status().is_success() {
                return Err(handle_error(response).await);
            }

            let response_boundary = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(batch::boundary_from_content_type)
                .ok_or_else(|| {
                    ProviderError::Provider("batch response has no boundary".to_string())
                })?;
            let text = response
                .text()
                .await
                .map_err(|e| ProviderError::Connection(e.to_string()))?;

            for item in batch::parse_response(&text, &response_boundary)? {
                let id = chunk.get(item.index).map(String::as_str).unwrap_or("?");
                match item.status {
                    200..=299 => {
                        let value = serde_json::from_str(&item.body).map_err(|e| {
                            ProviderError::Internal(format!("parse {} {}: {}", resource, id, e))
                        })?;
                        results.push(value);
                    }
                    404 => tracing::debug!(resource, id, "batch item not found, skipping"),
                    status => return Err(status_error(status, item.body, None)),
                }
            }
        }

        Ok(results)
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&self.settings.api_base)
            .map_err(|e| ProviderError::Internal(format!("invalid api base: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ProviderError::Internal("api base cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// Exchanges a refresh token for a new access token.
///
/// The returned set keeps the old refresh token unless Google rotated it.
pub(crate) async fn refresh_tokens(
    http: &Client,
    google: &GoogleSettings,
    tokens: &OAuthTokens,
    now: DateTime<Utc>,
) -> Result<OAuthTokens> {
    let refresh_token = tokens
        .refresh_token
        .as_deref()
        .ok_or_else(|| ProviderError::Authentication("no refresh token".to_string()))?;

    let params = [
        ("client_id", google.client_id.as_str()),
        ("client_secret", google.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response = http
        .post(&google.token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| ProviderError::Connection(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Authentication(format!(
            "token refresh failed ({}): {}",
            status, body
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Internal(format!("parse token response: {}", e)))?;

    Ok(OAuthTokens {
        access_token: Some(token.access_token),
        refresh_token: token.refresh_token.or_else(|| tokens.refresh_token.clone()),
        expires_at: token.expires_in.map(|secs| now + Duration::seconds(secs)),
    })
}

async fn handle_error(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let body = response.text().await.unwrap_or_default();

    status_error(status.as_u16(), body, retry_after)
}

/// Maps a non-success Gmail status onto a provider error.
fn status_error(status: u16, body: String, retry_after_secs: Option<u64>) -> ProviderError {
    match StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR) {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Authentication(format!("unauthorized: {}", body))
        }
        StatusCode::NOT_FOUND => ProviderError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after_secs },
        StatusCode::BAD_REQUEST => ProviderError::InvalidRequest(body),
        s if s.is_server_error() => {
            ProviderError::Provider(format!("gmail error ({}): {}", s, body))
        }
        s => ProviderError::Internal(format!("API error ({}): {}", s, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> GmailClient {
        let settings = GmailSettings {
            api_base: api_base.to_string(),
            ..GmailSettings::default()
        };
        GmailClient::new(Client::new(), settings, "token".to_string())
    }

    #[test]
    fn url_appends_segments_and_query() {
        let url = client("https://gmail.googleapis.com/gmail/v1/users/me")
            .url(
                &["threads"],
                &[
                    ("q", "from:alice is:unread".to_string()),
                    ("labelIds", "INBOX".to_string()),
                    ("labelIds", "UNREAD".to_string()),
                ],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://gmail.googleapis.com/gmail/v1/users/me/threads?q=from%3Aalice+is%3Aunread&labelIds=INBOX&labelIds=UNREAD"
        );
    }

    #[test]
    fn url_escapes_ids_and_tolerates_trailing_slash() {
        let url = client("http://127.0.0.1:1/gmail/v1/users/me/")
            .url(&["messages", "a/b"], &[("format", "full".to_string())])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:1/gmail/v1/users/me/messages/a%2Fb?format=full"
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(401, String::new(), None),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            status_error(404, "gone".to_string(), None),
            ProviderError::NotFound(body) if body == "gone"
        ));
        assert!(matches!(
            status_error(429, String::new(), Some(30)),
            ProviderError::RateLimited {
                retry_after_secs: Some(30)
            }
        ));
        assert!(matches!(
            status_error(400, String::new(), None),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            status_error(503, String::new(), None),
            ProviderError::Provider(_)
        ));
        assert!(matches!(
            status_error(418, String::new(), None),
            ProviderError::Internal(_)
        ));
    }
}
