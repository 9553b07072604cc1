//! `GET /api/v1/reply-tracker`
//!
//! Lists emails awaiting a reply from (`needs-reply`) or to
//! (`needs-follow-up`) the caller.
//!
//! Query parameters:
//! - `email`: account to list; defaults to the caller's primary account
//! - `type`: `needs-reply` (default) or `needs-follow-up`
//! - `page`: 1-based page number, 20 threads per page
//! - `timeRange`: `all` (default), `3d`, `1w`, `2w` or `1m`

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::Json;
use regex::Regex;

use super::auth::authenticate;
use super::error::ApiError;
use super::AppState;
use crate::domain::{ReplyTrackerType, TimeRange};
use crate::services::{ReplyTrackerRequest, ReplyTrackerResponse, ReplyTrackerService};
use crate::storage::queries::accounts;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Validated query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTrackerParams {
    pub email: Option<String>,
    pub tracker_type: ReplyTrackerType,
    pub page: u32,
    pub time_range: TimeRange,
}

impl Default for ReplyTrackerParams {
    fn default() -> Self {
        Self {
            email: None,
            tracker_type: ReplyTrackerType::default(),
            page: 1,
            time_range: TimeRange::default(),
        }
    }
}

impl ReplyTrackerParams {
    /// Parses a raw query string. Unknown parameters are ignored; when a
    /// parameter repeats, the last value wins.
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let pairs: HashMap<String, String> = url::form_urlencoded::parse(
            raw.unwrap_or_default().as_bytes(),
        )
        .into_owned()
        .collect();

        let mut params = Self::default();

        if let Some(email) = pairs.get("email") {
            if !EMAIL_RE.is_match(email) {
                return Err(ApiError::InvalidQuery);
            }
            params.email = Some(email.clone());
        }
        if let Some(ty) = pairs.get("type") {
            params.tracker_type = ty.parse().map_err(|_| ApiError::InvalidQuery)?;
        }
        if let Some(page) = pairs.get("page") {
            params.page = page
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or(ApiError::InvalidQuery)?;
        }
        if let Some(range) = pairs.get("timeRange") {
            params.time_range = range.parse().map_err(|_| ApiError::InvalidQuery)?;
        }

        Ok(params)
    }
}

pub(crate) async fn get_reply_tracker(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<ReplyTrackerResponse>, ApiError> {
    let auth = authenticate(&state, &headers).await?;
    let params = ReplyTrackerParams::from_query(query.as_deref())?;

    let email_account_id = match &params.email {
        Some(email) => accounts::find_id_by_email(&state.db, &auth.user_id, email)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %auth.user_id, error = %e, "account lookup failed");
                ApiError::Internal
            })?
            .ok_or(ApiError::AccountNotFound)?,
        None => auth.account_id.clone(),
    };

    let request = ReplyTrackerRequest {
        email_account_id: email_account_id.clone(),
        tracker_type: params.tracker_type,
        page: params.page,
        time_range: params.time_range,
    };

    let service = ReplyTrackerService::new(state.db.clone());
    match service.list_emails(auth.provider.as_ref(), &request).await {
        Ok(response) => {
            tracing::info!(
                user_id = %auth.user_id,
                count = response.emails.len(),
                "Retrieved emails needing reply"
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!(
                user_id = %auth.user_id,
                email_account_id = %email_account_id,
                error = %e,
                "Error retrieving emails needing reply"
            );
            Err(ApiError::RetrievalFailed)
        }
    }
}
