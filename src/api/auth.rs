//! API key authentication.
//!
//! Callers send their secret in the `API-Key` header. The key identifies a
//! user; the user's primary email account supplies the mailbox provider.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::error::ApiError;
use super::AppState;
use crate::domain::{AccountId, UserId};
use crate::providers::email::{EmailProvider, ProviderError};
use crate::storage::queries::{accounts, api_keys};

/// Request header carrying the API key secret.
pub const API_KEY_HEADER: &str = "API-Key";

/// An authenticated caller.
#[derive(Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    /// The user's primary account, which `provider` serves.
    pub account_id: AccountId,
    pub provider: Arc<dyn EmailProvider>,
}

/// Validates the API key and connects to the caller's mailbox.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthContext, ApiError> {
    let secret = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingApiKey)?;

    let key = api_keys::find_active_by_secret(&state.db, secret)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "api key lookup failed");
            ApiError::Internal
        })?
        .ok_or(ApiError::InvalidApiKey)?;

    let account = accounts::find_primary_for_user(&state.db, &key.user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %key.user_id, error = %e, "account lookup failed");
            ApiError::Internal
        })?
        .ok_or(ApiError::MissingAccessToken)?;

    if account.tokens.access_token.is_none() && account.tokens.refresh_token.is_none() {
        return Err(ApiError::MissingAccessToken);
    }

    let handle = state.providers.create(&account).await.map_err(|e| {
        tracing::warn!(
            user_id = %key.user_id,
            email_account_id = %account.id,
            error = %e,
            "failed to connect email provider"
        );
        match e {
            ProviderError::Authentication(_) => ApiError::MissingAccessToken,
            _ => ApiError::Internal,
        }
    })?;

    if let Some(tokens) = &handle.refreshed_tokens {
        // Non-fatal: the next request refreshes again.
        if let Err(e) = accounts::update_tokens(&state.db, &account.id, tokens).await {
            tracing::warn!(
                email_account_id = %account.id,
                error = %e,
                "failed to persist refreshed tokens"
            );
        }
    }

    Ok(AuthContext {
        user_id: key.user_id,
        account_id: account.id,
        provider: handle.provider,
    })
}
