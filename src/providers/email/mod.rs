//! Email provider implementations.
//!
//! This module contains the [`EmailProvider`] trait and its backends:
//!
//! - [`GmailProvider`] - Gmail REST API with OAuth 2.0
//!
//! Callers obtain a provider for a stored account through [`create_provider`],
//! which picks the backend from the account's [`ProviderType`], or through a
//! [`ProviderFactory`] when the choice must be swappable.

mod gmail;
mod traits;

use std::sync::Arc;

use async_trait::async_trait;

pub use gmail::GmailProvider;
pub use traits::{
    normalize_page_token, EmailProvider, ListOptions, MessagePage, ProviderError, Result,
    ThreadPage,
};

#[cfg(test)]
pub use traits::MockEmailProvider;

use crate::config::Settings;
use crate::domain::{EmailAccount, OAuthTokens, ProviderType};

/// A ready-to-use provider for one account.
#[derive(Clone)]
pub struct ProviderHandle {
    pub provider: Arc<dyn EmailProvider>,
    /// Tokens minted while connecting; the caller should persist them.
    pub refreshed_tokens: Option<OAuthTokens>,
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("provider_type", &self.provider.provider_type())
            .field("refreshed", &self.refreshed_tokens.is_some())
            .finish()
    }
}

/// Builds the provider backend serving `account`.
pub async fn create_provider(
    account: &EmailAccount,
    settings: &Settings,
) -> Result<ProviderHandle> {
    match account.provider_type {
        ProviderType::Gmail => {
            let (provider, refreshed_tokens) =
                GmailProvider::connect(account, &settings.google, &settings.gmail).await?;
            Ok(ProviderHandle {
                provider: Arc::new(provider),
                refreshed_tokens,
            })
        }
    }
}

/// Creates providers for stored accounts.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn create(&self, account: &EmailAccount) -> Result<ProviderHandle>;
}

/// [`ProviderFactory`] backed by [`create_provider`].
#[derive(Debug, Clone)]
pub struct SettingsProviderFactory {
    settings: Arc<Settings>,
}

impl SettingsProviderFactory {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ProviderFactory for SettingsProviderFactory {
    async fn create(&self, account: &EmailAccount) -> Result<ProviderHandle> {
        create_provider(account, &self.settings).await
    }
}
