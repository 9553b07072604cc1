//! Account domain types.
//!
//! Represents connected email accounts and the OAuth tokens used to reach
//! their provider.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, UserId};

/// A mailbox connected by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAccount {
    /// Unique identifier for this account.
    pub id: AccountId,
    /// Owning user.
    pub user_id: UserId,
    /// Email address of the mailbox.
    pub email: String,
    /// Which provider backend serves this mailbox.
    pub provider_type: ProviderType,
    /// OAuth credentials for the provider.
    pub tokens: OAuthTokens,
}

/// Type of email provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Gmail REST API.
    Gmail,
}

impl ProviderType {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Gmail => "gmail",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gmail" | "google" => Ok(ProviderType::Gmail),
            other => Err(format!("unknown provider type: {}", other)),
        }
    }
}

/// OAuth token set for an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// Short-lived bearer token.
    pub access_token: Option<String>,
    /// Long-lived token used to mint new access tokens.
    pub refresh_token: Option<String>,
    /// Access token expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl OAuthTokens {
    /// Returns true if the access token is missing, expired, or expires
    /// within `leeway` of `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        if self.access_token.is_none() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => expires_at - leeway <= now,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_type_round_trips_through_str() {
        assert_eq!("gmail".parse::<ProviderType>().unwrap(), ProviderType::Gmail);
        assert_eq!("google".parse::<ProviderType>().unwrap(), ProviderType::Gmail);
        assert_eq!(ProviderType::Gmail.to_string(), "gmail");
        assert!("outlook".parse::<ProviderType>().is_err());
    }

    #[test]
    fn tokens_without_access_token_need_refresh() {
        let tokens = OAuthTokens {
            access_token: None,
            refresh_token: Some("refresh".to_string()),
            expires_at: None,
        };
        assert!(tokens.needs_refresh(Utc::now(), Duration::seconds(60)));
    }

    #[test]
    fn tokens_within_leeway_need_refresh() {
        let now = Utc::now();
        let tokens = OAuthTokens {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(now + Duration::seconds(30)),
        };
        assert!(tokens.needs_refresh(now, Duration::seconds(60)));
        assert!(!tokens.needs_refresh(now, Duration::seconds(10)));
    }

    #[test]
    fn tokens_without_expiry_are_trusted() {
        let tokens = OAuthTokens {
            access_token: Some("access".to_string()),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!tokens.needs_refresh(Utc::now(), Duration::seconds(60)));
    }
}
