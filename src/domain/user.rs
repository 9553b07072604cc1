//! Users and their API keys.

use base64::prelude::*;
use ring::digest;
use serde::{Deserialize, Serialize};

use super::UserId;

/// An application user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

/// A stored API key. Only the hash of the secret is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub user_id: UserId,
    pub name: Option<String>,
    pub hashed_key: String,
    pub is_active: bool,
}

/// Hashes an API key secret for storage and lookup (SHA-256, base64).
pub fn hash_api_key(secret: &str) -> String {
    let digest = digest::digest(&digest::SHA256, secret.as_bytes());
    BASE64_STANDARD.encode(digest.as_ref())
}
