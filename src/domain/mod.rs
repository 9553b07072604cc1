//! Domain layer types for the reply tracker.
//!
//! This module contains the provider-neutral mailbox shapes (email, thread)
//! together with the account, user and tracker records the service stores.

mod account;
mod email;
mod thread;
mod tracker;
mod types;
mod user;

pub use account::{EmailAccount, OAuthTokens, ProviderType};
pub use email::{Email, EmailPart, EmailPayload, Header, PartBody};
pub use thread::Thread;
pub use tracker::{
    InvalidTrackerType, ReplyTrackerType, ThreadTracker, ThreadTrackerType, TimeRange,
};
pub use types::{AccountId, EmailId, ThreadId, UserId};
pub use user::{hash_api_key, ApiKey, User};
