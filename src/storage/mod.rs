//! SQLite persistence for users, API keys, email accounts and thread trackers.
//!
//! - [`Database`] wraps a single rusqlite connection for async callers
//! - [`queries`] holds one module of async CRUD functions per table
//!
//! Mailbox content is never stored here; it is fetched from the provider on
//! every request.

mod database;
pub mod queries;
mod schema;

pub use database::{Database, DatabaseError, Result};
pub use queries::trackers::{TrackerPage, TrackerQuery, PAGE_SIZE};
