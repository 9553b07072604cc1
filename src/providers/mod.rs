//! External service providers.
//!
//! - [`email`] - Mailbox providers (Gmail REST API)

pub mod email;
