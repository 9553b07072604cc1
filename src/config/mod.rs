//! Configuration and settings management.
//!
//! Settings are read from a JSON file and then overridden by environment
//! variables. See [`Settings::load`].

mod settings;

pub use settings::{
    ConfigError, DatabaseSettings, GmailSettings, GoogleSettings, ServerSettings, Settings,
};
