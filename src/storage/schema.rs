//! SQL schema definitions as const strings.
//!
//! Timestamps are stored as RFC 3339 strings in UTC with millisecond
//! precision so that lexical order matches chronological order.

/// SQL to create the users table.
pub const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the api_keys table.
pub const CREATE_API_KEYS: &str = r#"
CREATE TABLE IF NOT EXISTS api_keys (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    name TEXT,
    hashed_key TEXT NOT NULL UNIQUE,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
)
"#;

/// SQL to create the email_accounts table.
pub const CREATE_EMAIL_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS email_accounts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    email TEXT NOT NULL UNIQUE,
    provider_type TEXT NOT NULL,
    access_token TEXT,
    refresh_token TEXT,
    expires_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

/// SQL to create email account indexes.
pub const CREATE_EMAIL_ACCOUNT_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_email_accounts_user ON email_accounts(user_id)
"#;

/// SQL to create the thread_trackers table.
pub const CREATE_THREAD_TRACKERS: &str = r#"
CREATE TABLE IF NOT EXISTS thread_trackers (
    id TEXT PRIMARY KEY,
    email_account_id TEXT NOT NULL REFERENCES email_accounts(id),
    thread_id TEXT NOT NULL,
    message_id TEXT NOT NULL,
    tracker_type TEXT NOT NULL,
    resolved INTEGER NOT NULL DEFAULT 0,
    sent_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (email_account_id, thread_id, message_id)
)
"#;

/// SQL to create thread tracker indexes.
pub const CREATE_THREAD_TRACKER_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_thread_trackers_lookup
    ON thread_trackers(email_account_id, resolved, tracker_type);
CREATE INDEX IF NOT EXISTS idx_thread_trackers_created ON thread_trackers(created_at DESC)
"#;

/// Returns all migrations in order.
pub fn all_migrations() -> Vec<&'static str> {
    vec![
        CREATE_USERS,
        CREATE_API_KEYS,
        CREATE_EMAIL_ACCOUNTS,
        CREATE_EMAIL_ACCOUNT_INDEXES,
        CREATE_THREAD_TRACKERS,
        CREATE_THREAD_TRACKER_INDEXES,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_migrations_returns_statements() {
        let migrations = all_migrations();
        assert_eq!(migrations.len(), 6);
        assert_eq!(migrations[0], CREATE_USERS);
    }

    #[test]
    fn api_keys_store_only_hashes() {
        assert!(CREATE_API_KEYS.contains("hashed_key TEXT NOT NULL UNIQUE"));
        assert!(!CREATE_API_KEYS.contains("secret"));
    }

    #[test]
    fn trackers_reference_accounts() {
        assert!(CREATE_THREAD_TRACKERS.contains("REFERENCES email_accounts(id)"));
    }

    #[test]
    fn indexes_use_if_not_exists() {
        assert!(CREATE_EMAIL_ACCOUNT_INDEXES.contains("IF NOT EXISTS"));
        assert!(CREATE_THREAD_TRACKER_INDEXES.contains("IF NOT EXISTS"));
    }
}
