//! API key operations.
//!
//! Secrets are handed out once at creation time; only their hash is stored.

use base64::prelude::*;
use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};
use rusqlite::{params, OptionalExtension, Row};

use super::format_timestamp;
use crate::domain::{hash_api_key, ApiKey, UserId};
use crate::storage::database::{Database, DatabaseError, Result};

/// Generates a new key for `user_id` and returns it with its one-time secret.
pub async fn create(
    db: &Database,
    user_id: &UserId,
    name: Option<&str>,
) -> Result<(ApiKey, String)> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| DatabaseError::TaskFailed("system random unavailable".to_string()))?;
    let secret = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    let key = ApiKey {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        name: name.map(str::to_string),
        hashed_key: hash_api_key(&secret),
        is_active: true,
    };
    insert(db, &key).await?;

    Ok((key, secret))
}

/// Inserts an API key record.
pub async fn insert(db: &Database, key: &ApiKey) -> Result<()> {
    let key = key.clone();

    db.with_conn(move |conn| {
        conn.execute(
            r#"
            INSERT INTO api_keys (id, user_id, name, hashed_key, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                key.id,
                key.user_id.0,
                key.name,
                key.hashed_key,
                key.is_active as i32,
                format_timestamp(&Utc::now()),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Looks up an active key by its plain secret.
pub async fn find_active_by_secret(db: &Database, secret: &str) -> Result<Option<ApiKey>> {
    let hashed = hash_api_key(secret);

    db.with_conn(move |conn| {
        let key = conn
            .query_row(
                r#"
                SELECT id, user_id, name, hashed_key, is_active
                FROM api_keys
                WHERE hashed_key = ?1 AND is_active = 1
                "#,
                [&hashed],
                row_to_api_key,
            )
            .optional()?;
        Ok(key)
    })
    .await
}

/// Revokes a key. Returns false if no such key exists.
pub async fn deactivate(db: &Database, key_id: &str) -> Result<bool> {
    let key_id = key_id.to_string();

    db.with_conn(move |conn| {
        let changed = conn.execute("UPDATE api_keys SET is_active = 0 WHERE id = ?1", [&key_id])?;
        Ok(changed > 0)
    })
    .await
}

fn row_to_api_key(row: &Row<'_>) -> std::result::Result<ApiKey, rusqlite::Error> {
    Ok(ApiKey {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        name: row.get(2)?,
        hashed_key: row.get(3)?,
        is_active: row.get::<_, i32>(4)? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::storage::queries::users;

    async fn setup_db_with_user() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        users::insert(
            &db,
            &User {
                id: UserId::from("user-1"),
                email: "owner@example.com".to_string(),
            },
        )
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn created_key_is_found_by_secret() {
        let db = setup_db_with_user().await;

        let (key, secret) = create(&db, &UserId::from("user-1"), Some("cli"))
            .await
            .unwrap();
        assert_ne!(key.hashed_key, secret);

        let found = find_active_by_secret(&db, &secret).await.unwrap();
        assert_eq!(found, Some(key));
    }

    #[tokio::test]
    async fn wrong_secret_is_not_found() {
        let db = setup_db_with_user().await;
        create(&db, &UserId::from("user-1"), None).await.unwrap();

        let found = find_active_by_secret(&db, "not-a-key").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn deactivated_key_is_not_found() {
        let db = setup_db_with_user().await;
        let (key, secret) = create(&db, &UserId::from("user-1"), None).await.unwrap();

        assert!(deactivate(&db, &key.id).await.unwrap());
        assert!(find_active_by_secret(&db, &secret).await.unwrap().is_none());
        assert!(!deactivate(&db, "missing").await.unwrap());
    }

    #[tokio::test]
    async fn secrets_are_unique() {
        let db = setup_db_with_user().await;
        let (_, first) = create(&db, &UserId::from("user-1"), None).await.unwrap();
        let (_, second) = create(&db, &UserId::from("user-1"), None).await.unwrap();
        assert_ne!(first, second);
    }
}
