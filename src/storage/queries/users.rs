//! User operations.

use chrono::Utc;
use rusqlite::params;

use super::format_timestamp;
use crate::domain::User;
use crate::storage::database::{Database, Result};

/// Inserts a new user.
pub async fn insert(db: &Database, user: &User) -> Result<()> {
    let user = user.clone();

    db.with_conn(move |conn| {
        conn.execute(
            "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
            params![user.id.0, user.email, format_timestamp(&Utc::now())],
        )?;
        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn user(id: &str) -> User {
        User {
            id: UserId::from(id),
            email: "owner@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_stores_user() {
        let db = Database::open_in_memory().await.unwrap();
        insert(&db, &user("user-1")).await.unwrap();

        let email: String = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT email FROM users WHERE id = 'user-1'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(email, "owner@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().await.unwrap();

        insert(&db, &user("user-1")).await.unwrap();
        assert!(insert(&db, &user("user-2")).await.is_err());
    }
}
