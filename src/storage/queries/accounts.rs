//! Email account operations.
//!
//! Provides database operations for connected mailboxes and their tokens.

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, parse_timestamp};
use crate::domain::{AccountId, EmailAccount, OAuthTokens, ProviderType, UserId};
use crate::storage::database::{Database, Result};

const SELECT_ACCOUNT: &str = r#"
    SELECT id, user_id, email, provider_type, access_token, refresh_token, expires_at
    FROM email_accounts
"#;

/// Inserts a new email account.
pub async fn insert(db: &Database, account: &EmailAccount) -> Result<()> {
    let account = account.clone();

    db.with_conn(move |conn| {
        let now = format_timestamp(&Utc::now());
        conn.execute(
            r#"
            INSERT INTO email_accounts (
                id, user_id, email, provider_type, access_token, refresh_token,
                expires_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                account.id.0,
                account.user_id.0,
                account.email,
                account.provider_type.as_str(),
                account.tokens.access_token,
                account.tokens.refresh_token,
                account.tokens.expires_at.as_ref().map(format_timestamp),
                now,
                now,
            ],
        )?;
        Ok(())
    })
    .await
}

/// Retrieves an account by its ID.
pub async fn get_by_id(db: &Database, account_id: &AccountId) -> Result<Option<EmailAccount>> {
    let account_id = account_id.clone();

    db.with_conn(move |conn| {
        let sql = format!("{} WHERE id = ?1", SELECT_ACCOUNT);
        let account = conn
            .query_row(&sql, [&account_id.0], row_to_account)
            .optional()?;
        Ok(account)
    })
    .await
}

/// Resolves the ID of the account with `email` owned by `user_id`.
pub async fn find_id_by_email(
    db: &Database,
    user_id: &UserId,
    email: &str,
) -> Result<Option<AccountId>> {
    let user_id = user_id.clone();
    let email = email.to_string();

    db.with_conn(move |conn| {
        let id = conn
            .query_row(
                "SELECT id FROM email_accounts WHERE user_id = ?1 AND email = ?2",
                params![user_id.0, email],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(id.map(AccountId))
    })
    .await
}

/// Returns the user's oldest connected account.
pub async fn find_primary_for_user(
    db: &Database,
    user_id: &UserId,
) -> Result<Option<EmailAccount>> {
    let user_id = user_id.clone();

    db.with_conn(move |conn| {
        let sql = format!(
            "{} WHERE user_id = ?1 ORDER BY created_at ASC, id ASC LIMIT 1",
            SELECT_ACCOUNT
        );
        let account = conn
            .query_row(&sql, [&user_id.0], row_to_account)
            .optional()?;
        Ok(account)
    })
    .await
}

/// Replaces the stored OAuth tokens of an account.
pub async fn update_tokens(
    db: &Database,
    account_id: &AccountId,
    tokens: &OAuthTokens,
) -> Result<()> {
    let account_id = account_id.clone();
    let tokens = tokens.clone();

    db.with_conn(move |conn| {
        conn.execute(
            r#"
            UPDATE email_accounts
            SET access_token = ?1, refresh_token = ?2, expires_at = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![
                tokens.access_token,
                tokens.refresh_token,
                tokens.expires_at.as_ref().map(format_timestamp),
                format_timestamp(&Utc::now()),
                account_id.0,
            ],
        )?;
        Ok(())
    })
    .await
}

fn row_to_account(row: &Row<'_>) -> std::result::Result<EmailAccount, rusqlite::Error> {
    let provider: String = row.get(3)?;
    let provider_type = provider
        .parse::<ProviderType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

    let expires_at = row
        .get::<_, Option<String>>(6)?
        .map(|s| parse_timestamp(&s, 6))
        .transpose()?;

    Ok(EmailAccount {
        id: AccountId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        email: row.get(2)?,
        provider_type,
        tokens: OAuthTokens {
            access_token: row.get(4)?,
            refresh_token: row.get(5)?,
            expires_at,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::storage::queries::users;
    use chrono::{Duration, SubsecRound};

    fn make_account(id: &str, user: &str, email: &str) -> EmailAccount {
        EmailAccount {
            id: AccountId::from(id),
            user_id: UserId::from(user),
            email: email.to_string(),
            provider_type: ProviderType::Gmail,
            tokens: OAuthTokens {
                access_token: Some("access".to_string()),
                refresh_token: Some("refresh".to_string()),
                expires_at: Some((Utc::now() + Duration::hours(1)).trunc_subsecs(3)),
            },
        }
    }

    async fn setup_db_with_users() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        for (id, email) in [("user-1", "one@example.com"), ("user-2", "two@example.com")] {
            users::insert(
                &db,
                &User {
                    id: UserId::from(id),
                    email: email.to_string(),
                },
            )
            .await
            .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn insert_and_get_account() {
        let db = setup_db_with_users().await;
        let account = make_account("acc-1", "user-1", "one@example.com");

        insert(&db, &account).await.unwrap();

        let fetched = get_by_id(&db, &account.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "one@example.com");
        assert_eq!(fetched.provider_type, ProviderType::Gmail);
        assert_eq!(fetched.tokens, account.tokens);
    }

    #[tokio::test]
    async fn find_id_by_email_is_scoped_to_user() {
        let db = setup_db_with_users().await;
        insert(&db, &make_account("acc-1", "user-1", "one@example.com"))
            .await
            .unwrap();

        let own = find_id_by_email(&db, &UserId::from("user-1"), "one@example.com")
            .await
            .unwrap();
        assert_eq!(own, Some(AccountId::from("acc-1")));

        let foreign = find_id_by_email(&db, &UserId::from("user-2"), "one@example.com")
            .await
            .unwrap();
        assert!(foreign.is_none());
    }

    #[tokio::test]
    async fn primary_account_is_oldest() {
        let db = setup_db_with_users().await;
        insert(&db, &make_account("acc-1", "user-1", "first@example.com"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        insert(&db, &make_account("acc-2", "user-1", "second@example.com"))
            .await
            .unwrap();

        let primary = find_primary_for_user(&db, &UserId::from("user-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(primary.id, AccountId::from("acc-1"));

        let none = find_primary_for_user(&db, &UserId::from("user-2"))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn update_tokens_replaces_values() {
        let db = setup_db_with_users().await;
        let account = make_account("acc-1", "user-1", "one@example.com");
        insert(&db, &account).await.unwrap();

        let refreshed = OAuthTokens {
            access_token: Some("new-access".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some((Utc::now() + Duration::hours(2)).trunc_subsecs(3)),
        };
        update_tokens(&db, &account.id, &refreshed).await.unwrap();

        let fetched = get_by_id(&db, &account.id).await.unwrap().unwrap();
        assert_eq!(fetched.tokens, refreshed);
    }
}
