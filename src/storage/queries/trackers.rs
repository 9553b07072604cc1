//! Thread tracker operations.
//!
//! Trackers are listed one per thread (the newest tracker wins), newest
//! first, in fixed-size pages.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};

use super::{format_timestamp, parse_timestamp};
use crate::domain::{AccountId, EmailId, ThreadId, ThreadTracker, ThreadTrackerType, TimeRange};
use crate::storage::database::{Database, Result};

/// Number of trackers returned per page.
pub const PAGE_SIZE: u32 = 20;

/// One page of trackers plus the total across all pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerPage {
    pub trackers: Vec<ThreadTracker>,
    /// Number of distinct tracked threads matching the filter.
    pub count: u64,
}

/// Filter for [`get_paginated`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerQuery {
    pub email_account_id: AccountId,
    pub tracker_type: ThreadTrackerType,
    /// 1-based page number.
    pub page: u32,
    pub time_range: TimeRange,
}

/// Inserts a tracker, ignoring duplicates of the same message.
pub async fn insert(db: &Database, tracker: &ThreadTracker) -> Result<()> {
    let tracker = tracker.clone();

    db.with_conn(move |conn| {
        conn.execute(
            r#"
            INSERT INTO thread_trackers (
                id, email_account_id, thread_id, message_id, tracker_type,
                resolved, sent_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(email_account_id, thread_id, message_id) DO NOTHING
            "#,
            params![
                tracker.id,
                tracker.email_account_id.0,
                tracker.thread_id.0,
                tracker.message_id.0,
                tracker.tracker_type.as_str(),
                tracker.resolved as i32,
                format_timestamp(&tracker.sent_at),
                format_timestamp(&tracker.created_at),
            ],
        )?;
        Ok(())
    })
    .await
}

/// Fetches one page of unresolved trackers and the matching thread count.
pub async fn get_paginated(
    db: &Database,
    query: &TrackerQuery,
    now: DateTime<Utc>,
) -> Result<TrackerPage> {
    let account_id = query.email_account_id.0.clone();
    let tracker_type = query.tracker_type.as_str();
    let cutoff = query.time_range.cutoff(now).as_ref().map(format_timestamp);
    let offset = query.page.max(1).saturating_sub(1).saturating_mul(PAGE_SIZE);

    db.with_conn(move |conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, email_account_id, thread_id, message_id, tracker_type,
                   resolved, sent_at, created_at
            FROM (
                SELECT *, ROW_NUMBER() OVER (
                    PARTITION BY thread_id ORDER BY created_at DESC, id DESC
                ) AS rn
                FROM thread_trackers
                WHERE email_account_id = ?1
                  AND tracker_type = ?2
                  AND resolved = 0
                  AND (?3 IS NULL OR sent_at <= ?3)
            )
            WHERE rn = 1
            ORDER BY created_at DESC, id DESC
            LIMIT ?4 OFFSET ?5
            "#,
        )?;
        let rows = stmt.query_map(
            params![account_id, tracker_type, cutoff, PAGE_SIZE, offset],
            row_to_tracker,
        )?;
        let trackers = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(DISTINCT thread_id)
            FROM thread_trackers
            WHERE email_account_id = ?1
              AND tracker_type = ?2
              AND resolved = 0
              AND (?3 IS NULL OR sent_at <= ?3)
            "#,
            params![account_id, tracker_type, cutoff],
            |row| row.get(0),
        )?;

        Ok(TrackerPage {
            trackers,
            count: count.max(0) as u64,
        })
    })
    .await
}

fn row_to_tracker(row: &Row<'_>) -> std::result::Result<ThreadTracker, rusqlite::Error> {
    let tracker_type: String = row.get(4)?;
    let tracker_type = tracker_type
        .parse::<ThreadTrackerType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
    let sent_at: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(ThreadTracker {
        id: row.get(0)?,
        email_account_id: AccountId(row.get(1)?),
        thread_id: ThreadId(row.get(2)?),
        message_id: EmailId(row.get(3)?),
        tracker_type,
        resolved: row.get::<_, i32>(5)? != 0,
        sent_at: parse_timestamp(&sent_at, 6)?,
        created_at: parse_timestamp(&created_at, 7)?,
    })
}
