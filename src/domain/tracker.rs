//! Thread tracker domain types.
//!
//! A tracker marks a thread that needs a reply from the account owner or is
//! awaiting a reply from someone else.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AccountId, EmailId, ThreadId};

/// A persisted marker on a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadTracker {
    pub id: String,
    pub email_account_id: AccountId,
    pub thread_id: ThreadId,
    pub message_id: EmailId,
    pub tracker_type: ThreadTrackerType,
    pub resolved: bool,
    /// When the tracked message was sent.
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Internal tracker categories as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadTrackerType {
    /// The account owner owes a reply.
    NeedsReply,
    /// The account owner is waiting on someone else.
    Awaiting,
    /// Something other than a reply is required.
    NeedsAction,
}

impl ThreadTrackerType {
    /// Stable string form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadTrackerType::NeedsReply => "NEEDS_REPLY",
            ThreadTrackerType::Awaiting => "AWAITING",
            ThreadTrackerType::NeedsAction => "NEEDS_ACTION",
        }
    }
}

impl fmt::Display for ThreadTrackerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadTrackerType {
    type Err = InvalidTrackerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEEDS_REPLY" => Ok(ThreadTrackerType::NeedsReply),
            "AWAITING" => Ok(ThreadTrackerType::Awaiting),
            "NEEDS_ACTION" => Ok(ThreadTrackerType::NeedsAction),
            other => Err(InvalidTrackerType(other.to_string())),
        }
    }
}

/// Tracker categories exposed by the public API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplyTrackerType {
    /// `needs-reply`
    #[default]
    NeedsReply,
    /// `needs-follow-up`
    NeedsFollowUp,
}

impl ReplyTrackerType {
    /// Maps the public category onto the stored tracker type.
    pub fn tracker_type(self) -> ThreadTrackerType {
        match self {
            ReplyTrackerType::NeedsReply => ThreadTrackerType::NeedsReply,
            ReplyTrackerType::NeedsFollowUp => ThreadTrackerType::Awaiting,
        }
    }
}

impl FromStr for ReplyTrackerType {
    type Err = InvalidTrackerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "needs-reply" => Ok(ReplyTrackerType::NeedsReply),
            "needs-follow-up" => Ok(ReplyTrackerType::NeedsFollowUp),
            other => Err(InvalidTrackerType(other.to_string())),
        }
    }
}

/// An unrecognised tracker type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tracker type: {0}")]
pub struct InvalidTrackerType(pub String);

/// How far back the tracked message must have been sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    /// `all`
    #[default]
    All,
    /// `3d`
    ThreeDays,
    /// `1w`
    OneWeek,
    /// `2w`
    TwoWeeks,
    /// `1m`
    OneMonth,
}

impl TimeRange {
    /// Age in days a tracked message must have reached, or `None` for no limit.
    pub fn days(self) -> Option<i64> {
        match self {
            TimeRange::All => None,
            TimeRange::ThreeDays => Some(3),
            TimeRange::OneWeek => Some(7),
            TimeRange::TwoWeeks => Some(14),
            TimeRange::OneMonth => Some(30),
        }
    }

    /// Latest `sent_at` that still falls inside the range.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - Duration::days(days))
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TimeRange::All),
            "3d" => Ok(TimeRange::ThreeDays),
            "1w" => Ok(TimeRange::OneWeek),
            "2w" => Ok(TimeRange::TwoWeeks),
            "1m" => Ok(TimeRange::OneMonth),
            other => Err(format!("invalid time range: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_type_maps_to_tracker_type() {
        assert_eq!(
            ReplyTrackerType::NeedsReply.tracker_type(),
            ThreadTrackerType::NeedsReply
        );
        assert_eq!(
            ReplyTrackerType::NeedsFollowUp.tracker_type(),
            ThreadTrackerType::Awaiting
        );
    }

    #[test]
    fn public_type_parse_rejects_unknown() {
        assert_eq!(
            "needs-follow-up".parse::<ReplyTrackerType>().unwrap(),
            ReplyTrackerType::NeedsFollowUp
        );
        let err = "needs-action".parse::<ReplyTrackerType>().unwrap_err();
        assert_eq!(err, InvalidTrackerType("needs-action".to_string()));
        assert!("NEEDS-REPLY".parse::<ReplyTrackerType>().is_err());
    }

    #[test]
    fn tracker_type_round_trips_through_str() {
        for ty in [
            ThreadTrackerType::NeedsReply,
            ThreadTrackerType::Awaiting,
            ThreadTrackerType::NeedsAction,
        ] {
            assert_eq!(ty.as_str().parse::<ThreadTrackerType>().unwrap(), ty);
        }
    }

    #[test]
    fn time_range_cutoffs() {
        let now = Utc::now();
        assert_eq!(TimeRange::All.cutoff(now), None);
        assert_eq!(TimeRange::ThreeDays.cutoff(now), Some(now - Duration::days(3)));
        assert_eq!(TimeRange::OneMonth.cutoff(now), Some(now - Duration::days(30)));
    }

    #[test]
    fn time_range_parse() {
        for (raw, range) in [
            ("all", TimeRange::All),
            ("3d", TimeRange::ThreeDays),
            ("1w", TimeRange::OneWeek),
            ("2w", TimeRange::TwoWeeks),
            ("1m", TimeRange::OneMonth),
        ] {
            assert_eq!(raw.parse::<TimeRange>().unwrap(), range);
        }
        assert!("5d".parse::<TimeRange>().is_err());
        assert!("ALL".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::default(), TimeRange::All);
    }
}
