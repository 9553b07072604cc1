//! Business services layer.
//!
//! Services sit between the HTTP layer and the infrastructure layer:
//!
//! ```text
//! HTTP handlers (api)
//!          |
//!          v
//!    Services Layer
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! - [`ReplyTrackerService`]: joins stored thread trackers with live provider threads

mod reply_tracker_service;

pub use reply_tracker_service::{
    ReplyTrackerEmail, ReplyTrackerError, ReplyTrackerRequest, ReplyTrackerResponse,
    ReplyTrackerResult, ReplyTrackerService, TrackerStore,
};
