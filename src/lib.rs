//! reply-tracker - Email provider abstraction and reply tracking API
//!
//! This crate exposes a provider-neutral view of mailbox threads and messages
//! (currently backed by the Gmail REST API) and an HTTP endpoint listing the
//! threads a user has marked as needing a reply or a follow-up.

pub mod api;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod storage;
