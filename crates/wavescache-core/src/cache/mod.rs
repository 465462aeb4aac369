//! Local snapshot cache.
//!
//! This module provides the `CacheStore` for storing and retrieving
//! per-user and per-entity snapshots. Documents are JSON, carry their owner
//! and capture time, and are considered stale after a configurable age
//! (60 minutes by default).
//!
//! Cached document types:
//! - Account snapshot (entity list plus refresh counters), one per user
//! - Entity detail, one per `(user, entity)`

pub mod store;

pub use store::{CacheDocument, CacheError, CacheStore, QueryError};
