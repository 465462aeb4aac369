//! Core library for wavescache.
//!
//! Pulls a user's game-account progression from the remote account service
//! into a local snapshot cache, and scores cached entities for ranking.
//!
//! - `refresh`: `RefreshOrchestrator`, the remote → cache pipeline
//! - `cache`: `CacheStore`, atomic per-(user, entity) documents
//! - `scoring`: `ScoringEngine`, weighted per-axis readiness scores
//! - `api`: `RemoteAccountClient` and its HTTP implementation
//! - `auth`: credential lookup

pub mod api;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod models;
pub mod refresh;
pub mod scoring;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, RemoteAccountClient, RemoteError};
pub use auth::{CredentialStore, KeyringCredentialStore};
pub use cache::{CacheDocument, CacheError, CacheStore, QueryError};
pub use config::Config;
pub use models::{AccountSnapshot, BoundAccount, EntityDetail, EntitySummary};
pub use refresh::{RefreshError, RefreshOrchestrator, RefreshOutcome, RefreshStatus, TokioPacer};
pub use scoring::{ScoreBreakdown, ScoreSummary, ScoreWeights, ScoringEngine, ScoringError};
