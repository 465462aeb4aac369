//! Refresh orchestration: pulls a user's remote state into the cache.
//!
//! A full refresh runs these phases in order:
//!
//! 1. credential lookup (fatal)
//! 2. account resolution (fatal)
//! 3. verification ping (best effort)
//! 4. entity list fetch (fatal)
//! 5. server-side refresh trigger (best effort) and settling pause
//! 6. per-entity detail fetch, paced and isolated per entity
//! 7. user-level document write
//!
//! Nothing is retried automatically.

pub mod orchestrator;
pub mod outcome;
pub mod pacer;

use thiserror::Error;

use crate::api::RemoteError;
use crate::cache::CacheError;

pub use orchestrator::RefreshOrchestrator;
pub use outcome::{EntityFailure, RefreshOutcome, RefreshStatus};
pub use pacer::{Pacer, TokioPacer};

/// Fatal refresh failures. Per-entity failures are recorded in
/// `RefreshOutcome` instead.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("No bound credential for user {0}")]
    CredentialMissing(String),

    #[error("Credential store unavailable: {0}")]
    CredentialStore(String),

    #[error("Could not resolve the remote account for user {user_id}: {source}")]
    AccountResolutionFailed {
        user_id: String,
        #[source]
        source: RemoteError,
    },

    #[error("Entity not recognized: {0}")]
    EntityNotRecognized(String),

    #[error("Remote data unavailable: {0}")]
    RemoteDataUnavailable(String),

    /// Transient or application-level failure of a fatal phase.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
