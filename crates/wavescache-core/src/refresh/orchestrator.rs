use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{Pacer, RefreshError, RefreshOutcome};
use crate::api::RemoteAccountClient;
use crate::auth::CredentialStore;
use crate::cache::CacheStore;
use crate::catalog;
use crate::models::AccountSnapshot;

/// Pause after the server-side refresh trigger, before any detail fetch.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Pause between consecutive detail fetches.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(500);

/// Credential and account id for one refresh run.
struct Session {
    credential: String,
    account_id: String,
}

/// Materializes a user's remote state into the cache.
///
/// Holds no per-user state; one instance can serve any number of users.
pub struct RefreshOrchestrator {
    client: Arc<dyn RemoteAccountClient>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<CacheStore>,
    pacer: Arc<dyn Pacer>,
    settle_delay: Duration,
    pacing_delay: Duration,
}

impl RefreshOrchestrator {
    pub fn new(
        client: Arc<dyn RemoteAccountClient>,
        credentials: Arc<dyn CredentialStore>,
        cache: Arc<CacheStore>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            client,
            credentials,
            cache,
            pacer,
            settle_delay: DEFAULT_SETTLE_DELAY,
            pacing_delay: DEFAULT_PACING_DELAY,
        }
    }

    pub fn with_delays(mut self, settle_delay: Duration, pacing_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self.pacing_delay = pacing_delay;
        self
    }

    /// Refresh every entity on the user's account.
    pub async fn refresh_all(&self, user_id: &str) -> Result<RefreshOutcome, RefreshError> {
        info!(user_id = user_id, "Starting full refresh");
        let session = self.open_session(user_id).await?;

        let entities = match self
            .client
            .list_entities(&session.account_id, &session.credential)
            .await
        {
            Ok(entities) => entities,
            Err(e) => {
                error!(user_id = user_id, phase = "entity_list", error = %e, "Entity list fetch failed");
                return Err(e.into());
            }
        };
        if entities.is_empty() {
            error!(user_id = user_id, phase = "entity_list", "Remote returned no entities");
            return Err(RefreshError::RemoteDataUnavailable(format!(
                "empty entity list for account {}",
                session.account_id
            )));
        }

        self.trigger_server_refresh(user_id, &session).await;

        let mut seen = HashSet::new();
        let mut outcome = RefreshOutcome::default();
        for entity in entities.iter().filter(|e| seen.insert(e.entity_id)) {
            if outcome.total_attempted > 0 {
                self.pacer.pause(self.pacing_delay).await;
            }
            let name = catalog::label(entity.entity_id, &entities);
            self.refresh_entity(user_id, &session, entity.entity_id, &name, &mut outcome)
                .await;
        }

        let snapshot = AccountSnapshot {
            account_id: session.account_id,
            entities,
            succeeded: outcome.succeeded_count(),
            failed: outcome.failed_count(),
        };
        if let Err(e) = self.cache.save_account_snapshot(user_id, &snapshot) {
            error!(user_id = user_id, phase = "account_write", error = %e, "Failed to cache account snapshot");
            return Err(e.into());
        }

        info!(
            user_id = user_id,
            succeeded = outcome.succeeded_count(),
            failed = outcome.failed_count(),
            "Full refresh complete"
        );
        Ok(outcome)
    }

    /// Refresh one entity, addressed by name or numeric id.
    ///
    /// The name is resolved before any remote call. A failed detail fetch is
    /// recorded in the returned outcome; the user-level document is left as is.
    pub async fn refresh_single(
        &self,
        user_id: &str,
        entity_name: &str,
    ) -> Result<RefreshOutcome, RefreshError> {
        let known = self.cache.cached_entity_list(user_id).unwrap_or_default();
        let entity_id = catalog::resolve_entity_id(entity_name, &known).ok_or_else(|| {
            warn!(user_id = user_id, name = entity_name, "Entity name not recognized");
            RefreshError::EntityNotRecognized(entity_name.to_string())
        })?;
        let name = catalog::label(entity_id, &known);

        info!(user_id = user_id, entity_id = entity_id, "Starting single refresh");
        let session = self.open_session(user_id).await?;
        self.trigger_server_refresh(user_id, &session).await;

        let mut outcome = RefreshOutcome::default();
        self.refresh_entity(user_id, &session, entity_id, &name, &mut outcome)
            .await;
        Ok(outcome)
    }

    /// Credential lookup, account resolution and the verification ping.
    async fn open_session(&self, user_id: &str) -> Result<Session, RefreshError> {
        let credential = match self.credentials.get(user_id) {
            Ok(Some(account)) => account.credential,
            Ok(None) => {
                warn!(user_id = user_id, phase = "credential", "No bound credential");
                return Err(RefreshError::CredentialMissing(user_id.to_string()));
            }
            Err(e) => {
                error!(user_id = user_id, phase = "credential", error = %e, "Credential lookup failed");
                return Err(RefreshError::CredentialStore(format!("{:#}", e)));
            }
        };

        let account_id = match self.client.resolve_account(&credential).await {
            Ok(account_id) => account_id,
            Err(e) => {
                error!(user_id = user_id, phase = "resolve_account", error = %e, "Account resolution failed");
                return Err(RefreshError::AccountResolutionFailed {
                    user_id: user_id.to_string(),
                    source: e,
                });
            }
        };
        debug!(user_id = user_id, account_id = %account_id, "Resolved remote account");

        if let Err(e) = self.client.verify(&credential).await {
            warn!(user_id = user_id, phase = "verify", error = %e, "Verification ping failed, continuing");
        }

        Ok(Session { credential, account_id })
    }

    /// Best-effort server-side refresh followed by the settling pause.
    async fn trigger_server_refresh(&self, user_id: &str, session: &Session) {
        if let Err(e) = self
            .client
            .server_refresh(&session.account_id, &session.credential)
            .await
        {
            warn!(user_id = user_id, phase = "server_refresh", error = %e, "Server refresh trigger failed, continuing");
        }
        self.pacer.pause(self.settle_delay).await;
    }

    async fn refresh_entity(
        &self,
        user_id: &str,
        session: &Session,
        entity_id: i64,
        name: &str,
        outcome: &mut RefreshOutcome,
    ) {
        let detail = match self
            .client
            .fetch_entity_detail(&session.account_id, entity_id, &session.credential)
            .await
        {
            Ok(detail) => detail,
            Err(e) => {
                warn!(
                    user_id = user_id,
                    entity_id = entity_id,
                    phase = "entity_detail",
                    code = e.code(),
                    error = %e,
                    "Entity detail fetch failed"
                );
                outcome.record_failure(entity_id, name, e.to_string());
                return;
            }
        };

        match self.cache.save_entity_detail(user_id, &detail) {
            Ok(()) => {
                debug!(user_id = user_id, entity_id = entity_id, "Entity detail cached");
                outcome.record_success(entity_id);
            }
            Err(e) => {
                warn!(
                    user_id = user_id,
                    entity_id = entity_id,
                    phase = "entity_write",
                    error = %e,
                    "Failed to cache entity detail"
                );
                outcome.record_failure(entity_id, name, e.to_string());
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
