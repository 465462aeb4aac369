use serde::{Deserialize, Serialize};

/// Overall result of a refresh, for the caller's summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Complete,
    Partial,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFailure {
    pub entity_id: i64,
    pub name: String,
    pub reason: String,
}

/// Per-entity results of one refresh. Every attempted id lands in exactly
/// one of `succeeded_ids` and `failed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub succeeded_ids: Vec<i64>,
    pub failed: Vec<EntityFailure>,
    pub total_attempted: usize,
}

impl RefreshOutcome {
    pub(crate) fn record_success(&mut self, entity_id: i64) {
        self.total_attempted += 1;
        self.succeeded_ids.push(entity_id);
    }

    pub(crate) fn record_failure(&mut self, entity_id: i64, name: &str, reason: String) {
        self.total_attempted += 1;
        self.failed.push(EntityFailure {
            entity_id,
            name: name.to_string(),
            reason,
        });
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded_ids.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn failed_ids(&self) -> Vec<i64> {
        self.failed.iter().map(|f| f.entity_id).collect()
    }

    pub fn status(&self) -> RefreshStatus {
        if self.failed.is_empty() {
            RefreshStatus::Complete
        } else if self.succeeded_ids.is_empty() {
            RefreshStatus::Failed
        } else {
            RefreshStatus::Partial
        }
    }
}
