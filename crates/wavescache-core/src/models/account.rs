use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EntitySummary;

/// External game account bound to a user.
///
/// Written by the binding flow; the refresh layer only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundAccount {
    pub user_id: String,
    pub external_account_id: String,
    pub credential: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BoundAccount {
    pub fn new(user_id: &str, external_account_id: &str, credential: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            external_account_id: external_account_id.to_string(),
            credential: credential.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the credential, keeping the original creation time.
    pub fn rebind(&mut self, external_account_id: &str, credential: &str) {
        self.external_account_id = external_account_id.to_string();
        self.credential = credential.to_string();
        self.updated_at = Utc::now();
    }
}

/// User-level snapshot persisted at the end of a full refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub entities: Vec<EntitySummary>,
    pub succeeded: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebind_keeps_created_at() {
        let mut account = BoundAccount::new("10001", "100000001", "old-token");
        let created = account.created_at;
        account.rebind("100000002", "new-token");

        assert_eq!(account.created_at, created);
        assert_eq!(account.external_account_id, "100000002");
        assert_eq!(account.credential, "new-token");
        assert!(account.updated_at >= created);
    }

    #[test]
    fn test_snapshot_serializes_entities() {
        let snapshot = AccountSnapshot {
            account_id: "100000001".to_string(),
            entities: vec![EntitySummary {
                entity_id: 1403,
                name: "忌炎".to_string(),
                level: 80,
                rarity_tier: 5,
            }],
            succeeded: 1,
            failed: 0,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: AccountSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
