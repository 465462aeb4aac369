use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog;
use crate::models::{AccountSnapshot, EntityDetail, EntitySummary};

/// File name of the user-level document inside a user's directory.
const ACCOUNT_DOCUMENT: &str = "account";

/// Miss reported by the cache query helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("No cached entity list for user {0}")]
    NoCachedList(String),

    #[error("Entity not recognized: {0}")]
    UnknownEntity(String),

    #[error("No cached detail for entity {entity_id} of user {user_id}")]
    NotCached { user_id: String, entity_id: i64 },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize cache document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Self-describing envelope around every cached payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheDocument<T> {
    pub owner_user_id: String,
    pub entity_id: Option<i64>,
    pub captured_at: DateTime<Utc>,
    pub data: T,
}

impl<T> CacheDocument<T> {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.captured_at).num_minutes()
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        CacheStore::is_stale(self.captured_at, max_age)
    }
}

/// Snapshot storage keyed by `(user_id, entity_id)`.
///
/// Layout: `<cache_dir>/<user>/account.json` for the user-level document and
/// `<cache_dir>/<user>/entity_<id>.json` per entity.
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Map a user id onto a file-system-safe directory name.
    ///
    /// ASCII alphanumerics and `-` pass through; every other byte, `_`
    /// included, becomes `_` plus two hex digits, so distinct ids never
    /// share a directory.
    fn sanitize_user_id(user_id: &str) -> String {
        if user_id.is_empty() {
            return "_".to_string();
        }
        let mut safe = String::with_capacity(user_id.len());
        for byte in user_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                safe.push(byte as char);
            } else {
                safe.push_str(&format!("_{:02x}", byte));
            }
        }
        safe
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.cache_dir.join(Self::sanitize_user_id(user_id))
    }

    fn document_path(&self, user_id: &str, entity_id: Option<i64>) -> PathBuf {
        let name = match entity_id {
            Some(id) => format!("entity_{}.json", id),
            None => format!("{}.json", ACCOUNT_DOCUMENT),
        };
        self.user_dir(user_id).join(name)
    }

    /// Replace the document for `(user_id, entity_id)`.
    ///
    /// The document is written to a temp file in the same directory and
    /// renamed over the target, so readers see the old or the new document,
    /// never a partial one.
    pub fn write<T: Serialize>(
        &self,
        user_id: &str,
        entity_id: Option<i64>,
        data: &T,
    ) -> Result<(), CacheError> {
        let path = self.document_path(user_id, entity_id);
        let dir = match path.parent() {
            Some(dir) => dir.to_path_buf(),
            None => self.cache_dir.clone(),
        };
        std::fs::create_dir_all(&dir)?;

        let document = CacheDocument {
            owner_user_id: user_id.to_string(),
            entity_id,
            captured_at: Utc::now(),
            data,
        };
        let contents = serde_json::to_string_pretty(&document)?;

        let temp_path = dir.join(format!(".write-{:016x}.tmp", rand::random::<u64>()));
        if let Err(e) = std::fs::write(&temp_path, contents)
            .and_then(|()| std::fs::rename(&temp_path, &path))
        {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!(user_id = user_id, entity_id = ?entity_id, "Cache document written");
        Ok(())
    }

    /// Load the full document, or `None` when it is missing or unreadable.
    pub fn read_document<T: DeserializeOwned>(
        &self,
        user_id: &str,
        entity_id: Option<i64>,
    ) -> Option<CacheDocument<T>> {
        let path = self.document_path(user_id, entity_id);
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(user_id = user_id, entity_id = ?entity_id, error = %e, "Failed to read cache document");
                return None;
            }
        };

        let document: CacheDocument<T> = match serde_json::from_str(&contents) {
            Ok(document) => document,
            Err(e) => {
                warn!(user_id = user_id, entity_id = ?entity_id, error = %e, "Corrupt cache document, treating as missing");
                return None;
            }
        };

        if document.owner_user_id != user_id || document.entity_id != entity_id {
            warn!(
                user_id = user_id,
                entity_id = ?entity_id,
                owner = %document.owner_user_id,
                "Cache document belongs to another key, treating as missing"
            );
            return None;
        }

        Some(document)
    }

    pub fn read<T: DeserializeOwned>(&self, user_id: &str, entity_id: Option<i64>) -> Option<T> {
        self.read_document(user_id, entity_id).map(|d| d.data)
    }

    pub fn captured_at(&self, user_id: &str, entity_id: Option<i64>) -> Option<DateTime<Utc>> {
        self.read_document::<IgnoredAny>(user_id, entity_id)
            .map(|d| d.captured_at)
    }

    pub fn is_stale(captured_at: DateTime<Utc>, max_age: Duration) -> bool {
        Utc::now() - captured_at > max_age
    }

    /// Delete a document. Absent documents are not an error.
    pub fn clear(&self, user_id: &str, entity_id: Option<i64>) -> Result<(), CacheError> {
        let path = self.document_path(user_id, entity_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every document of a user. Absent users are not an error.
    pub fn clear_user(&self, user_id: &str) -> Result<(), CacheError> {
        match std::fs::remove_dir_all(self.user_dir(user_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// True when the user-level document is missing, unreadable or stale.
    pub fn needs_refresh(&self, user_id: &str, max_age: Duration) -> bool {
        match self.captured_at(user_id, None) {
            Some(captured_at) => Self::is_stale(captured_at, max_age),
            None => true,
        }
    }

    // ===== Account snapshot =====

    pub fn load_account_snapshot(&self, user_id: &str) -> Option<CacheDocument<AccountSnapshot>> {
        self.read_document(user_id, None)
    }

    pub fn save_account_snapshot(
        &self,
        user_id: &str,
        snapshot: &AccountSnapshot,
    ) -> Result<(), CacheError> {
        self.write(user_id, None, snapshot)
    }

    pub fn cached_entity_list(&self, user_id: &str) -> Option<Vec<EntitySummary>> {
        self.read::<AccountSnapshot>(user_id, None)
            .map(|s| s.entities)
            .filter(|entities| !entities.is_empty())
    }

    // ===== Entity detail =====

    pub fn load_entity_detail(&self, user_id: &str, entity_id: i64) -> Option<EntityDetail> {
        self.read(user_id, Some(entity_id))
    }

    pub fn save_entity_detail(&self, user_id: &str, detail: &EntityDetail) -> Result<(), CacheError> {
        self.write(user_id, Some(detail.entity_id), detail)
    }

    // ===== Queries =====

    /// The user's cached entity list, or a typed miss.
    pub fn query_entity_list(&self, user_id: &str) -> Result<Vec<EntitySummary>, QueryError> {
        self.cached_entity_list(user_id)
            .ok_or_else(|| QueryError::NoCachedList(user_id.to_string()))
    }

    /// Cached detail for an entity addressed by name or numeric id.
    pub fn query_entity_detail(&self, user_id: &str, name: &str) -> Result<EntityDetail, QueryError> {
        let known = self.cached_entity_list(user_id).unwrap_or_default();
        let entity_id = catalog::resolve_entity_id(name, &known)
            .ok_or_else(|| QueryError::UnknownEntity(name.to_string()))?;
        self.load_entity_detail(user_id, entity_id)
            .ok_or_else(|| QueryError::NotCached {
                user_id: user_id.to_string(),
                entity_id,
            })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_detail;

    fn store() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("cache")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, store) = store();
        let payload = serde_json::json!({"roles": [1403, 1202], "note": "鸣潮"});

        store.write("10001", None, &payload).unwrap();
        let read: serde_json::Value = store.read("10001", None).unwrap();
        assert_eq!(read, payload);
    }

    #[test]
    fn test_read_never_written_is_none() {
        let (_dir, store) = store();
        assert!(store.read::<serde_json::Value>("10001", None).is_none());
        assert!(store.read::<serde_json::Value>("10001", Some(1403)).is_none());
        assert!(store.captured_at("10001", None).is_none());
    }

    #[test]
    fn test_write_replaces_whole_document() {
        let (_dir, store) = store();
        store.write("10001", Some(1403), &serde_json::json!({"a": 1, "b": 2})).unwrap();
        store.write("10001", Some(1403), &serde_json::json!({"c": 3})).unwrap();

        let read: serde_json::Value = store.read("10001", Some(1403)).unwrap();
        assert_eq!(read, serde_json::json!({"c": 3}));
    }

    #[test]
    fn test_entity_and_user_documents_are_separate() {
        let (_dir, store) = store();
        store.write("10001", None, &"user").unwrap();
        store.write("10001", Some(1403), &"entity").unwrap();
        store.write("10002", Some(1403), &"other user").unwrap();

        assert_eq!(store.read::<String>("10001", None).as_deref(), Some("user"));
        assert_eq!(store.read::<String>("10001", Some(1403)).as_deref(), Some("entity"));
        assert_eq!(store.read::<String>("10002", Some(1403)).as_deref(), Some("other user"));
    }

    #[test]
    fn test_corrupt_document_reads_as_none() {
        let (_dir, store) = store();
        store.write("10001", Some(1403), &sample_detail(1403)).unwrap();
        std::fs::write(store.document_path("10001", Some(1403)), "{not json").unwrap();

        assert!(store.load_entity_detail("10001", 1403).is_none());
        assert!(store.captured_at("10001", Some(1403)).is_none());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_dir, store) = store();
        store.write("10001", None, &"a").unwrap();
        store.write("10001", None, &"b").unwrap();

        let entries: Vec<_> = std::fs::read_dir(store.cache_dir.join("10001"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(entries, vec!["account.json".to_string()]);
    }

    #[test]
    fn test_user_id_cannot_escape_cache_dir() {
        let (_dir, store) = store();
        let path = store.document_path("../../etc", None);
        assert!(path.starts_with(&store.cache_dir));
        assert_eq!(CacheStore::sanitize_user_id(""), "_");
    }

    #[test]
    fn test_similar_user_ids_do_not_share_documents() {
        let (_dir, store) = store();
        store.write("user/1", None, &"first").unwrap();
        store.write("user_1", None, &"second").unwrap();
        store.write("user 1", None, &"third").unwrap();

        assert_eq!(store.read::<String>("user/1", None).as_deref(), Some("first"));
        assert_eq!(store.read::<String>("user_1", None).as_deref(), Some("second"));
        assert_eq!(store.read::<String>("user 1", None).as_deref(), Some("third"));
        assert_ne!(CacheStore::sanitize_user_id("user/1"), CacheStore::sanitize_user_id("user_1"));
        assert_eq!(CacheStore::sanitize_user_id("ab-12"), "ab-12");
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let (_dir, store) = store();
        // A directory where the document should go makes the rename fail
        std::fs::create_dir_all(store.document_path("10001", Some(1403))).unwrap();

        assert!(store.write("10001", Some(1403), &"x").is_err());
        let temp_files = std::fs::read_dir(store.user_dir("10001"))
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(temp_files, 0);
    }

    #[test]
    fn test_clear_user_removes_every_document() {
        let (_dir, store) = store();
        store.write("10001", None, &"user").unwrap();
        store.write("10001", Some(1403), &"entity").unwrap();
        store.write("10002", Some(1403), &"other user").unwrap();

        store.clear_user("10001").unwrap();
        store.clear_user("10001").unwrap();
        assert!(store.read::<String>("10001", None).is_none());
        assert!(store.read::<String>("10001", Some(1403)).is_none());
        assert_eq!(store.read::<String>("10002", Some(1403)).as_deref(), Some("other user"));
    }

    #[test]
    fn test_is_stale() {
        let max_age = Duration::minutes(60);
        assert!(CacheStore::is_stale(Utc::now() - Duration::minutes(61), max_age));
        assert!(!CacheStore::is_stale(Utc::now() - Duration::minutes(59), max_age));
    }

    #[test]
    fn test_captured_at_is_recent() {
        let (_dir, store) = store();
        let before = Utc::now();
        store.write("10001", None, &"x").unwrap();

        let captured = store.captured_at("10001", None).unwrap();
        assert!(captured >= before);
        assert!(!store.needs_refresh("10001", Duration::minutes(60)));
        assert!(store.needs_refresh("10002", Duration::minutes(60)));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_dir, store) = store();
        store.write("10001", Some(1403), &"x").unwrap();

        store.clear("10001", Some(1403)).unwrap();
        store.clear("10001", Some(1403)).unwrap();
        store.clear("never-written", None).unwrap();
        assert!(store.read::<String>("10001", Some(1403)).is_none());
    }

    #[test]
    fn test_query_entity_detail() {
        let (_dir, store) = store();
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
        store.save_account_snapshot("10001", &snapshot).unwrap();
        store.save_entity_detail("10001", &sample_detail(1403)).unwrap();

        let detail = store.query_entity_detail("10001", " 忌 炎 ").unwrap();
        assert_eq!(detail.entity_id, 1403);
        assert_eq!(store.query_entity_detail("10001", "1403").unwrap(), detail);
        assert_eq!(
            store.query_entity_detail("10001", "白芷"),
            Err(QueryError::NotCached { user_id: "10001".to_string(), entity_id: 1202 })
        );
        assert_eq!(
            store.query_entity_detail("10001", "不存在"),
            Err(QueryError::UnknownEntity("不存在".to_string()))
        );
        assert_eq!(store.query_entity_list("10001").unwrap(), snapshot.entities);
    }

    #[test]
    fn test_query_entity_list_without_cache() {
        let (_dir, store) = store();
        assert_eq!(
            store.query_entity_list("10001"),
            Err(QueryError::NoCachedList("10001".to_string()))
        );
    }
}
