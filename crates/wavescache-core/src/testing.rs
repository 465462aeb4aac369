//! Fixtures and in-memory fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{RemoteAccountClient, RemoteError};
use crate::auth::CredentialStore;
use crate::catalog;
use crate::models::{
    Accessory, BoundAccount, EntityDetail, EntitySummary, Gear, Skill, UnlockRank, ACCESSORY_SLOTS,
    UNLOCK_RANKS,
};
use crate::refresh::Pacer;

pub fn summary(entity_id: i64, name: &str) -> EntitySummary {
    EntitySummary {
        entity_id,
        name: name.to_string(),
        level: 80,
        rarity_tier: 5,
    }
}

/// Level 80 at ascension 5, rarity 5, 2 of 6 ranks unlocked, gear 90 at
/// ascension 5, one quality-5 accessory, skill levels `[5, 10, 10, 9, 8, 1]`.
pub fn sample_detail(entity_id: i64) -> EntityDetail {
    let skills = [
        ("常态攻击", 5),
        ("共鸣技能", 10),
        ("共鸣回路", 10),
        ("共鸣解放", 9),
        ("变奏技能", 8),
        ("延奏技能", 1),
    ];

    let mut accessories = vec![None; ACCESSORY_SLOTS];
    accessories[0] = Some(Accessory {
        quality: 5,
        cost: 4,
        level: 15,
    });

    EntityDetail {
        entity_id,
        name: catalog::builtin_name(entity_id).unwrap_or("测试角色").to_string(),
        level: 80,
        ascension_tier: 5,
        rarity_tier: 5,
        unlock_rank_list: (1..=UNLOCK_RANKS as i32)
            .map(|order| UnlockRank { order, unlocked: order <= 2 })
            .collect(),
        gear: Gear {
            id: 1001,
            name: "千古洵游".to_string(),
            level: 90,
            ascension_tier: 5,
            refinement_tier: 5,
        },
        accessories,
        skills: skills
            .iter()
            .map(|&(category, level)| Skill {
                category: category.to_string(),
                level,
            })
            .collect(),
    }
}

pub fn sample_detail_with(entity_id: i64, edit: impl FnOnce(&mut EntityDetail)) -> EntityDetail {
    let mut detail = sample_detail(entity_id);
    edit(&mut detail);
    detail
}

// ===== Remote =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Verify,
    ResolveAccount,
    ListEntities,
    ServerRefresh,
    FetchDetail(i64),
}

/// Remote client answering from a fixed script. Detail fetches return
/// `sample_detail(id)` unless a failure is scripted for that id.
pub struct ScriptedRemote {
    account_id: String,
    entities: Vec<EntitySummary>,
    verify_error: Option<RemoteError>,
    resolve_error: Option<RemoteError>,
    list_error: Option<RemoteError>,
    refresh_error: Option<RemoteError>,
    detail_errors: HashMap<i64, RemoteError>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl ScriptedRemote {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            entities: Vec::new(),
            verify_error: None,
            resolve_error: None,
            list_error: None,
            refresh_error: None,
            detail_errors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_entities(mut self, entities: Vec<EntitySummary>) -> Self {
        self.entities = entities;
        self
    }

    pub fn fail_verify(mut self, error: RemoteError) -> Self {
        self.verify_error = Some(error);
        self
    }

    pub fn fail_resolve(mut self, error: RemoteError) -> Self {
        self.resolve_error = Some(error);
        self
    }

    pub fn fail_list(mut self, error: RemoteError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn fail_server_refresh(mut self, error: RemoteError) -> Self {
        self.refresh_error = Some(error);
        self
    }

    pub fn fail_detail(mut self, entity_id: i64, error: RemoteError) -> Self {
        self.detail_errors.insert(entity_id, error);
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn scripted(error: &Option<RemoteError>) -> Result<(), RemoteError> {
        match error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteAccountClient for ScriptedRemote {
    async fn verify(&self, _credential: &str) -> Result<(), RemoteError> {
        self.record(RemoteCall::Verify);
        Self::scripted(&self.verify_error)
    }

    async fn resolve_account(&self, _credential: &str) -> Result<String, RemoteError> {
        self.record(RemoteCall::ResolveAccount);
        Self::scripted(&self.resolve_error)?;
        Ok(self.account_id.clone())
    }

    async fn list_entities(
        &self,
        _account_id: &str,
        _credential: &str,
    ) -> Result<Vec<EntitySummary>, RemoteError> {
        self.record(RemoteCall::ListEntities);
        Self::scripted(&self.list_error)?;
        Ok(self.entities.clone())
    }

    async fn server_refresh(&self, _account_id: &str, _credential: &str) -> Result<(), RemoteError> {
        self.record(RemoteCall::ServerRefresh);
        Self::scripted(&self.refresh_error)
    }

    async fn fetch_entity_detail(
        &self,
        _account_id: &str,
        entity_id: i64,
        _credential: &str,
    ) -> Result<EntityDetail, RemoteError> {
        self.record(RemoteCall::FetchDetail(entity_id));
        match self.detail_errors.get(&entity_id) {
            Some(e) => Err(e.clone()),
            None => Ok(sample_detail(entity_id)),
        }
    }
}

// ===== Credentials =====

#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: Mutex<HashMap<String, BoundAccount>>,
}

impl MemoryCredentialStore {
    pub fn with_account(user_id: &str, external_account_id: &str, credential: &str) -> Self {
        let store = Self::default();
        store.accounts.lock().unwrap().insert(
            user_id.to_string(),
            BoundAccount::new(user_id, external_account_id, credential),
        );
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, user_id: &str) -> anyhow::Result<Option<BoundAccount>> {
        Ok(self.accounts.lock().unwrap().get(user_id).cloned())
    }
}

// ===== Pacing =====

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}
