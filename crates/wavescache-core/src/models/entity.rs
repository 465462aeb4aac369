//! Domain models for characters ("entities") and their progression.
//!
//! These types represent cached data in a clean domain format,
//! decoupled from the remote API response structures in `api::schema`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of unlock ranks ("chain") every entity has.
pub const UNLOCK_RANKS: usize = 6;

/// Number of accessory ("phantom") slots every entity has.
pub const ACCESSORY_SLOTS: usize = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unlock rank order {0} is outside 1..=6")]
    UnlockOrderOutOfRange(i32),

    #[error("Unlock rank order {0} appears more than once")]
    DuplicateUnlockOrder(i32),

    #[error("Too many unlock ranks: {0}")]
    TooManyUnlockRanks(usize),

    #[error("Too many accessory slots: {0}")]
    TooManyAccessorySlots(usize),
}

/// Listing record from the entity-list snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity_id: i64,
    pub name: String,
    pub level: i32,
    pub rarity_tier: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnlockRank {
    pub order: i32,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub level: i32,
    pub ascension_tier: i32,
    pub refinement_tier: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    pub quality: i32,
    pub cost: i32,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub category: String,
    pub level: i32,
}

/// Full progression record for one entity.
///
/// `accessories` keeps empty slots as `None` so the slot layout survives a
/// cache round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    pub entity_id: i64,
    #[serde(default)]
    pub name: String,
    pub level: i32,
    pub ascension_tier: i32,
    pub rarity_tier: i32,
    pub unlock_rank_list: Vec<UnlockRank>,
    pub gear: Gear,
    pub accessories: Vec<Option<Accessory>>,
    pub skills: Vec<Skill>,
}

impl EntityDetail {
    /// Check the structural invariants of the unlock and accessory lists.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.unlock_rank_list.len() > UNLOCK_RANKS {
            return Err(ModelError::TooManyUnlockRanks(self.unlock_rank_list.len()));
        }

        let mut seen = HashSet::new();
        for rank in &self.unlock_rank_list {
            if rank.order < 1 || rank.order > UNLOCK_RANKS as i32 {
                return Err(ModelError::UnlockOrderOutOfRange(rank.order));
            }
            if !seen.insert(rank.order) {
                return Err(ModelError::DuplicateUnlockOrder(rank.order));
            }
        }

        if self.accessories.len() > ACCESSORY_SLOTS {
            return Err(ModelError::TooManyAccessorySlots(self.accessories.len()));
        }

        Ok(())
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlock_rank_list.iter().filter(|r| r.unlocked).count()
    }

    /// Accessories in occupied slots.
    pub fn equipped_accessories(&self) -> impl Iterator<Item = &Accessory> {
        self.accessories.iter().flatten()
    }

    pub fn equipped_count(&self) -> usize {
        self.equipped_accessories().count()
    }

    /// Sum of skill ranks. Stored levels are 1-indexed, so level 1 is rank 0.
    pub fn skill_total(&self) -> i64 {
        self.skills.iter().map(|s| i64::from(s.level) - 1).sum()
    }
}
