//! Wire-format types for the remote account service.
//!
//! Every response is wrapped in an `Envelope`; payload records are internal
//! only and converted into `crate::models` types before leaving this module.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use super::error::{RemoteError, SUCCESS_CODE};
use crate::models::{
    Accessory, EntityDetail, EntitySummary, Gear, ModelError, Skill, UnlockRank,
};

fn missing_code() -> i64 {
    -1
}

/// Uniform `{code, data, message}` response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default = "missing_code")]
    pub code: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default, alias = "msg")]
    pub message: String,
}

impl Envelope {
    fn check(&self) -> Result<(), RemoteError> {
        if self.code == SUCCESS_CODE {
            Ok(())
        } else {
            Err(RemoteError::Application {
                code: self.code,
                message: self.message.clone(),
            })
        }
    }

    /// Succeed on code 0, ignoring the payload.
    pub fn into_unit(self) -> Result<(), RemoteError> {
        self.check()
    }

    /// Like `into_data`, but a null payload decodes as `T::default()`.
    pub fn into_data_or_default<T: DeserializeOwned + Default>(self) -> Result<T, RemoteError> {
        if self.data.is_null() {
            self.check()?;
            return Ok(T::default());
        }
        self.into_data()
    }

    /// Succeed on code 0 and decode the payload as `T`.
    ///
    /// The service sometimes sends `data` as a JSON-encoded string; such
    /// strings are decoded once more before typed parsing.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, RemoteError> {
        self.check()?;

        let data = match self.data {
            Value::String(s) if !s.is_empty() => {
                serde_json::from_str(&s).unwrap_or(Value::String(s))
            }
            Value::Null => {
                return Err(RemoteError::InvalidResponse("response has no data".to_string()))
            }
            other => other,
        };

        serde_json::from_value(data).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
    }
}

/// Ids arrive as either numbers or strings depending on the endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Int(i64),
    Str(String),
}

impl WireId {
    pub fn as_string(&self) -> String {
        match self {
            WireId::Int(i) => i.to_string(),
            WireId::Str(s) => s.clone(),
        }
    }
}

// ===== Account resolution =====

#[derive(Debug, Deserialize)]
pub(crate) struct BaseInfoData {
    #[serde(rename = "roleBoxBaseData", default)]
    pub base_data: Vec<BaseRole>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BaseRole {
    #[serde(rename = "roleId")]
    pub role_id: Option<WireId>,
}

impl BaseInfoData {
    /// First usable account id, if any.
    pub fn account_id(&self) -> Option<String> {
        self.base_data
            .first()
            .and_then(|b| b.role_id.as_ref())
            .map(WireId::as_string)
            .filter(|id| !id.is_empty() && id != "0")
    }
}

// ===== Entity list =====

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoleListData {
    #[serde(rename = "roleList", default)]
    pub role_list: Vec<RoleListItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleListItem {
    #[serde(rename = "roleId")]
    pub role_id: i64,
    #[serde(rename = "roleName", default)]
    pub role_name: String,
    #[serde(default)]
    pub level: i32,
    #[serde(rename = "starLevel", default)]
    pub star_level: i32,
}

impl From<RoleListItem> for EntitySummary {
    fn from(item: RoleListItem) -> Self {
        EntitySummary {
            entity_id: item.role_id,
            name: item.role_name,
            level: item.level,
            rarity_tier: item.star_level,
        }
    }
}

// ===== Entity detail =====

#[derive(Debug, Deserialize)]
pub(crate) struct RoleDetailWire {
    role: RoleWire,
    level: i32,
    #[serde(rename = "chainList", default)]
    chain_list: Vec<ChainWire>,
    #[serde(rename = "weaponData")]
    weapon_data: WeaponDataWire,
    #[serde(rename = "phantomData", default)]
    phantom_data: Option<PhantomDataWire>,
    #[serde(rename = "skillList", default)]
    skill_list: Vec<SkillEntryWire>,
}

#[derive(Debug, Deserialize)]
struct RoleWire {
    #[serde(rename = "roleId")]
    role_id: i64,
    #[serde(rename = "roleName", default)]
    role_name: String,
    #[serde(rename = "starLevel", default)]
    star_level: i32,
    #[serde(default)]
    breach: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ChainWire {
    order: i32,
    #[serde(default)]
    unlocked: bool,
}

#[derive(Debug, Deserialize)]
struct WeaponDataWire {
    weapon: WeaponWire,
    level: i32,
    #[serde(default)]
    breach: Option<i32>,
    #[serde(rename = "resonLevel", default)]
    reson_level: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct WeaponWire {
    #[serde(rename = "weaponId")]
    weapon_id: i64,
    #[serde(rename = "weaponName", default)]
    weapon_name: String,
}

#[derive(Debug, Deserialize)]
struct PhantomDataWire {
    #[serde(rename = "equipPhantomList", default)]
    equip_phantom_list: Option<Vec<Option<PhantomWire>>>,
}

#[derive(Debug, Deserialize)]
struct PhantomWire {
    #[serde(default)]
    quality: i32,
    #[serde(default)]
    cost: i32,
    #[serde(default)]
    level: i32,
}

#[derive(Debug, Deserialize)]
struct SkillEntryWire {
    #[serde(default)]
    skill: Option<SkillWire>,
    level: i32,
}

#[derive(Debug, Deserialize)]
struct SkillWire {
    #[serde(rename = "type", default)]
    kind: String,
}

impl RoleDetailWire {
    /// Convert into the domain record, enforcing its structural invariants.
    pub fn into_detail(self) -> Result<EntityDetail, ModelError> {
        let accessories = self
            .phantom_data
            .and_then(|p| p.equip_phantom_list)
            .unwrap_or_default()
            .into_iter()
            .map(|slot| {
                slot.map(|p| Accessory {
                    quality: p.quality,
                    cost: p.cost,
                    level: p.level,
                })
            })
            .collect();

        let detail = EntityDetail {
            entity_id: self.role.role_id,
            name: self.role.role_name,
            level: self.level,
            ascension_tier: self.role.breach.unwrap_or(0),
            rarity_tier: self.role.star_level,
            unlock_rank_list: self
                .chain_list
                .into_iter()
                .map(|c| UnlockRank { order: c.order, unlocked: c.unlocked })
                .collect(),
            gear: Gear {
                id: self.weapon_data.weapon.weapon_id,
                name: self.weapon_data.weapon.weapon_name,
                level: self.weapon_data.level,
                ascension_tier: self.weapon_data.breach.unwrap_or(0),
                refinement_tier: self.weapon_data.reson_level.unwrap_or(0),
            },
            accessories,
            skills: self
                .skill_list
                .into_iter()
                .map(|s| Skill {
                    category: s.skill.map(|k| k.kind).unwrap_or_default(),
                    level: s.level,
                })
                .collect(),
        };

        detail.validate()?;
        Ok(detail)
    }
}
