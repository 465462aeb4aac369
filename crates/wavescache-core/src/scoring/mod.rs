//! Readiness scoring for cached entities.
//!
//! Each entity is scored on five axes, every one normalized to `[0, 100]`:
//!
//! - `Level`: character level and ascension tier
//! - `Unlock`: unlocked rank count (rarity 5 and up only)
//! - `Gear`: equipped gear level and ascension tier
//! - `Accessory`: equipped accessory count and average quality
//! - `Skill`: average skill rank
//!
//! The composite is the weighted mean of the axes under `ScoreWeights`.

pub mod axes;
pub mod engine;
pub mod weights;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::ScoringEngine;
pub use weights::{ScoreWeights, WeightError, WeightTable};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("No cached entity data for user {0}")]
    NoCachedData(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Level,
    Unlock,
    Gear,
    Accessory,
    Skill,
}

impl Axis {
    pub const ALL: [Axis; 5] = [Axis::Level, Axis::Unlock, Axis::Gear, Axis::Accessory, Axis::Skill];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::Level => "level",
            Axis::Unlock => "unlock",
            Axis::Gear => "gear",
            Axis::Accessory => "accessory",
            Axis::Skill => "skill",
        }
    }
}

/// Per-axis scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScores {
    pub level: f64,
    pub unlock: f64,
    pub gear: f64,
    pub accessory: f64,
    pub skill: f64,
}

impl AxisScores {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Level => self.level,
            Axis::Unlock => self.unlock,
            Axis::Gear => self.gear,
            Axis::Accessory => self.accessory,
            Axis::Skill => self.skill,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        Axis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }

    fn rounded(&self) -> Self {
        Self {
            level: round2(self.level),
            unlock: round2(self.unlock),
            gear: round2(self.gear),
            accessory: round2(self.accessory),
            skill: round2(self.skill),
        }
    }
}

/// Score of one entity, derived from its latest cached detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub entity_id: i64,
    pub name: String,
    pub level: i32,
    pub unlocked_count: usize,
    pub gear_level: i32,
    pub accessory_count: usize,
    pub skill_total: i64,
    pub axes: AxisScores,
    pub composite: f64,
}

/// Aggregate statistics over a user's scored entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub average: f64,
    /// Composite >= 80
    pub high: usize,
    /// 60 <= composite < 80
    pub mid: usize,
    /// Composite < 60
    pub low: usize,
    pub best: ScoreBreakdown,
    pub worst: ScoreBreakdown,
}

impl ScoreSummary {
    pub const HIGH_THRESHOLD: f64 = 80.0;
    pub const MID_THRESHOLD: f64 = 60.0;

    /// Summarize scores already ranked best-first. `None` for an empty slice.
    pub fn from_ranked(ranked: &[ScoreBreakdown]) -> Option<Self> {
        let best = ranked.first()?.clone();
        let worst = ranked.last()?.clone();

        let total: f64 = ranked.iter().map(|s| s.composite).sum();
        let high = ranked.iter().filter(|s| s.composite >= Self::HIGH_THRESHOLD).count();
        let mid = ranked
            .iter()
            .filter(|s| s.composite >= Self::MID_THRESHOLD && s.composite < Self::HIGH_THRESHOLD)
            .count();

        Some(Self {
            count: ranked.len(),
            average: round2(total / ranked.len() as f64),
            high,
            mid,
            low: ranked.len() - high - mid,
            best,
            worst,
        })
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Order scores by composite, best first. Ties keep their input order.
pub fn rank_scores(mut scores: Vec<ScoreBreakdown>) -> Vec<ScoreBreakdown> {
    scores.sort_by(|a, b| b.composite.total_cmp(&a.composite));
    scores
}
