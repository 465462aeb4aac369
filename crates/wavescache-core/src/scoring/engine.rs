use std::sync::Arc;

use tracing::{debug, info, warn};

use super::axes::score_axes;
use super::{rank_scores, round2, Axis, ScoreBreakdown, ScoreSummary, ScoreWeights, ScoringError};
use crate::cache::CacheStore;
use crate::models::EntityDetail;

/// Read-only scorer over the cache.
pub struct ScoringEngine {
    cache: Arc<CacheStore>,
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(cache: Arc<CacheStore>, weights: ScoreWeights) -> Self {
        Self { cache, weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score a single entity detail. Pure; never touches the cache.
    pub fn score_entity(&self, detail: &EntityDetail) -> ScoreBreakdown {
        let axes = score_axes(detail);

        let weighted: f64 = Axis::ALL
            .iter()
            .map(|&axis| axes.get(axis) * self.weights.weight(axis))
            .sum();
        let composite = round2((weighted / 100.0).clamp(0.0, 100.0));

        ScoreBreakdown {
            entity_id: detail.entity_id,
            name: detail.name.clone(),
            level: detail.level,
            unlocked_count: detail.unlocked_count(),
            gear_level: detail.gear.level,
            accessory_count: detail.equipped_count(),
            skill_total: detail.skill_total(),
            axes: axes.rounded(),
            composite,
        }
    }

    /// Score every cached entity of a user, best first.
    ///
    /// Entities are visited in cached list order, which is also the tie order.
    pub fn score_user(&self, user_id: &str) -> Result<Vec<ScoreBreakdown>, ScoringError> {
        let entities = self
            .cache
            .cached_entity_list(user_id)
            .ok_or_else(|| ScoringError::NoCachedData(user_id.to_string()))?;

        let mut scores = Vec::with_capacity(entities.len());
        for entity in &entities {
            match self.cache.load_entity_detail(user_id, entity.entity_id) {
                Some(mut detail) => {
                    if detail.name.is_empty() {
                        detail.name = entity.name.clone();
                    }
                    scores.push(self.score_entity(&detail));
                }
                None => {
                    debug!(user_id = user_id, entity_id = entity.entity_id, "No cached detail, skipping");
                }
            }
        }

        if scores.is_empty() {
            warn!(user_id = user_id, listed = entities.len(), "No entity detail could be scored");
            return Err(ScoringError::NoCachedData(user_id.to_string()));
        }

        info!(user_id = user_id, scored = scores.len(), "Scored cached entities");
        Ok(rank_scores(scores))
    }

    /// Top `top_n` entities by composite score.
    pub fn rank(&self, user_id: &str, top_n: usize) -> Result<Vec<ScoreBreakdown>, ScoringError> {
        let mut ranked = self.score_user(user_id)?;
        ranked.truncate(top_n);
        Ok(ranked)
    }

    pub fn summarize(&self, user_id: &str) -> Result<ScoreSummary, ScoringError> {
        let ranked = self.score_user(user_id)?;
        ScoreSummary::from_ranked(&ranked).ok_or_else(|| ScoringError::NoCachedData(user_id.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
