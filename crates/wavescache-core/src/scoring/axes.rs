//! Per-axis scoring formulas. Every function returns a value in `[0, 100]`.

use crate::models::{EntityDetail, ACCESSORY_SLOTS, UNLOCK_RANKS};

/// Level cap shared by characters and gear.
const MAX_LEVEL: f64 = 90.0;

/// Highest meaningful average skill rank.
const MAX_SKILL_RANK: f64 = 10.0;

/// Below this rarity, unlock ranks do not count.
const UNLOCK_RARITY_THRESHOLD: i32 = 5;

fn clamp(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

fn level_ratio(level: i32) -> f64 {
    (level as f64 / MAX_LEVEL).clamp(0.0, 1.0)
}

pub fn level_score(level: i32, ascension_tier: i32) -> f64 {
    let bonus = match ascension_tier {
        t if t >= 6 => 10.0,
        5 => 7.5,
        4 => 5.0,
        3 => 2.5,
        _ => 0.0,
    };
    clamp(level_ratio(level) * 90.0 + bonus)
}

pub fn unlock_score(unlocked_count: usize, rarity_tier: i32) -> f64 {
    if rarity_tier < UNLOCK_RARITY_THRESHOLD {
        return 0.0;
    }
    clamp(unlocked_count as f64 / UNLOCK_RANKS as f64 * 100.0)
}

pub fn gear_score(gear_level: i32, ascension_tier: i32) -> f64 {
    let bonus = match ascension_tier {
        t if t >= 5 => 10.0,
        4 => 5.0,
        3 => 2.5,
        _ => 0.0,
    };
    clamp(level_ratio(gear_level) * 90.0 + bonus)
}

/// `qualities` holds one entry per equipped accessory.
pub fn accessory_score(qualities: &[i32]) -> f64 {
    if qualities.is_empty() {
        return 0.0;
    }

    let base = qualities.len() as f64 / ACCESSORY_SLOTS as f64 * 70.0;
    let avg_quality = qualities.iter().map(|&q| q as f64).sum::<f64>() / qualities.len() as f64;
    let quality_bonus = if avg_quality >= 5.0 {
        20.0
    } else if avg_quality >= 4.0 {
        15.0
    } else if avg_quality >= 3.0 {
        10.0
    } else {
        0.0
    };
    clamp(base + quality_bonus)
}

/// `levels` are stored skill levels, 1-indexed.
pub fn skill_score(levels: &[i32]) -> f64 {
    if levels.is_empty() {
        return 0.0;
    }
    let total: i64 = levels.iter().map(|&l| i64::from(l) - 1).sum();
    let avg_rank = total as f64 / levels.len() as f64;
    clamp(avg_rank / MAX_SKILL_RANK * 100.0)
}

pub(super) fn score_axes(detail: &EntityDetail) -> super::AxisScores {
    let qualities: Vec<i32> = detail.equipped_accessories().map(|a| a.quality).collect();
    let skill_levels: Vec<i32> = detail.skills.iter().map(|s| s.level).collect();

    super::AxisScores {
        level: level_score(detail.level, detail.ascension_tier),
        unlock: unlock_score(detail.unlocked_count(), detail.rarity_tier),
        gear: gear_score(detail.gear.level, detail.gear.ascension_tier),
        accessory: accessory_score(&qualities),
        skill: skill_score(&skill_levels),
    }
}
