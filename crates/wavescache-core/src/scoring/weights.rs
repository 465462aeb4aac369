use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Axis;

/// Allowed deviation of the weight sum from 100.
const WEIGHT_SUM_TOLERANCE: f64 = 0.1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeightError {
    #[error("Invalid weight configuration: weights must sum to 100, got {0}")]
    BadSum(f64),

    #[error("Invalid weight configuration: {axis} weight {value} is negative or not finite")]
    BadWeight { axis: &'static str, value: f64 },
}

/// Raw weight table as it appears in configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightTable {
    pub level: f64,
    pub unlock: f64,
    pub gear: f64,
    pub accessory: f64,
    pub skill: f64,
}

/// Validated per-axis weights. Always non-negative and summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightTable")]
pub struct ScoreWeights {
    level: f64,
    unlock: f64,
    gear: f64,
    accessory: f64,
    skill: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            level: 25.0,
            unlock: 20.0,
            gear: 20.0,
            accessory: 20.0,
            skill: 15.0,
        }
    }
}

impl TryFrom<WeightTable> for ScoreWeights {
    type Error = WeightError;

    fn try_from(table: WeightTable) -> Result<Self, Self::Error> {
        let weights = Self {
            level: table.level,
            unlock: table.unlock,
            gear: table.gear,
            accessory: table.accessory,
            skill: table.skill,
        };

        for axis in Axis::ALL {
            let value = weights.weight(axis);
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::BadWeight { axis: axis.name(), value });
            }
        }

        let total = weights.total();
        if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::BadSum(total));
        }
        Ok(weights)
    }
}

impl ScoreWeights {
    pub fn new(level: f64, unlock: f64, gear: f64, accessory: f64, skill: f64) -> Result<Self, WeightError> {
        WeightTable { level, unlock, gear, accessory, skill }.try_into()
    }

    pub fn weight(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Level => self.level,
            Axis::Unlock => self.unlock,
            Axis::Gear => self.gear,
            Axis::Accessory => self.accessory,
            Axis::Skill => self.skill,
        }
    }

    pub fn total(&self) -> f64 {
        Axis::ALL.iter().map(|&axis| self.weight(axis)).sum()
    }
}
