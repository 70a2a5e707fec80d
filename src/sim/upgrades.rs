use super::catalog::UpgradeDefinition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeState {
    pub id: String,
    pub name: String,
    pub description: String,
    pub multiplier: f64,
    pub base_cost: u64,
    pub level: u32,
    pub max_level: u32,
}

impl UpgradeState {
    pub fn seed(definition: &UpgradeDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            name: definition.name.clone(),
            description: definition.description.clone(),
            multiplier: definition.multiplier,
            base_cost: definition.base_cost,
            level: 0,
            max_level: definition.max_level,
        }
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    /// Additive bonus this upgrade contributes at its current level.
    pub fn bonus(&self) -> f64 {
        self.multiplier * self.level as f64
    }
}
