use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

pub const BASIC: &str = "basic";
pub const SILVER: &str = "silver";
pub const GOLD: &str = "gold";
pub const PLATINUM: &str = "platinum";
pub const DIAMOND: &str = "diamond";
pub const GOLDEN_TOUCH: &str = "golden_touch";

/// Static definition of one kind of coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinType {
    pub id: String,
    pub name: String,
    /// Currency paid per completed flip before upgrades.
    pub base_value: u64,
    /// Price of the first unit.
    pub base_cost: u64,
    /// Animation length; the economy never reads it.
    pub flip_duration_ms: u64,
}

/// Template used to seed an upgrade at level zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub multiplier: f64,
    pub base_cost: u64,
    pub max_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Display order is the order of this list.
    pub coin_types: Vec<CoinType>,
    pub upgrades: Vec<UpgradeDefinition>,
    pub coin_cost_multiplier: f64,
    pub upgrade_cost_multiplier: f64,
    /// One-time auto-clicker prices keyed by coin type id.
    pub auto_clicker_costs: BTreeMap<String, u64>,
    #[serde(default)]
    pub starting_money: u64,
    #[serde(default = "default_starting_coins")]
    pub starting_coins: Vec<String>,
}

fn default_starting_coins() -> Vec<String> {
    vec![BASIC.to_string()]
}

impl Default for Catalog {
    fn default() -> Self {
        let coin_types = vec![
            coin_type(BASIC, "Bronze Coin", 1, 6, 1_200),
            coin_type(SILVER, "Silver Coin", 5, 35, 1_100),
            coin_type(GOLD, "Gold Coin", 25, 200, 1_000),
            coin_type(PLATINUM, "Platinum Coin", 100, 1_000, 900),
            coin_type(DIAMOND, "Diamond Coin", 400, 5_000, 800),
        ];
        let auto_clicker_costs = [
            (BASIC, 600),
            (SILVER, 800),
            (GOLD, 5_000),
            (PLATINUM, 25_000),
            (DIAMOND, 125_000),
        ]
        .into_iter()
        .map(|(id, cost)| (id.to_string(), cost))
        .collect();

        Self {
            coin_types,
            upgrades: vec![UpgradeDefinition {
                id: GOLDEN_TOUCH.to_string(),
                name: "Golden Touch".to_string(),
                description: "Increases earnings per flip by 25%".to_string(),
                multiplier: 0.25,
                base_cost: 15,
                max_level: 10,
            }],
            coin_cost_multiplier: 1.2,
            upgrade_cost_multiplier: 1.4,
            auto_clicker_costs,
            starting_money: 0,
            starting_coins: default_starting_coins(),
        }
    }
}

fn coin_type(id: &str, name: &str, base_value: u64, base_cost: u64, flip_ms: u64) -> CoinType {
    CoinType {
        id: id.to_string(),
        name: name.to_string(),
        base_value,
        base_cost,
        flip_duration_ms: flip_ms,
    }
}

impl Catalog {
    pub fn coin_type(&self, type_id: &str) -> Option<&CoinType> {
        self.coin_types.iter().find(|coin| coin.id == type_id)
    }

    pub fn contains_coin_type(&self, type_id: &str) -> bool {
        self.coin_type(type_id).is_some()
    }

    pub fn upgrade(&self, upgrade_id: &str) -> Option<&UpgradeDefinition> {
        self.upgrades.iter().find(|upgrade| upgrade.id == upgrade_id)
    }

    pub fn auto_clicker_cost(&self, type_id: &str) -> Option<u64> {
        self.auto_clicker_costs.get(type_id).copied()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.coin_types.iter().map(|coin| coin.id.as_str())
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.coin_types.is_empty() {
            return Err(CatalogError::NoCoinTypes);
        }

        let mut seen = HashSet::new();
        for coin in &self.coin_types {
            if !seen.insert(coin.id.as_str()) {
                return Err(CatalogError::DuplicateCoinType(coin.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for upgrade in &self.upgrades {
            if !seen.insert(upgrade.id.as_str()) {
                return Err(CatalogError::DuplicateUpgrade(upgrade.id.clone()));
            }
            if !upgrade.multiplier.is_finite() || upgrade.multiplier < 0.0 {
                return Err(CatalogError::InvalidUpgradeMultiplier {
                    id: upgrade.id.clone(),
                    multiplier: upgrade.multiplier,
                });
            }
        }

        for (name, value) in [
            ("coin_cost_multiplier", self.coin_cost_multiplier),
            ("upgrade_cost_multiplier", self.upgrade_cost_multiplier),
        ] {
            if !value.is_finite() || value < 1.0 {
                return Err(CatalogError::InvalidCostMultiplier { name, value });
            }
        }

        for type_id in self.auto_clicker_costs.keys() {
            if !self.contains_coin_type(type_id) {
                return Err(CatalogError::UnknownAutoClickerType(type_id.clone()));
            }
        }

        for type_id in &self.starting_coins {
            if !self.contains_coin_type(type_id) {
                return Err(CatalogError::UnknownStartingCoin(type_id.clone()));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog defines no coin types")]
    NoCoinTypes,
    #[error("coin type {0} is defined twice")]
    DuplicateCoinType(String),
    #[error("upgrade {0} is defined twice")]
    DuplicateUpgrade(String),
    #[error("upgrade {id} has invalid multiplier {multiplier}")]
    InvalidUpgradeMultiplier { id: String, multiplier: f64 },
    #[error("{name} must be a finite value >= 1.0 (got {value})")]
    InvalidCostMultiplier { name: &'static str, value: f64 },
    #[error("auto-clicker priced for unknown coin type {0}")]
    UnknownAutoClickerType(String),
    #[error("starting coin references unknown coin type {0}")]
    UnknownStartingCoin(String),
}
