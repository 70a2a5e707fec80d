use super::catalog::{Catalog, CatalogError};
use super::coins::{CoinId, CoinInstance, Position};
use super::economy;
use super::upgrades::UpgradeState;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    pub money: u64,
    /// Creation order.
    pub coins: Vec<CoinInstance>,
    pub upgrades: Vec<UpgradeState>,
    /// Presence means purchased; the value is the enabled flag.
    pub auto_clickers: BTreeMap<String, bool>,
    pub next_coin_id: u64,
}

impl EconomyState {
    pub fn fresh(catalog: &Catalog, rng: &mut StdRng) -> Self {
        let mut state = Self {
            money: catalog.starting_money,
            coins: Vec::with_capacity(catalog.starting_coins.len()),
            upgrades: catalog.upgrades.iter().map(UpgradeState::seed).collect(),
            auto_clickers: BTreeMap::new(),
            next_coin_id: 1,
        };
        for type_id in &catalog.starting_coins {
            state.push_coin(type_id, Position::random(rng));
        }
        state
    }

    pub fn owned_count(&self, type_id: &str) -> usize {
        self.coins.iter().filter(|coin| coin.type_id == type_id).count()
    }

    fn push_coin(&mut self, type_id: &str, position: Position) -> CoinId {
        let id = CoinId(self.next_coin_id);
        self.next_coin_id += 1;
        self.coins.push(CoinInstance::new(id, type_id, position));
        id
    }

    fn coin_mut(&mut self, coin_id: CoinId) -> Option<&mut CoinInstance> {
        self.coins.iter_mut().find(|coin| coin.id == coin_id)
    }

    fn debit(&mut self, cost: u64) -> Result<(), PurchaseError> {
        if self.money < cost {
            return Err(PurchaseError::InsufficientFunds {
                cost,
                available: self.money,
            });
        }
        self.money -= cost;
        Ok(())
    }
}

/// One row of the coin shop as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEntry {
    pub type_id: String,
    pub name: String,
    pub base_value: u64,
    pub owned: usize,
    pub coin_cost: u64,
    pub can_afford_coin: bool,
    pub auto_clicker_cost: Option<u64>,
    pub auto_clicker_owned: bool,
    pub auto_clicker_enabled: bool,
    pub can_afford_auto_clicker: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub max_level: u32,
    /// `None` once the upgrade is maxed out.
    pub cost: Option<u64>,
    pub can_afford: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purchase {
    Coin(String),
    Upgrade(String),
    AutoClicker(String),
}

/// A single game session: the catalog it was built from plus the state it
/// mutates. Every command takes `&mut self`, so each one is applied whole.
pub struct Economy {
    catalog: Arc<Catalog>,
    state: EconomyState,
    rng: StdRng,
}

impl Economy {
    pub fn fresh(catalog: Arc<Catalog>) -> Result<Self, CatalogError> {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    pub fn seeded(catalog: Arc<Catalog>, seed: u64) -> Result<Self, CatalogError> {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<Catalog>, mut rng: StdRng) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let state = EconomyState::fresh(&catalog, &mut rng);
        Ok(Self {
            catalog,
            state,
            rng,
        })
    }

    /// Rebuild a session from a snapshot, refusing anything that breaks the
    /// state invariants for `catalog`.
    pub fn restore(catalog: Arc<Catalog>, state: EconomyState) -> Result<Self, RestoreError> {
        catalog.validate()?;
        let mut ids = HashSet::new();
        for coin in &state.coins {
            if !catalog.contains_coin_type(&coin.type_id) {
                return Err(RestoreError::UnknownCoinType(coin.type_id.clone()));
            }
            if !ids.insert(coin.id) {
                return Err(RestoreError::DuplicateCoinId(coin.id));
            }
            if coin.id.0 >= state.next_coin_id {
                return Err(RestoreError::CoinIdAhead(coin.id));
            }
        }
        let mut upgrade_ids = HashSet::new();
        for upgrade in &state.upgrades {
            let definition = catalog
                .upgrade(&upgrade.id)
                .ok_or_else(|| RestoreError::UnknownUpgrade(upgrade.id.clone()))?;
            if !upgrade_ids.insert(upgrade.id.as_str()) {
                return Err(RestoreError::DuplicateUpgrade(upgrade.id.clone()));
            }
            if upgrade.multiplier != definition.multiplier
                || upgrade.base_cost != definition.base_cost
                || upgrade.max_level != definition.max_level
            {
                return Err(RestoreError::UpgradeMismatch(upgrade.id.clone()));
            }
            if upgrade.level > upgrade.max_level {
                return Err(RestoreError::UpgradeLevelOutOfRange {
                    id: upgrade.id.clone(),
                    level: upgrade.level,
                    max_level: upgrade.max_level,
                });
            }
        }
        for type_id in state.auto_clickers.keys() {
            if !catalog.contains_coin_type(type_id) {
                return Err(RestoreError::UnknownAutoClicker(type_id.clone()));
            }
        }
        if let Some(missing) = catalog
            .upgrades
            .iter()
            .find(|definition| !upgrade_ids.contains(definition.id.as_str()))
        {
            return Err(RestoreError::MissingUpgrade(missing.id.clone()));
        }
        Ok(Self {
            catalog,
            state,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn snapshot(&self) -> EconomyState {
        self.state.clone()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn money(&self) -> u64 {
        self.state.money
    }

    pub fn coins(&self) -> &[CoinInstance] {
        &self.state.coins
    }

    pub fn coin(&self, coin_id: CoinId) -> Option<&CoinInstance> {
        self.state.coins.iter().find(|coin| coin.id == coin_id)
    }

    pub fn upgrades(&self) -> &[UpgradeState] {
        &self.state.upgrades
    }

    pub fn auto_clickers(&self) -> &BTreeMap<String, bool> {
        &self.state.auto_clickers
    }

    pub fn owned_count(&self, type_id: &str) -> usize {
        self.state.owned_count(type_id)
    }

    pub fn earnings_per_flip(&self, type_id: &str) -> u64 {
        economy::earnings_per_flip(&self.catalog, type_id, &self.state.upgrades)
    }

    pub fn coin_cost(&self, type_id: &str) -> Option<u64> {
        economy::coin_cost(&self.catalog, type_id, self.state.owned_count(type_id))
    }

    pub fn upgrade_cost(&self, upgrade_id: &str) -> Option<u64> {
        let upgrade = self.state.upgrades.iter().find(|u| u.id == upgrade_id)?;
        Some(economy::upgrade_cost(&self.catalog, upgrade))
    }

    pub fn auto_clicker_cost(&self, type_id: &str) -> Option<u64> {
        economy::auto_clicker_cost(&self.catalog, type_id)
    }

    pub fn has_auto_clicker(&self, type_id: &str) -> bool {
        self.state.auto_clickers.contains_key(type_id)
    }

    pub fn is_auto_clicker_enabled(&self, type_id: &str) -> bool {
        self.state
            .auto_clickers
            .get(type_id)
            .copied()
            .unwrap_or(false)
    }

    /// Idle coins of one type, in creation order.
    pub fn idle_coins(&self, type_id: &str) -> Vec<CoinId> {
        self.state
            .coins
            .iter()
            .filter(|coin| coin.type_id == type_id && coin.is_idle())
            .map(|coin| coin.id)
            .collect()
    }

    pub fn flip_coin(&mut self, coin_id: CoinId) {
        if let Err(err) = self.try_flip_coin(coin_id) {
            debug!(%coin_id, %err, "flip ignored");
        }
    }

    pub fn try_flip_coin(&mut self, coin_id: CoinId) -> Result<(), ActionError> {
        let coin = self
            .state
            .coin_mut(coin_id)
            .ok_or(ActionError::UnknownCoin(coin_id))?;
        coin.start_flip();
        Ok(())
    }

    /// A player click: refused while the coin's type is on autopilot or the
    /// coin is already in the air.
    pub fn try_manual_flip(&mut self, coin_id: CoinId) -> Result<(), ActionError> {
        let coin = self.coin(coin_id).ok_or(ActionError::UnknownCoin(coin_id))?;
        if coin.is_flipping {
            return Err(ActionError::AlreadyFlipping(coin_id));
        }
        if self.is_auto_clicker_enabled(&coin.type_id) {
            return Err(ActionError::AutoClickerActive(coin.type_id.clone()));
        }
        self.try_flip_coin(coin_id)
    }

    pub fn manual_flip(&mut self, coin_id: CoinId) {
        if let Err(err) = self.try_manual_flip(coin_id) {
            debug!(%coin_id, %err, "manual flip ignored");
        }
    }

    pub fn complete_coin_flip(&mut self, coin_id: CoinId) {
        if let Err(err) = self.try_complete_coin_flip(coin_id) {
            debug!(%coin_id, %err, "flip completion ignored");
        }
    }

    /// Pays out using upgrade levels at completion time and returns the
    /// amount credited.
    pub fn try_complete_coin_flip(&mut self, coin_id: CoinId) -> Result<u64, ActionError> {
        let type_id = self
            .coin(coin_id)
            .map(|coin| coin.type_id.clone())
            .ok_or(ActionError::UnknownCoin(coin_id))?;
        let earnings = self.earnings_per_flip(&type_id);
        self.state.money = self.state.money.saturating_add(earnings);
        if let Some(coin) = self.state.coin_mut(coin_id) {
            coin.finish_flip();
        }
        Ok(earnings)
    }

    pub fn buy_coin(&mut self, type_id: &str) {
        if let Err(err) = self.try_buy_coin(type_id) {
            debug!(type_id, %err, "coin purchase rejected");
        }
    }

    pub fn try_buy_coin(&mut self, type_id: &str) -> Result<CoinId, PurchaseError> {
        let cost = self
            .coin_cost(type_id)
            .ok_or_else(|| PurchaseError::UnknownCoinType(type_id.to_string()))?;
        self.state.debit(cost)?;
        let position = Position::random(&mut self.rng);
        let id = self.state.push_coin(type_id, position);
        info!(type_id, %id, cost, "bought coin");
        Ok(id)
    }

    pub fn buy_upgrade(&mut self, upgrade_id: &str) {
        if let Err(err) = self.try_buy_upgrade(upgrade_id) {
            debug!(upgrade_id, %err, "upgrade purchase rejected");
        }
    }

    /// Returns the new level.
    pub fn try_buy_upgrade(&mut self, upgrade_id: &str) -> Result<u32, PurchaseError> {
        let index = self
            .state
            .upgrades
            .iter()
            .position(|upgrade| upgrade.id == upgrade_id)
            .ok_or_else(|| PurchaseError::UnknownUpgrade(upgrade_id.to_string()))?;
        let upgrade = &self.state.upgrades[index];
        if upgrade.is_maxed() {
            return Err(PurchaseError::UpgradeAtCap {
                id: upgrade.id.clone(),
                max_level: upgrade.max_level,
            });
        }
        let cost = economy::upgrade_cost(&self.catalog, upgrade);
        self.state.debit(cost)?;
        let upgrade = &mut self.state.upgrades[index];
        upgrade.level += 1;
        info!(upgrade_id, level = upgrade.level, cost, "bought upgrade");
        Ok(upgrade.level)
    }

    pub fn buy_auto_clicker(&mut self, type_id: &str) {
        if let Err(err) = self.try_buy_auto_clicker(type_id) {
            debug!(type_id, %err, "auto-clicker purchase rejected");
        }
    }

    pub fn try_buy_auto_clicker(&mut self, type_id: &str) -> Result<(), PurchaseError> {
        if self.has_auto_clicker(type_id) {
            return Err(PurchaseError::AutoClickerOwned(type_id.to_string()));
        }
        let cost = self
            .auto_clicker_cost(type_id)
            .ok_or_else(|| PurchaseError::UnknownCoinType(type_id.to_string()))?;
        self.state.debit(cost)?;
        self.state.auto_clickers.insert(type_id.to_string(), true);
        info!(type_id, cost, "bought auto-clicker");
        Ok(())
    }

    pub fn toggle_auto_clicker(&mut self, type_id: &str) {
        if let Err(err) = self.try_toggle_auto_clicker(type_id) {
            debug!(type_id, %err, "auto-clicker toggle ignored");
        }
    }

    /// Returns the new enabled flag.
    pub fn try_toggle_auto_clicker(&mut self, type_id: &str) -> Result<bool, ActionError> {
        let enabled = self
            .state
            .auto_clickers
            .get_mut(type_id)
            .ok_or_else(|| ActionError::AutoClickerNotOwned(type_id.to_string()))?;
        *enabled = !*enabled;
        Ok(*enabled)
    }

    /// Debug credit. Negative amounts drain money down to zero at most.
    pub fn add_money(&mut self, amount: i64) {
        let magnitude = amount.unsigned_abs();
        self.state.money = if amount >= 0 {
            self.state.money.saturating_add(magnitude)
        } else {
            self.state.money.saturating_sub(magnitude)
        };
    }

    pub fn store_entries(&self) -> Vec<StoreEntry> {
        let money = self.state.money;
        self.catalog
            .coin_types
            .iter()
            .map(|coin| {
                let owned = self.state.owned_count(&coin.id);
                let coin_cost =
                    economy::coin_cost(&self.catalog, &coin.id, owned).unwrap_or(u64::MAX);
                let auto_clicker_cost = self.auto_clicker_cost(&coin.id);
                let auto_clicker_owned = self.has_auto_clicker(&coin.id);
                StoreEntry {
                    type_id: coin.id.clone(),
                    name: coin.name.clone(),
                    base_value: coin.base_value,
                    owned,
                    coin_cost,
                    can_afford_coin: money >= coin_cost,
                    auto_clicker_cost,
                    auto_clicker_owned,
                    auto_clicker_enabled: self.is_auto_clicker_enabled(&coin.id),
                    can_afford_auto_clicker: !auto_clicker_owned
                        && auto_clicker_cost.is_some_and(|cost| money >= cost),
                }
            })
            .collect()
    }

    pub fn upgrade_entries(&self) -> Vec<UpgradeEntry> {
        self.state
            .upgrades
            .iter()
            .map(|upgrade| {
                let cost = if upgrade.is_maxed() {
                    None
                } else {
                    Some(economy::upgrade_cost(&self.catalog, upgrade))
                };
                UpgradeEntry {
                    id: upgrade.id.clone(),
                    name: upgrade.name.clone(),
                    description: upgrade.description.clone(),
                    level: upgrade.level,
                    max_level: upgrade.max_level,
                    cost,
                    can_afford: cost.is_some_and(|cost| self.state.money >= cost),
                }
            })
            .collect()
    }

    /// Cheapest purchase that money currently covers. Ties go to coins, then
    /// upgrades, then auto-clickers, in catalog order.
    pub fn cheapest_affordable(&self) -> Option<(Purchase, u64)> {
        let mut best: Option<(Purchase, u64)> = None;
        let mut consider = |purchase: Purchase, cost: u64| {
            if cost > self.state.money {
                return;
            }
            if best.as_ref().is_none_or(|(_, best_cost)| cost < *best_cost) {
                best = Some((purchase, cost));
            }
        };
        for entry in self.store_entries() {
            consider(Purchase::Coin(entry.type_id.clone()), entry.coin_cost);
        }
        for entry in self.upgrade_entries() {
            if let Some(cost) = entry.cost {
                consider(Purchase::Upgrade(entry.id), cost);
            }
        }
        for entry in self.store_entries() {
            if let (false, Some(cost)) = (entry.auto_clicker_owned, entry.auto_clicker_cost) {
                consider(Purchase::AutoClicker(entry.type_id), cost);
            }
        }
        best
    }

    pub fn purchase(&mut self, purchase: &Purchase) -> Result<(), PurchaseError> {
        match purchase {
            Purchase::Coin(type_id) => self.try_buy_coin(type_id).map(|_| ()),
            Purchase::Upgrade(upgrade_id) => self.try_buy_upgrade(upgrade_id).map(|_| ()),
            Purchase::AutoClicker(type_id) => self.try_buy_auto_clicker(type_id),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("unknown coin type {0}")]
    UnknownCoinType(String),
    #[error("unknown upgrade {0}")]
    UnknownUpgrade(String),
    #[error("not enough money (requires {cost}, have {available})")]
    InsufficientFunds { cost: u64, available: u64 },
    #[error("{id} already at maximum level {max_level}")]
    UpgradeAtCap { id: String, max_level: u32 },
    #[error("auto-clicker for {0} already purchased")]
    AutoClickerOwned(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("no coin with id {0}")]
    UnknownCoin(CoinId),
    #[error("{0} is already flipping")]
    AlreadyFlipping(CoinId),
    #[error("auto-clicker is flipping {0} coins")]
    AutoClickerActive(String),
    #[error("auto-clicker for {0} not purchased")]
    AutoClickerNotOwned(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum RestoreError {
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("coin references unknown type {0}")]
    UnknownCoinType(String),
    #[error("coin id {0} appears more than once")]
    DuplicateCoinId(CoinId),
    #[error("coin id {0} is not below the next id counter")]
    CoinIdAhead(CoinId),
    #[error("upgrade {id} level {level} exceeds max {max_level}")]
    UpgradeLevelOutOfRange {
        id: String,
        level: u32,
        max_level: u32,
    },
    #[error("upgrade {0} is not in the catalog")]
    UnknownUpgrade(String),
    #[error("upgrade {0} appears more than once")]
    DuplicateUpgrade(String),
    #[error("upgrade {0} does not match its catalog definition")]
    UpgradeMismatch(String),
    #[error("catalog upgrade {0} is missing from the snapshot")]
    MissingUpgrade(String),
    #[error("auto-clicker for unknown coin type {0}")]
    UnknownAutoClicker(String),
}
