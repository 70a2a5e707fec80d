use super::catalog::Catalog;
use super::coins::CoinId;
use super::game::{Economy, EconomyState};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to one session. Each call holds the lock for exactly one
/// command, so concurrent timers never observe a half-applied purchase or
/// lose a credit.
#[derive(Clone)]
pub struct SharedEconomy {
    inner: Arc<Mutex<Economy>>,
}

impl SharedEconomy {
    pub fn new(economy: Economy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(economy)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Economy> {
        // Commands validate before mutating, so a panicking holder cannot
        // leave a partial write behind.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run several reads or commands under one lock.
    pub fn with<R>(&self, f: impl FnOnce(&mut Economy) -> R) -> R {
        f(&mut *self.lock())
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.lock().shared_catalog()
    }

    pub fn money(&self) -> u64 {
        self.lock().money()
    }

    pub fn snapshot(&self) -> EconomyState {
        self.lock().snapshot()
    }

    pub fn flip_coin(&self, coin_id: CoinId) {
        self.lock().flip_coin(coin_id);
    }

    pub fn complete_coin_flip(&self, coin_id: CoinId) {
        self.lock().complete_coin_flip(coin_id);
    }

    pub fn buy_coin(&self, type_id: &str) {
        self.lock().buy_coin(type_id);
    }

    pub fn buy_upgrade(&self, upgrade_id: &str) {
        self.lock().buy_upgrade(upgrade_id);
    }

    pub fn buy_auto_clicker(&self, type_id: &str) {
        self.lock().buy_auto_clicker(type_id);
    }

    pub fn toggle_auto_clicker(&self, type_id: &str) {
        self.lock().toggle_auto_clicker(type_id);
    }

    pub fn add_money(&self, amount: i64) {
        self.lock().add_money(amount);
    }

    pub fn is_auto_clicker_enabled(&self, type_id: &str) -> bool {
        self.lock().is_auto_clicker_enabled(type_id)
    }

    /// Flip every idle coin of `type_id` and return the ids that started.
    pub fn flip_idle_coins(&self, type_id: &str) -> Vec<CoinId> {
        self.with(|economy| {
            let ids = economy.idle_coins(type_id);
            for id in &ids {
                economy.flip_coin(*id);
            }
            ids
        })
    }
}
