//! Headless stand-in for the presentation layer: jittered auto-clicker
//! timers per coin type, simulated player clicks, and an optional shopper
//! that spends money as soon as something is affordable.

use crate::display::format_money;
use crate::sim::coins::CoinId;
use crate::sim::game::EconomyState;
use crate::sim::shared::SharedEconomy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info};

const MAX_INITIAL_DELAY_MS: f64 = 500.0;
const INTERVAL_PADDING_MS: u64 = 200;
const INTERVAL_JITTER: f64 = 0.3;

/// Random stagger so coin types do not all start on the same tick.
pub fn initial_delay(rng: &mut impl Rng) -> Duration {
    Duration::from_secs_f64(rng.gen_range(0.0..MAX_INITIAL_DELAY_MS) / 1_000.0)
}

/// Gap between two auto-click rounds: `flip + 200ms`, jittered by +/-15%.
pub fn auto_click_interval(flip_duration_ms: u64, rng: &mut impl Rng) -> Duration {
    let base = (flip_duration_ms + INTERVAL_PADDING_MS) as f64;
    let jitter = (rng.gen_range(0.0..1.0) - 0.5) * base * INTERVAL_JITTER;
    Duration::from_secs_f64((base + jitter) / 1_000.0)
}

/// How long one flip stays in the air: the type's duration at 0.8x-1.2x speed.
pub fn flip_time(flip_duration_ms: u64, rng: &mut impl Rng) -> Duration {
    let speed: f64 = rng.gen_range(0.8..1.2);
    Duration::from_secs_f64(flip_duration_ms as f64 * speed / 1_000.0)
}

fn make_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        None => StdRng::from_entropy(),
    }
}

/// Coins in the air. Every landing is tracked so shutdown can wait for the
/// last one to either pay out or be cancelled.
#[derive(Clone)]
pub struct Landings {
    tasks: Arc<Mutex<JoinSet<()>>>,
    shutdown: watch::Receiver<bool>,
}

impl Landings {
    fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(JoinSet::new())),
            shutdown,
        }
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Completes `coin_id` once it lands. Cancelled flips are never paid.
    pub fn schedule(&self, economy: SharedEconomy, coin_id: CoinId, airtime: Duration) {
        let mut shutdown = self.shutdown.clone();
        let mut tasks = self.tasks();
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.wait_for(|stopped| *stopped) => {
                    debug!(%coin_id, "flip cancelled before landing");
                }
                _ = tokio::time::sleep(airtime) => economy.complete_coin_flip(coin_id),
            }
        });
    }

    pub fn in_flight(&self) -> usize {
        self.tasks().len()
    }

    /// Wait for every tracked landing. Call after the shutdown signal.
    async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks());
        while tasks.join_next().await.is_some() {}
    }
}

/// One timer task per coin type, all stopped through a shared watch channel.
pub struct AutoClickers {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
    landings: Landings,
}

impl AutoClickers {
    pub fn spawn(economy: SharedEconomy, seed: Option<u64>) -> Self {
        let (shutdown, _) = watch::channel(false);
        let landings = Landings::new(shutdown.subscribe());
        let catalog = economy.catalog();
        let tasks = catalog
            .coin_types
            .iter()
            .enumerate()
            .map(|(index, coin)| {
                let economy = economy.clone();
                let type_id = coin.id.clone();
                let flip_ms = coin.flip_duration_ms;
                let rng = make_rng(seed, index as u64);
                let rx = shutdown.subscribe();
                let landings = landings.clone();
                tokio::spawn(run_auto_clicker(economy, type_id, flip_ms, rng, rx, landings))
            })
            .collect();
        Self {
            shutdown,
            tasks,
            landings,
        }
    }

    pub fn landings(&self) -> Landings {
        self.landings.clone()
    }

    /// Stops every timer, then waits for the coins still in the air, so no
    /// flip can pay out after this returns.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
        self.landings.drain().await;
    }
}

async fn run_auto_clicker(
    economy: SharedEconomy,
    type_id: String,
    flip_ms: u64,
    mut rng: StdRng,
    mut shutdown: watch::Receiver<bool>,
    landings: Landings,
) {
    let mut delay = initial_delay(&mut rng);
    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
        if economy.is_auto_clicker_enabled(&type_id) {
            for coin_id in economy.flip_idle_coins(&type_id) {
                let airtime = flip_time(flip_ms, &mut rng);
                landings.schedule(economy.clone(), coin_id, airtime);
            }
        }
        delay = auto_click_interval(flip_ms, &mut rng);
    }
    debug!(type_id = %type_id, "auto-clicker stopped");
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub duration: Duration,
    pub tick: Duration,
    /// Click every idle coin that is not on autopilot each tick.
    pub player_clicks: bool,
    pub autobuy: bool,
    pub seed: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            tick: Duration::from_secs(1),
            player_clicks: true,
            autobuy: false,
            seed: None,
        }
    }
}

/// Drive a session for `options.duration` and return its final state.
pub async fn run_session(economy: SharedEconomy, options: SessionOptions) -> EconomyState {
    let clickers = AutoClickers::spawn(economy.clone(), options.seed);
    let landings = clickers.landings();
    let mut rng = make_rng(options.seed, u64::MAX);
    let deadline = tokio::time::Instant::now() + options.duration;
    let mut ticker = tokio::time::interval(options.tick);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::time::sleep_until(deadline) => break,
        }

        if options.player_clicks {
            let launched = economy.with(|game| {
                let manual: Vec<(CoinId, u64)> = game
                    .coins()
                    .iter()
                    .filter(|coin| coin.is_idle() && !game.is_auto_clicker_enabled(&coin.type_id))
                    .filter_map(|coin| {
                        let flip_ms = game.catalog().coin_type(&coin.type_id)?.flip_duration_ms;
                        Some((coin.id, flip_ms))
                    })
                    .collect();
                manual
                    .into_iter()
                    .filter(|(coin_id, _)| game.try_manual_flip(*coin_id).is_ok())
                    .collect::<Vec<_>>()
            });
            for (coin_id, flip_ms) in launched {
                let airtime = flip_time(flip_ms, &mut rng);
                landings.schedule(economy.clone(), coin_id, airtime);
            }
        }

        if options.autobuy {
            economy.with(|game| {
                while let Some((purchase, cost)) = game.cheapest_affordable() {
                    if game.purchase(&purchase).is_err() {
                        break;
                    }
                    debug!(?purchase, cost, "autobuy");
                }
            });
        }

        let (money, coins) = economy.with(|game| (game.money(), game.coins().len()));
        info!(money = %format_money(money), coins, "economy report");
    }

    clickers.shutdown().await;
    economy.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{BASIC, Catalog};
    use crate::sim::game::Economy;

    fn shared() -> SharedEconomy {
        let economy = Economy::seeded(Arc::new(Catalog::default()), 21).expect("valid catalog");
        SharedEconomy::new(economy)
    }

    #[test]
    fn timings_stay_in_their_bands() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1_000 {
            let delay = initial_delay(&mut rng);
            assert!(delay < Duration::from_millis(500));

            let interval = auto_click_interval(1_200, &mut rng).as_secs_f64() * 1_000.0;
            assert!((1_190.0..=1_610.0).contains(&interval), "interval {interval}");

            let airtime = flip_time(1_000, &mut rng).as_secs_f64() * 1_000.0;
            assert!((800.0..=1_200.0).contains(&airtime), "airtime {airtime}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enabled_auto_clicker_earns_money() {
        let economy = shared();
        economy.add_money(600);
        economy.buy_auto_clicker(BASIC);
        assert_eq!(economy.money(), 0);

        let clickers = AutoClickers::spawn(economy.clone(), Some(3));
        tokio::time::sleep(Duration::from_secs(30)).await;
        clickers.shutdown().await;

        assert!(economy.money() >= 5, "earned {}", economy.money());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_paid_after_shutdown_returns() {
        let economy = shared();
        economy.add_money(600);
        economy.buy_auto_clicker(BASIC);

        let clickers = AutoClickers::spawn(economy.clone(), Some(11));
        let landings = clickers.landings();
        tokio::time::sleep(Duration::from_millis(10_700)).await;
        clickers.shutdown().await;
        let settled = economy.money();

        assert_eq!(landings.in_flight(), 0);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(economy.money(), settled);
    }

    #[tokio::test(start_paused = true)]
    async fn landing_cancelled_by_shutdown_is_not_paid() {
        let economy = shared();
        let clickers = AutoClickers::spawn(economy.clone(), Some(2));
        let coin_id = economy.snapshot().coins[0].id;
        economy.flip_coin(coin_id);
        clickers
            .landings()
            .schedule(economy.clone(), coin_id, Duration::from_secs(1));

        clickers.shutdown().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(economy.money(), 0);
        assert!(!economy.snapshot().coins[0].is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_auto_clicker_stays_idle() {
        let economy = shared();
        economy.add_money(600);
        economy.buy_auto_clicker(BASIC);
        economy.toggle_auto_clicker(BASIC);

        let clickers = AutoClickers::spawn(economy.clone(), Some(3));
        tokio::time::sleep(Duration::from_secs(30)).await;
        clickers.shutdown().await;

        assert_eq!(economy.money(), 0);
        assert!(economy.snapshot().coins.iter().all(|coin| coin.is_idle()));
    }

    #[tokio::test(start_paused = true)]
    async fn session_with_player_clicks_and_autobuy_grows() {
        let economy = shared();
        let options = SessionOptions {
            duration: Duration::from_secs(120),
            autobuy: true,
            seed: Some(8),
            ..SessionOptions::default()
        };

        let state = run_session(economy, options).await;

        assert!(state.coins.len() > 1, "bought {} coins", state.coins.len());
    }
}
