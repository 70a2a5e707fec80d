mod app;

use anyhow::{Result, bail};
use app::{Cli, Command};
use clap::Parser;
use coin_flipper::autoplay::{self, SessionOptions};
use coin_flipper::display::format_money;
use coin_flipper::persist::{load_catalog, save_catalog};
use coin_flipper::{Catalog, Economy, SharedEconomy};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            seconds,
            grant,
            autobuy,
            no_clicks,
            seed,
        } => {
            let catalog = Arc::new(catalog_or_default(&config)?);
            let economy = match seed {
                Some(seed) => Economy::seeded(catalog, seed)?,
                None => Economy::fresh(catalog)?,
            };
            let economy = SharedEconomy::new(economy);
            economy.add_money(grant);

            let options = SessionOptions {
                duration: Duration::from_secs(seconds),
                player_clicks: !no_clicks,
                autobuy,
                seed,
                ..SessionOptions::default()
            };
            let state = autoplay::run_session(economy, options).await;

            info!(
                money = %format_money(state.money),
                coins = state.coins.len(),
                auto_clickers = state.auto_clickers.len(),
                "session finished"
            );
            for upgrade in &state.upgrades {
                info!(upgrade = %upgrade.name, level = upgrade.level, max = upgrade.max_level);
            }
        }
        Command::InitConfig { output, force } => {
            if output.exists() && !force {
                bail!("{} already exists (pass --force to overwrite)", output.display());
            }
            save_catalog(&output, &Catalog::default())?;
            info!(path = %output.display(), "wrote default catalog");
        }
        Command::Catalog { config } => {
            let catalog = catalog_or_default(&config)?;
            print_catalog(&catalog);
        }
    }
    Ok(())
}

fn catalog_or_default(path: &Path) -> Result<Catalog> {
    match load_catalog(path)? {
        Some(catalog) => {
            info!(path = %path.display(), "loaded catalog");
            Ok(catalog)
        }
        None => Ok(Catalog::default()),
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("{:<10} {:<16} {:>8} {:>10} {:>12}", "id", "name", "value", "cost", "auto");
    for coin in &catalog.coin_types {
        let auto = catalog
            .auto_clicker_cost(&coin.id)
            .map(format_money)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<16} {:>8} {:>10} {:>12}",
            coin.id,
            coin.name,
            format_money(coin.base_value),
            format_money(coin.base_cost),
            auto
        );
    }
    println!();
    for upgrade in &catalog.upgrades {
        println!(
            "{} ({}): +{:.0}% per level, max {}, from {}",
            upgrade.name,
            upgrade.id,
            upgrade.multiplier * 100.0,
            upgrade.max_level,
            format_money(upgrade.base_cost)
        );
    }
    println!(
        "coin cost x{} per owned, upgrade cost x{} per level, start with {}",
        catalog.coin_cost_multiplier,
        catalog.upgrade_cost_multiplier,
        format_money(catalog.starting_money)
    );
}
