use clap::{Parser, Subcommand};
use coin_flipper::persist::CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coin-flipper")]
#[command(about = "Coin flipping economy engine with a headless autoplay driver")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a session headlessly and report the economy as it grows
    Run {
        /// Catalog file; the built-in catalog is used when it does not exist
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Session length in seconds
        #[arg(short, long, default_value_t = 60)]
        seconds: u64,

        /// Money credited before the first tick
        #[arg(long, default_value_t = 0)]
        grant: i64,

        /// Spend money on the cheapest affordable item every tick
        #[arg(long)]
        autobuy: bool,

        /// Leave manual coins alone; only auto-clickers flip
        #[arg(long)]
        no_clicks: bool,

        /// Seed for reproducible timings and coin placement
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the built-in catalog as an editable RON file
    InitConfig {
        #[arg(short, long, default_value = CONFIG_FILE)]
        output: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print coin types, upgrades and auto-clicker prices
    Catalog {
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },
}
