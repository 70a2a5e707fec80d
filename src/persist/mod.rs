mod load;
mod save;

pub use load::load_catalog;
pub use save::save_catalog;

pub const CONFIG_FILE: &str = "coin_flipper.ron";
