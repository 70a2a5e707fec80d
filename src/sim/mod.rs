pub mod catalog;
pub mod coins;
pub mod economy;
pub mod game;
pub mod shared;
pub mod upgrades;
