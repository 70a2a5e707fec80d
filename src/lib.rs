pub mod autoplay;
pub mod display;
pub mod persist;
pub mod sim;

pub use sim::catalog::Catalog;
pub use sim::game::{ActionError, Economy, EconomyState, PurchaseError};
pub use sim::shared::SharedEconomy;
