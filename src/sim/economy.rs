use crate::sim::catalog::Catalog;
use crate::sim::upgrades::UpgradeState;

/// Plain floor into whole currency. Binary residue is kept as is, so
/// `1000 * 1.2^3` prices at 1727, not 1728.
pub fn floor_currency(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    value.floor() as u64
}

/// Price of the next coin of `type_id` when `owned_count` are already owned.
/// `None` means the type is unknown and can never be bought.
pub fn coin_cost(catalog: &Catalog, type_id: &str, owned_count: usize) -> Option<u64> {
    let coin = catalog.coin_type(type_id)?;
    let scale = catalog.coin_cost_multiplier.powf(owned_count as f64);
    Some(floor_currency(coin.base_cost as f64 * scale))
}

/// Sum of `multiplier * level` across every upgrade.
pub fn total_bonus(upgrades: &[UpgradeState]) -> f64 {
    upgrades.iter().map(UpgradeState::bonus).sum()
}

pub fn earnings_per_flip(catalog: &Catalog, type_id: &str, upgrades: &[UpgradeState]) -> u64 {
    match catalog.coin_type(type_id) {
        Some(coin) => floor_currency(coin.base_value as f64 * (1.0 + total_bonus(upgrades))),
        None => 0,
    }
}

pub fn upgrade_cost(catalog: &Catalog, upgrade: &UpgradeState) -> u64 {
    let scale = catalog.upgrade_cost_multiplier.powf(upgrade.level as f64);
    floor_currency(upgrade.base_cost as f64 * scale)
}

pub fn auto_clicker_cost(catalog: &Catalog, type_id: &str) -> Option<u64> {
    if !catalog.contains_coin_type(type_id) {
        return None;
    }
    catalog.auto_clicker_cost(type_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{BASIC, DIAMOND, GOLD, GOLDEN_TOUCH, PLATINUM, SILVER};

    fn golden_touch_at(catalog: &Catalog, level: u32) -> Vec<UpgradeState> {
        let mut upgrade = UpgradeState::seed(catalog.upgrade(GOLDEN_TOUCH).expect("seeded"));
        upgrade.level = level;
        vec![upgrade]
    }

    #[test]
    fn coin_cost_scales_with_owned_count() {
        let catalog = Catalog::default();
        assert_eq!(coin_cost(&catalog, BASIC, 0), Some(6));
        assert_eq!(coin_cost(&catalog, BASIC, 1), Some(7));
        assert_eq!(coin_cost(&catalog, BASIC, 2), Some(8));
        assert_eq!(coin_cost(&catalog, BASIC, 3), Some(10));
        assert_eq!(coin_cost(&catalog, SILVER, 0), Some(35));
        assert_eq!(coin_cost(&catalog, SILVER, 2), Some(50));
    }

    #[test]
    fn cube_of_multiplier_floors_below_the_integer() {
        let catalog = Catalog::default();
        assert_eq!(coin_cost(&catalog, PLATINUM, 3), Some(1727));
        assert_eq!(coin_cost(&catalog, DIAMOND, 3), Some(8639));
    }

    #[test]
    fn unknown_types_are_infeasible() {
        let catalog = Catalog::default();
        assert_eq!(coin_cost(&catalog, "copper", 0), None);
        assert_eq!(auto_clicker_cost(&catalog, "copper"), None);
        assert_eq!(earnings_per_flip(&catalog, "copper", &golden_touch_at(&catalog, 3)), 0);
    }

    #[test]
    fn earnings_apply_every_upgrade_globally() {
        let catalog = Catalog::default();
        assert_eq!(earnings_per_flip(&catalog, BASIC, &[]), 1);
        assert_eq!(earnings_per_flip(&catalog, BASIC, &golden_touch_at(&catalog, 2)), 1);
        assert_eq!(earnings_per_flip(&catalog, BASIC, &golden_touch_at(&catalog, 4)), 2);
        assert_eq!(earnings_per_flip(&catalog, GOLD, &golden_touch_at(&catalog, 2)), 37);
        assert_eq!(earnings_per_flip(&catalog, GOLD, &golden_touch_at(&catalog, 4)), 50);
    }

    #[test]
    fn upgrade_cost_grows_per_level() {
        let catalog = Catalog::default();
        let upgrades = golden_touch_at(&catalog, 0);
        assert_eq!(upgrade_cost(&catalog, &upgrades[0]), 15);
        let upgrades = golden_touch_at(&catalog, 1);
        assert_eq!(upgrade_cost(&catalog, &upgrades[0]), 21);
        let upgrades = golden_touch_at(&catalog, 2);
        assert_eq!(upgrade_cost(&catalog, &upgrades[0]), 29);
    }

    #[test]
    fn floor_truncates_binary_residue() {
        assert_eq!(floor_currency(20.999_999_999_999_996), 20);
        assert_eq!(floor_currency(21.0), 21);
        assert_eq!(floor_currency(20.5), 20);
        assert_eq!(floor_currency(-3.0), 0);
        assert_eq!(floor_currency(f64::NAN), 0);
    }

    #[test]
    fn auto_clicker_cost_reads_the_table() {
        let catalog = Catalog::default();
        assert_eq!(auto_clicker_cost(&catalog, BASIC), Some(600));
        assert_eq!(auto_clicker_cost(&catalog, GOLD), Some(5_000));
    }
}
