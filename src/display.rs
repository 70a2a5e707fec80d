/// Compact money label for status lines, e.g. `1500` -> `$1.5K`.
pub fn format_money(amount: u64) -> String {
    let value = amount as f64;
    if amount < 1_000 {
        format!("${amount}")
    } else if amount < 1_000_000 {
        format!("${:.1}K", value / 1_000.0)
    } else if amount < 1_000_000_000 {
        format!("${:.1}M", value / 1_000_000.0)
    } else {
        format!("${:.1}B", value / 1_000_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_are_verbatim() {
        assert_eq!(format_money(0), "$0");
        assert_eq!(format_money(999), "$999");
    }

    #[test]
    fn larger_amounts_use_suffixes() {
        assert_eq!(format_money(1_000), "$1.0K");
        assert_eq!(format_money(1_500), "$1.5K");
        assert_eq!(format_money(2_340_000), "$2.3M");
        assert_eq!(format_money(7_000_000_000), "$7.0B");
    }
}
