//! 估價單價捨入策略

use rust_decimal::{Decimal, RoundingStrategy};

/// 估價單價四捨五入到指定小數位數
///
/// 庫存價值保留精確累計值，僅單價做捨入，
/// 使各筆 `stock_value_difference` 能精確相加。
pub fn round_rate(rate: Decimal, precision: u32) -> Decimal {
    rate.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rate() {
        // 8000 / 150 = 53.3333...
        let rate = Decimal::from(8000) / Decimal::from(150);
        assert_eq!(round_rate(rate, 6), Decimal::new(53_333_333, 6));
        assert_eq!(round_rate(rate, 2), Decimal::new(5333, 2));
    }

    #[test]
    fn test_round_rate_midpoint() {
        // 0.5 在中點向外捨入
        assert_eq!(round_rate(Decimal::new(25, 1), 0), Decimal::from(3));
    }
}
