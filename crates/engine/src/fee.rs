//! M-Pesa transaction fee schedule (Kenya, 2024).
//!
//! The fee determines the classifiable total of every movement, so the table
//! must stay exactly as published.

use crate::Amount;

/// `(inclusive upper bound, fee)` in whole shillings, ordered by bound.
const FEE_TIERS: &[(i64, i64)] = &[
    (100, 7),
    (500, 13),
    (1_000, 25),
    (1_500, 33),
    (2_500, 48),
    (3_500, 60),
    (5_000, 75),
    (7_500, 87),
    (10_000, 99),
    (15_000, 110),
    (20_000, 121),
];

/// Fee charged above the last tier.
const TOP_FEE: i64 = 165;

/// Returns the mobile-money fee for a movement of `amount`.
///
/// The sign of `amount` is ignored; a zero movement costs nothing.
pub fn fee_for(amount: Amount) -> Amount {
    let amount = amount.abs();
    if amount.is_zero() {
        return Amount::ZERO;
    }
    let fee = FEE_TIERS
        .iter()
        .find(|(bound, _)| amount <= Amount::from_units(*bound))
        .map_or(TOP_FEE, |(_, fee)| *fee);
    Amount::from_units(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee(units: i64) -> i64 {
        fee_for(Amount::from_units(units)).minor() / 100
    }

    #[test]
    fn zero_movement_is_free() {
        assert_eq!(fee_for(Amount::ZERO), Amount::ZERO);
    }

    #[test]
    fn upper_bounds_are_inclusive() {
        assert_eq!(fee(1), 7);
        assert_eq!(fee(100), 7);
        assert_eq!(fee(101), 13);
        assert_eq!(fee(500), 13);
        assert_eq!(fee(1_000), 25);
        assert_eq!(fee(1_500), 33);
        assert_eq!(fee(2_500), 48);
        assert_eq!(fee(3_500), 60);
        assert_eq!(fee(5_000), 75);
        assert_eq!(fee(7_500), 87);
        assert_eq!(fee(10_000), 99);
        assert_eq!(fee(15_000), 110);
        assert_eq!(fee(20_000), 121);
        assert_eq!(fee(20_001), 165);
        assert_eq!(fee(250_000), 165);
    }

    #[test]
    fn one_cent_over_a_bound_moves_up_a_tier() {
        assert_eq!(fee_for(Amount::from_minor(10_001)), Amount::from_units(13));
        assert_eq!(fee_for(Amount::from_minor(1)), Amount::from_units(7));
    }

    #[test]
    fn withdrawals_and_deposits_cost_the_same() {
        assert_eq!(
            fee_for(Amount::from_units(-500)),
            fee_for(Amount::from_units(500))
        );
    }
}
