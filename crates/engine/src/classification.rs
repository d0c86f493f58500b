//! Arithmetic of a movement's classification.
//!
//! A movement of `delta` with fee `fee` must be split across categories up to
//! its classifiable total `|delta| - fee`. The fee itself is recorded as an
//! audit split but never counted against the classifiable total a second
//! time.

use serde::Serialize;

use crate::Amount;

/// Balance tolerance: one cent.
pub const TOLERANCE: Amount = Amount::CENT;

/// Portion of a movement that must be allocated to categories.
///
/// Clamped at zero: a movement smaller than its own fee has nothing left to
/// classify.
pub fn classifiable_total(delta: Amount, fee: Amount) -> Amount {
    (delta.abs() - fee).clamp_non_negative()
}

/// Classification progress of one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub classifiable_total: Amount,
    pub classified_total: Amount,
}

impl Classification {
    pub fn new(delta: Amount, fee: Amount, classified_total: Amount) -> Self {
        Self {
            classifiable_total: classifiable_total(delta, fee),
            classified_total,
        }
    }

    /// Amount still to classify (negative when over-allocated).
    pub fn remaining(&self) -> Amount {
        self.classifiable_total - self.classified_total
    }

    pub fn is_balanced(&self) -> bool {
        self.remaining().abs() < TOLERANCE
    }

    /// Whether `additional` more can be allocated without exceeding the
    /// classifiable total by more than the tolerance. A total that does not
    /// fit in an `i64` is never accepted.
    pub fn accepts(&self, additional: Amount) -> bool {
        self.classified_total
            .checked_add(additional)
            .is_some_and(|total| total <= self.classifiable_total + TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_addition_is_not_accepted() {
        let c = Classification::new(units(-500), units(13), units(100));
        assert!(!c.accepts(Amount::from_minor(i64::MAX)));
        assert!(c.accepts(units(387)));
    }

    fn units(v: i64) -> Amount {
        Amount::from_units(v)
    }

    #[test]
    fn withdrawal_classifies_absolute_delta_minus_fee() {
        let c = Classification::new(units(-500), units(13), Amount::ZERO);
        assert_eq!(c.classifiable_total, units(487));
        assert_eq!(c.remaining(), units(487));
        assert!(!c.is_balanced());
    }

    #[test]
    fn balanced_only_when_remaining_is_below_one_cent() {
        let done = Classification::new(units(-500), units(13), units(487));
        assert!(done.is_balanced());

        let short = Classification::new(units(-500), units(13), units(487) - Amount::CENT);
        assert!(!short.is_balanced());
        assert_eq!(short.remaining(), Amount::CENT);
    }

    #[test]
    fn ceiling_allows_one_cent_of_slack() {
        let c = Classification::new(units(-500), units(13), units(300));
        assert!(c.accepts(units(187)));
        assert!(c.accepts(units(187) + Amount::CENT));
        assert!(!c.accepts(units(187) + Amount::from_minor(2)));
        assert!(!c.accepts(units(200)));
    }

    #[test]
    fn zero_delta_is_immediately_balanced() {
        let c = Classification::new(Amount::ZERO, Amount::ZERO, Amount::ZERO);
        assert_eq!(c.classifiable_total, Amount::ZERO);
        assert!(c.is_balanced());
    }

    #[test]
    fn movement_below_its_fee_has_nothing_to_classify() {
        let c = Classification::new(units(5), units(7), Amount::ZERO);
        assert_eq!(c.classifiable_total, Amount::ZERO);
        assert!(c.is_balanced());
    }
}
