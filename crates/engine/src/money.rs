use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed Kenyan shilling amount stored as **integer cents**.
///
/// Every balance, delta, fee and split amount in the engine is an `Amount`, so
/// sums over many splits never drift the way binary floats do.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let fee = Amount::from_units(13);
/// assert_eq!(fee.minor(), 1300);
/// assert_eq!(fee.to_string(), "KSh 13.00");
/// ```
///
/// Parsing accepts `.` or `,` as decimal separator and rejects more than two
/// fractional digits:
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("487".parse::<Amount>().unwrap().minor(), 48_700);
/// assert_eq!("0,5".parse::<Amount>().unwrap().minor(), 50);
/// assert!("1.234".parse::<Amount>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Smallest representable step (0.01).
    pub const CENT: Amount = Amount(1);

    /// Creates an amount from integer cents.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole shillings.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Raw value in cents.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Returns `self`, or zero when `self` is negative.
    #[must_use]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}KSh {}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Amount {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses `"1500"`, `"1500.5"`, `"-13,00"` or `"KSh 487.00"` into cents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| EngineError::Validation(format!("invalid amount '{s}': {why}"));

        let mut text = s.trim();
        let negative = match text.as_bytes().first() {
            Some(b'-') => {
                text = &text[1..];
                true
            }
            Some(b'+') => {
                text = &text[1..];
                false
            }
            _ => false,
        };
        let text = text
            .trim_start()
            .strip_prefix("KSh")
            .unwrap_or(text)
            .trim()
            .replace(',', ".");

        let (whole, frac) = match text.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (text.as_str(), ""),
        };
        if whole.is_empty() {
            return Err(invalid("missing whole part"));
        }
        if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid("not a number"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most two decimals are allowed"));
        }

        let units: i64 = whole.parse().map_err(|_| invalid("too large"))?;
        let cents: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            _ => frac.parse().map_err(|_| invalid("not a number"))?,
        };
        let minor = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| invalid("too large"))?;

        Ok(Amount(if negative { -minor } else { minor }))
    }
}
