use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Fixed-point money in integer cents. All payout arithmetic in [`crate::game`]
/// goes through this type; floating point stays confined to
/// [`crate::probability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn from_dollars(dollars: f64) -> Self {
        Cents((dollars * 100.0).round() as i64)
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_mul_ratio(self, numerator: i64, denominator: i64) -> Option<Cents> {
        self.0
            .checked_mul(numerator)
            .and_then(|v| v.checked_div(denominator))
            .map(Cents)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Cents {
    type Output = Cents;
    fn add(self, rhs: Self) -> Self::Output {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;
    fn sub(self, rhs: Self) -> Self::Output {
        Cents(self.0 - rhs.0)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Cents {
    type Output = Cents;
    fn neg(self) -> Self::Output {
        Cents(-self.0)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.as_dollars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_of_bet_is_exact_for_even_cents() {
        let bet = Cents(10_000);
        assert_eq!(bet.checked_mul_ratio(1, 2), Some(Cents(5_000)));
    }

    #[test]
    fn blackjack_payout_three_to_two() {
        let bet = Cents(10_000);
        assert_eq!(bet.checked_mul_ratio(3, 2), Some(Cents(15_000)));
    }

    #[test]
    fn display_formats_dollars() {
        assert_eq!(Cents(12_345).to_string(), "$123.45");
    }
}
