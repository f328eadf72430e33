//! RuleSet: explicit enumerated configuration record, rejecting unknown
//! values at construction (Design Note §9, "Dynamic configuration objects").
//! Serde derives mirror the teacher's `Rule`/`DoublePolicy`/`PeekPolicy`
//! enums; plain `serde(rename_all)`/`serde(rename)` string variants are used
//! instead of the teacher's `serde-enum-str` crate, since this driver only
//! needs YAML round-tripping, not a bespoke `Display`/`FromStr` impl (that
//! dependency is dropped — see DESIGN.md).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::shoe::VALID_DECK_COUNTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurrenderPolicy {
    None,
    Late,
    Early,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlackjackPayout {
    #[serde(rename = "3:2")]
    ThreeToTwo,
    #[serde(rename = "6:5")]
    SixToFive,
    #[serde(rename = "1:1")]
    OneToOne,
}

impl BlackjackPayout {
    /// Returns `(numerator, denominator)` for exact fixed-point payout math.
    pub fn ratio(self) -> (i64, i64) {
        match self {
            BlackjackPayout::ThreeToTwo => (3, 2),
            BlackjackPayout::SixToFive => (6, 5),
            BlackjackPayout::OneToOne => (1, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleRestriction {
    AnyTwo,
    NineToElevenOnly,
    TenOrElevenOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub num_decks: u32,
    pub penetration: f64,
    pub dealer_hits_soft_17: bool,
    pub double_after_split: bool,
    pub surrender_allowed: SurrenderPolicy,
    pub blackjack_payout: BlackjackPayout,
    pub dealer_peeks_on_ten_or_ace: bool,
    pub resplit_aces: bool,
    pub hit_split_aces: bool,
    pub max_splits: u8,
    pub double_restriction: DoubleRestriction,
}

impl Default for RuleSet {
    /// 6-deck S17 DAS, the canonical baseline named throughout `spec.md`.
    fn default() -> Self {
        RuleSet {
            num_decks: 6,
            penetration: 0.75,
            dealer_hits_soft_17: false,
            double_after_split: true,
            surrender_allowed: SurrenderPolicy::Late,
            blackjack_payout: BlackjackPayout::ThreeToTwo,
            dealer_peeks_on_ten_or_ace: true,
            resplit_aces: false,
            hit_split_aces: false,
            max_splits: 4,
            double_restriction: DoubleRestriction::AnyTwo,
        }
    }
}

impl RuleSet {
    pub fn validate(&self) -> EngineResult<()> {
        if !VALID_DECK_COUNTS.contains(&self.num_decks) {
            return Err(EngineError::configuration(format!(
                "num_decks must be one of {VALID_DECK_COUNTS:?}, got {}",
                self.num_decks
            )));
        }
        if !(0.0..=1.0).contains(&self.penetration) || self.penetration <= 0.0 {
            return Err(EngineError::configuration(format!(
                "penetration must be in (0, 1], got {}",
                self.penetration
            )));
        }
        if self.max_splits == 0 {
            return Err(EngineError::configuration(
                "max_splits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a 2-card hand of the given hard total may double, ignoring
    /// split/DAS context (callers combine with that separately).
    pub fn double_allowed_on_total(&self, total: u16, is_soft: bool) -> bool {
        match self.double_restriction {
            DoubleRestriction::AnyTwo => true,
            DoubleRestriction::NineToElevenOnly => !is_soft && (9..=11).contains(&total),
            DoubleRestriction::TenOrElevenOnly => !is_soft && (10..=11).contains(&total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_set_is_valid() {
        assert!(RuleSet::default().validate().is_ok());
    }

    #[test]
    fn rejects_unsupported_deck_count() {
        let mut rules = RuleSet::default();
        rules.num_decks = 5;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn blackjack_payout_ratios() {
        assert_eq!(BlackjackPayout::ThreeToTwo.ratio(), (3, 2));
        assert_eq!(BlackjackPayout::SixToFive.ratio(), (6, 5));
        assert_eq!(BlackjackPayout::OneToOne.ratio(), (1, 1));
    }

    #[test]
    fn double_restriction_gates_totals() {
        let mut rules = RuleSet::default();
        rules.double_restriction = DoubleRestriction::TenOrElevenOnly;
        assert!(rules.double_allowed_on_total(10, false));
        assert!(!rules.double_allowed_on_total(9, false));
        assert!(!rules.double_allowed_on_total(10, true));
    }
}
