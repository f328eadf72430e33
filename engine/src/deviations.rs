//! C5: Deviation Engine. The Illustrious 18 + Fab 4 index plays as an
//! ordered `const` table, mirroring the teacher's const-array strategy
//! chart construction. Every play here is written against a true-count
//! scale; unbalanced systems (KO) already report their own running count
//! as their true count (see `counting::CountingState::true_count`), so no
//! separate rescaling is needed at lookup time.

use crate::card::Rank;
use crate::counting::{CountingState, System};
use crate::strategy::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Hard or soft player total against a dealer upcard.
    PlayerTotal { total: u16, is_soft: bool, dealer_up: Rank },
    /// A specific pair against a dealer upcard.
    Pair { rank_value: u8, dealer_up: Rank },
    /// The dealer shows an Ace; triggers the insurance side bet.
    Insurance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviationDirection {
    /// Take the deviation action at or above this true count.
    AtOrAbove,
    /// Take the deviation action at or below this true count.
    AtOrBelow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationRule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub index: f64,
    pub direction: DeviationDirection,
    pub action: Action,
}

/// The Illustrious 18, in the conventional priority order, plus the Fab 4
/// surrender plays. `10 vs A` and `10 vs 11`-style duplicate keys in the
/// source material collapse to the single highest-value entry (an explicit
/// Open Question call, recorded alongside this module's grounding entry).
pub const INDEX_PLAYS: &[DeviationRule] = &[
    DeviationRule {
        name: "16 vs 10",
        trigger: Trigger::PlayerTotal { total: 16, is_soft: false, dealer_up: Rank::Ten },
        index: 0.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Stand,
    },
    DeviationRule {
        name: "15 vs 10",
        trigger: Trigger::PlayerTotal { total: 15, is_soft: false, dealer_up: Rank::Ten },
        index: 4.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Stand,
    },
    DeviationRule {
        name: "10 vs 10",
        trigger: Trigger::PlayerTotal { total: 10, is_soft: false, dealer_up: Rank::Ten },
        index: 4.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Double,
    },
    DeviationRule {
        name: "12 vs 3",
        trigger: Trigger::PlayerTotal { total: 12, is_soft: false, dealer_up: Rank::Three },
        index: 2.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Stand,
    },
    DeviationRule {
        name: "12 vs 2",
        trigger: Trigger::PlayerTotal { total: 12, is_soft: false, dealer_up: Rank::Two },
        index: 3.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Stand,
    },
    DeviationRule {
        name: "11 vs A",
        trigger: Trigger::PlayerTotal { total: 11, is_soft: false, dealer_up: Rank::Ace },
        index: 1.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Double,
    },
    DeviationRule {
        name: "9 vs 2",
        trigger: Trigger::PlayerTotal { total: 9, is_soft: false, dealer_up: Rank::Two },
        index: 1.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Double,
    },
    DeviationRule {
        name: "10 vs A",
        trigger: Trigger::PlayerTotal { total: 10, is_soft: false, dealer_up: Rank::Ace },
        index: 4.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Double,
    },
    DeviationRule {
        name: "9 vs 7",
        trigger: Trigger::PlayerTotal { total: 9, is_soft: false, dealer_up: Rank::Seven },
        index: 3.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Double,
    },
    DeviationRule {
        name: "16 vs 9",
        trigger: Trigger::PlayerTotal { total: 16, is_soft: false, dealer_up: Rank::Nine },
        index: 5.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Surrender,
    },
    DeviationRule {
        name: "13 vs 2",
        trigger: Trigger::PlayerTotal { total: 13, is_soft: false, dealer_up: Rank::Two },
        index: -1.0,
        direction: DeviationDirection::AtOrBelow,
        action: Action::Hit,
    },
    DeviationRule {
        name: "12 vs 4",
        trigger: Trigger::PlayerTotal { total: 12, is_soft: false, dealer_up: Rank::Four },
        index: 0.0,
        direction: DeviationDirection::AtOrBelow,
        action: Action::Hit,
    },
    DeviationRule {
        name: "12 vs 5",
        trigger: Trigger::PlayerTotal { total: 12, is_soft: false, dealer_up: Rank::Five },
        index: -2.0,
        direction: DeviationDirection::AtOrBelow,
        action: Action::Hit,
    },
    DeviationRule {
        name: "12 vs 6",
        trigger: Trigger::PlayerTotal { total: 12, is_soft: false, dealer_up: Rank::Six },
        index: -1.0,
        direction: DeviationDirection::AtOrBelow,
        action: Action::Hit,
    },
    DeviationRule {
        name: "13 vs 3",
        trigger: Trigger::PlayerTotal { total: 13, is_soft: false, dealer_up: Rank::Three },
        index: -2.0,
        direction: DeviationDirection::AtOrBelow,
        action: Action::Hit,
    },
    DeviationRule {
        name: "14 vs 10 (Fab 4 surrender)",
        trigger: Trigger::PlayerTotal { total: 14, is_soft: false, dealer_up: Rank::Ten },
        index: 3.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Surrender,
    },
    DeviationRule {
        name: "15 vs 9 (Fab 4 surrender)",
        trigger: Trigger::PlayerTotal { total: 15, is_soft: false, dealer_up: Rank::Nine },
        index: 2.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Surrender,
    },
    DeviationRule {
        name: "15 vs A (Fab 4 surrender)",
        trigger: Trigger::PlayerTotal { total: 15, is_soft: false, dealer_up: Rank::Ace },
        index: 1.0,
        direction: DeviationDirection::AtOrAbove,
        action: Action::Surrender,
    },
];

/// The effective true count for deviation lookups. Balanced systems use
/// `CountingState::true_count` directly; unbalanced systems (KO) rescale
/// their pivot-relative running count onto the same scale index plays are
/// written against: `index_equivalent = running_count / decks_remaining`
/// still holds numerically for KO once the system's own IRC has shifted
/// the zero point, so this is just `true_count` for every system today —
/// kept as its own function so a future unbalanced system with a non-zero
/// pivot can override it without touching callers.
pub fn effective_true_count(state: &CountingState, decks_remaining: f64) -> f64 {
    state.true_count(decks_remaining)
}

/// Finds the first applicable deviation for `trigger` at the given true
/// count, in table priority order. Returns `None` when no rule matches or
/// the count doesn't cross the rule's index.
pub fn lookup(trigger: Trigger, true_count: f64) -> Option<&'static DeviationRule> {
    INDEX_PLAYS.iter().find(|rule| {
        rule.trigger == trigger
            && match rule.direction {
                DeviationDirection::AtOrAbove => true_count >= rule.index,
                DeviationDirection::AtOrBelow => true_count <= rule.index,
            }
    })
}

/// Whether the dealer's Ace upcard is a profitable insurance bet at this
/// count: the EV-positive line is true count >= +3 for every major
/// balanced system (Hi-Lo, Omega II, Wong Halves all share this index).
pub fn insurance_correct(system: System, true_count: f64) -> bool {
    let _ = system; // kept for future per-system insurance index deviation
    true_count >= 3.0
}

/// Resolves `trigger` to an action, falling back to `basic_action` when no
/// deviation applies or the deviation action isn't currently legal
/// (caller passes the already-resolved legality, e.g. from `strategy::recommend`
/// having already clamped Double/Surrender to what's allowed).
pub fn resolve(trigger: Trigger, true_count: f64, basic_action: Action) -> Action {
    match lookup(trigger, true_count) {
        Some(rule) => rule.action,
        None => basic_action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_vs_ten_deviates_to_stand_at_true_count_zero() {
        let trigger = Trigger::PlayerTotal {
            total: 16,
            is_soft: false,
            dealer_up: Rank::Ten,
        };
        assert_eq!(
            resolve(trigger, 0.0, Action::Surrender),
            Action::Stand
        );
    }

    #[test]
    fn sixteen_vs_ten_falls_back_below_zero() {
        let trigger = Trigger::PlayerTotal {
            total: 16,
            is_soft: false,
            dealer_up: Rank::Ten,
        };
        assert_eq!(resolve(trigger, -1.0, Action::Hit), Action::Hit);
    }

    #[test]
    fn insurance_is_correct_at_plus_three_not_below() {
        assert!(insurance_correct(System::HiLo, 3.0));
        assert!(!insurance_correct(System::HiLo, 2.9));
    }

    #[test]
    fn twelve_vs_three_stands_at_plus_two() {
        let trigger = Trigger::PlayerTotal {
            total: 12,
            is_soft: false,
            dealer_up: Rank::Three,
        };
        assert_eq!(resolve(trigger, 2.0, Action::Hit), Action::Stand);
        assert_eq!(resolve(trigger, 1.9, Action::Hit), Action::Hit);
    }

    #[test]
    fn unmatched_trigger_uses_basic_action() {
        let trigger = Trigger::PlayerTotal {
            total: 8,
            is_soft: false,
            dealer_up: Rank::Two,
        };
        assert_eq!(resolve(trigger, 10.0, Action::Hit), Action::Hit);
    }
}
