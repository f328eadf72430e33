//! C4: Basic Strategy. The teacher's chart lives as literal match arms over
//! total/upcard ranges rather than a lookup table; this module keeps that
//! shape but resolves actions against `RuleSet` flags (double restriction,
//! DAS, surrender policy) instead of assuming one fixed rule set.
//!
//! H17 deviations from the S17 baseline (Design §4.4) are folded in as
//! extra match arms rather than a second table: A,8 vs 6 doubles, hard 11
//! vs Ace doubles, and late surrender extends to 15 vs A and 17 vs A.

use crate::card::Rank;
use crate::hand::Hand;
use crate::rules::{RuleSet, SurrenderPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
    Surrender,
}

/// A chart cell before it is resolved against what the table/hand actually
/// permits right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartAction {
    Stand,
    Hit,
    Split,
    /// Double if allowed, else hit.
    DoubleElseHit,
    /// Double if allowed, else stand.
    DoubleElseStand,
    /// Surrender if allowed, else fall through to the given action.
    SurrenderElse(&'static ChartAction),
}

impl ChartAction {
    fn resolve(&self, can_double: bool, can_surrender: bool) -> Action {
        match self {
            ChartAction::Stand => Action::Stand,
            ChartAction::Hit => Action::Hit,
            ChartAction::Split => Action::Split,
            ChartAction::DoubleElseHit => {
                if can_double {
                    Action::Double
                } else {
                    Action::Hit
                }
            }
            ChartAction::DoubleElseStand => {
                if can_double {
                    Action::Double
                } else {
                    Action::Stand
                }
            }
            ChartAction::SurrenderElse(fallback) => {
                if can_surrender {
                    Action::Surrender
                } else {
                    fallback.resolve(can_double, can_surrender)
                }
            }
        }
    }
}

/// `2..=9, 10, A` collapsed to 0..=9, matching the counting tag tables.
fn dealer_index(rank: Rank) -> usize {
    match rank {
        Rank::Two => 0,
        Rank::Three => 1,
        Rank::Four => 2,
        Rank::Five => 3,
        Rank::Six => 4,
        Rank::Seven => 5,
        Rank::Eight => 6,
        Rank::Nine => 7,
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 8,
        Rank::Ace => 9,
    }
}

const UP_2: usize = 0;
const UP_3: usize = 1;
const UP_4: usize = 2;
const UP_5: usize = 3;
const UP_6: usize = 4;
const UP_7: usize = 5;
const UP_8: usize = 6;
const UP_9: usize = 7;
const UP_10: usize = 8;
const UP_A: usize = 9;

fn hard_action(total: u16, up: usize, hits_soft_17: bool) -> ChartAction {
    match total {
        t if t <= 8 => ChartAction::Hit,
        9 => {
            if (UP_3..=UP_6).contains(&up) {
                ChartAction::DoubleElseHit
            } else {
                ChartAction::Hit
            }
        }
        10 => {
            if (UP_2..=UP_9).contains(&up) {
                ChartAction::DoubleElseHit
            } else {
                ChartAction::Hit
            }
        }
        11 => {
            // H17: double vs Ace too.
            if (UP_2..=UP_10).contains(&up) || (hits_soft_17 && up == UP_A) {
                ChartAction::DoubleElseHit
            } else {
                ChartAction::Hit
            }
        }
        12 => {
            if (UP_4..=UP_6).contains(&up) {
                ChartAction::Stand
            } else {
                ChartAction::Hit
            }
        }
        13..=16 => {
            const STAND: ChartAction = ChartAction::Stand;
            const HIT: ChartAction = ChartAction::Hit;
            let stand = (UP_2..=UP_6).contains(&up);
            let surrender_fallback: &'static ChartAction = if stand { &STAND } else { &HIT };
            match (total, up) {
                (15, UP_A) if hits_soft_17 => ChartAction::SurrenderElse(surrender_fallback),
                (15, UP_10) => ChartAction::SurrenderElse(surrender_fallback),
                (16, UP_9) | (16, UP_10) | (16, UP_A) => {
                    ChartAction::SurrenderElse(surrender_fallback)
                }
                _ if stand => ChartAction::Stand,
                _ => ChartAction::Hit,
            }
        }
        17 if hits_soft_17 && up == UP_A => {
            // H17: 17 vs Ace is the marginal surrender spot.
            ChartAction::SurrenderElse(&ChartAction::Stand)
        }
        _ => ChartAction::Stand,
    }
}

fn soft_action(total: u16, up: usize, hits_soft_17: bool) -> ChartAction {
    match total {
        13 | 14 => {
            if (UP_5..=UP_6).contains(&up) {
                ChartAction::DoubleElseHit
            } else {
                ChartAction::Hit
            }
        }
        15 | 16 => {
            if (UP_4..=UP_6).contains(&up) {
                ChartAction::DoubleElseHit
            } else {
                ChartAction::Hit
            }
        }
        17 => {
            if (UP_3..=UP_6).contains(&up) {
                ChartAction::DoubleElseHit
            } else {
                ChartAction::Hit
            }
        }
        18 => match up {
            UP_2..=UP_6 => ChartAction::DoubleElseStand,
            UP_7 | UP_8 => ChartAction::Stand,
            _ => ChartAction::Hit,
        },
        19 => {
            // H17: double vs 6, else stand.
            if hits_soft_17 && up == UP_6 {
                ChartAction::DoubleElseStand
            } else {
                ChartAction::Stand
            }
        }
        _ => ChartAction::Stand,
    }
}

fn pair_action(pair_value: u8, up: usize, double_after_split: bool) -> ChartAction {
    match pair_value {
        2 | 3 => {
            let hi = if double_after_split { UP_7 } else { UP_6 };
            if (UP_2..=hi).contains(&up) {
                ChartAction::Split
            } else {
                ChartAction::Hit
            }
        }
        4 => {
            if double_after_split && (UP_5..=UP_6).contains(&up) {
                ChartAction::Split
            } else {
                ChartAction::Hit
            }
        }
        6 => {
            let hi = if double_after_split { UP_6 } else { UP_5 };
            if (UP_2..=hi).contains(&up) {
                ChartAction::Split
            } else {
                ChartAction::Hit
            }
        }
        7 => {
            if (UP_2..=UP_7).contains(&up) {
                ChartAction::Split
            } else {
                ChartAction::Hit
            }
        }
        8 => ChartAction::Split,
        9 => {
            if matches!(up, UP_2..=UP_6 | UP_8 | UP_9) {
                ChartAction::Split
            } else {
                ChartAction::Stand
            }
        }
        1 => ChartAction::Split, // A,A
        _ => unreachable!("pair_action called with a non-pair rank value"),
    }
}

/// Recommends an action for `player` against `dealer_upcard`, honoring the
/// rule set's double/surrender/DAS restrictions. `5,5` and `10,10` pairs are
/// resolved via the hard-total chart, matching standard practice.
pub fn recommend(player: &Hand, dealer_upcard: Rank, rules: &RuleSet) -> Action {
    let up = dealer_index(dealer_upcard);
    let can_surrender = player.len() == 2 && !player.from_split && rules.surrender_allowed != SurrenderPolicy::None;
    let hits_soft_17 = rules.dealer_hits_soft_17;

    if player.is_pair() && player.len() == 2 {
        let pair_value = player.cards()[0].blackjack_value();
        if pair_value != 5 && pair_value != 10 {
            let can_double = rules.double_allowed_on_total(player.total(), player.is_soft())
                && (!player.from_split || rules.double_after_split);
            let chart = pair_action(pair_value, up, rules.double_after_split);
            return chart.resolve(can_double, can_surrender);
        }
    }

    let total = player.total();
    let can_double = player.len() == 2
        && rules.double_allowed_on_total(total, player.is_soft())
        && (!player.from_split || rules.double_after_split);
    let chart = if player.is_soft() {
        soft_action(total, up, hits_soft_17)
    } else {
        hard_action(total, up, hits_soft_17)
    };
    chart.resolve(can_double, can_surrender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Suit};
    use crate::money::Cents;

    fn hand(ranks: &[Rank]) -> Hand {
        let mut h = Hand::new(Cents(1000));
        for &rank in ranks {
            h.push(Card {
                rank,
                suit: Suit::Spade,
            });
        }
        h
    }

    #[test]
    fn hard_sixteen_vs_ten_stands_on_nothing_but_surrenders_late() {
        let rules = RuleSet::default();
        let h = hand(&[Rank::King, Rank::Six]);
        assert_eq!(recommend(&h, Rank::Ten, &rules), Action::Surrender);
    }

    #[test]
    fn hard_sixteen_vs_ten_hits_when_surrender_disallowed() {
        let mut rules = RuleSet::default();
        rules.surrender_allowed = SurrenderPolicy::None;
        let h = hand(&[Rank::King, Rank::Six]);
        assert_eq!(recommend(&h, Rank::Ten, &rules), Action::Hit);
    }

    #[test]
    fn hard_eleven_doubles_against_everything_under_s17() {
        let rules = RuleSet::default();
        let h = hand(&[Rank::Seven, Rank::Four]);
        assert_eq!(recommend(&h, Rank::Ace, &rules), Action::Hit);
        let mut h17 = RuleSet::default();
        h17.dealer_hits_soft_17 = true;
        assert_eq!(recommend(&h, Rank::Ace, &h17), Action::Double);
    }

    #[test]
    fn soft_eighteen_vs_nine_hits() {
        let rules = RuleSet::default();
        let h = hand(&[Rank::Ace, Rank::Seven]);
        assert_eq!(recommend(&h, Rank::Nine, &rules), Action::Hit);
    }

    #[test]
    fn soft_nineteen_doubles_vs_six_under_h17_only() {
        let h = hand(&[Rank::Ace, Rank::Eight]);
        let mut h17 = RuleSet::default();
        h17.dealer_hits_soft_17 = true;
        assert_eq!(recommend(&h, Rank::Six, &h17), Action::Double);

        let s17 = RuleSet::default();
        assert_eq!(recommend(&h, Rank::Six, &s17), Action::Stand);
    }

    #[test]
    fn eights_always_split() {
        let rules = RuleSet::default();
        let h = hand(&[Rank::Eight, Rank::Eight]);
        assert_eq!(recommend(&h, Rank::Ace, &rules), Action::Split);
    }

    #[test]
    fn five_five_never_splits_plays_as_hard_ten() {
        let rules = RuleSet::default();
        let h = hand(&[Rank::Five, Rank::Five]);
        assert_eq!(recommend(&h, Rank::Six, &rules), Action::Double);
    }

    #[test]
    fn ten_ten_always_stands() {
        let rules = RuleSet::default();
        let h = hand(&[Rank::King, Rank::Queen]);
        assert_eq!(recommend(&h, Rank::Six, &rules), Action::Stand);
    }
}
