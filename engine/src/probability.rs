//! C6: Probability / Edge Engine. The dealer-outcome recursion is the
//! teacher's `statearray`-keyed memoization idiom applied to a genuine
//! state: remaining shoe composition plus the dealer's current total.
//! Player-side EV reuses the same recursion shape for the hit/stand
//! decision tree. House edge, Kelly stake and risk of ruin are the
//! standard closed-form results built on top of that EV.

use std::collections::HashMap;

use crate::card::Rank;
use crate::composition::CardCount;
use crate::money::Cents;
use crate::rules::RuleSet;

/// Terminal distribution of a dealer's hand once they stop drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DealerOutcomeDistribution {
    pub p17: f64,
    pub p18: f64,
    pub p19: f64,
    pub p20: f64,
    pub p21: f64,
    pub bust: f64,
}

impl DealerOutcomeDistribution {
    fn zero() -> Self {
        DealerOutcomeDistribution {
            p17: 0.0,
            p18: 0.0,
            p19: 0.0,
            p20: 0.0,
            p21: 0.0,
            bust: 0.0,
        }
    }

    fn standing_on(total: u16) -> Self {
        let mut d = Self::zero();
        match total {
            17 => d.p17 = 1.0,
            18 => d.p18 = 1.0,
            19 => d.p19 = 1.0,
            20 => d.p20 = 1.0,
            21 => d.p21 = 1.0,
            _ => d.bust = 1.0,
        }
        d
    }

    fn scale(self, factor: f64) -> Self {
        DealerOutcomeDistribution {
            p17: self.p17 * factor,
            p18: self.p18 * factor,
            p19: self.p19 * factor,
            p20: self.p20 * factor,
            p21: self.p21 * factor,
            bust: self.bust * factor,
        }
    }

    fn add(mut self, other: Self) -> Self {
        self.p17 += other.p17;
        self.p18 += other.p18;
        self.p19 += other.p19;
        self.p20 += other.p20;
        self.p21 += other.p21;
        self.bust += other.bust;
        self
    }

    pub fn total_probability(&self) -> f64 {
        self.p17 + self.p18 + self.p19 + self.p20 + self.p21 + self.bust
    }

    fn probability_of_total(&self, total: u16) -> f64 {
        match total {
            17 => self.p17,
            18 => self.p18,
            19 => self.p19,
            20 => self.p20,
            21 => self.p21,
            _ => 0.0,
        }
    }
}

/// Above this many decks remaining, exact composition-tracking recursion is
/// approximated by dealing from an effectively infinite shoe instead: the
/// state space the exact recursion would memoize is enormous that early,
/// and the exact answer is indistinguishable from the infinite-deck one
/// until the shoe is meaningfully depleted.
const INFINITE_DECK_THRESHOLD: f64 = 2.0;
const INFINITE_DECK_DECKS: u32 = 400;

fn next_total(total: u16, is_soft: bool, value: u8) -> (u16, bool) {
    if value == 1 {
        // Treat the drawn Ace as 11 if that keeps the hand <= 21.
        let as_eleven = total + 11;
        if as_eleven <= 21 {
            (as_eleven, true)
        } else {
            (total + 1, is_soft)
        }
    } else {
        let raw = total + value as u16;
        if raw > 21 && is_soft {
            // A previously-soft total downgrades to hard on bust-avoidance.
            (raw - 10, false)
        } else {
            (raw, is_soft)
        }
    }
}

type DealerCache = HashMap<(CardCount, u16, bool), DealerOutcomeDistribution>;

fn dealer_recurse(
    composition: &CardCount,
    total: u16,
    is_soft: bool,
    hits_soft_17: bool,
    cache: &mut DealerCache,
) -> DealerOutcomeDistribution {
    if total > 21 {
        return DealerOutcomeDistribution {
            bust: 1.0,
            ..DealerOutcomeDistribution::zero()
        };
    }
    let must_stand = total >= 18 || (total == 17 && !(is_soft && hits_soft_17));
    if must_stand {
        return DealerOutcomeDistribution::standing_on(total);
    }
    if let Some(cached) = cache.get(&(*composition, total, is_soft)) {
        return *cached;
    }

    let mut result = DealerOutcomeDistribution::zero();
    for value in 1..=10u8 {
        let p = composition.probability_of(value);
        if p <= 0.0 {
            continue;
        }
        let mut next_composition = *composition;
        next_composition.remove(value);
        let (new_total, new_soft) = next_total(total, is_soft, value);
        let branch = dealer_recurse(&next_composition, new_total, new_soft, hits_soft_17, cache);
        result = result.add(branch.scale(p));
    }
    cache.insert((*composition, total, is_soft), result);
    result
}

/// The dealer's final-hand distribution given their revealed upcard and the
/// shoe composition after that card (and any peeked hole card) is removed.
pub fn dealer_distribution(
    composition_after_upcard: &CardCount,
    upcard: Rank,
    hits_soft_17: bool,
) -> DealerOutcomeDistribution {
    let composition = if composition_after_upcard.decks_remaining() > INFINITE_DECK_THRESHOLD {
        CardCount::full_shoe(INFINITE_DECK_DECKS)
    } else {
        *composition_after_upcard
    };
    let value = upcard.blackjack_value();
    let (total, is_soft) = if value == 1 { (11, true) } else { (value as u16, false) };
    let mut cache = DealerCache::new();
    dealer_recurse(&composition, total, is_soft, hits_soft_17, &mut cache)
}

/// Expected value of standing on `total`, in units of the original bet,
/// against a dealer's final distribution. Push contributes zero.
pub fn ev_stand(total: u16, dealer: &DealerOutcomeDistribution) -> f64 {
    if total > 21 {
        return -1.0;
    }
    let p_dealer_total = dealer.probability_of_total(total);
    let p_dealer_higher: f64 = (total + 1..=21).map(|t| dealer.probability_of_total(t)).sum();
    let p_dealer_lower = (dealer.total_probability() - dealer.bust - p_dealer_total - p_dealer_higher).max(0.0);
    let p_win = dealer.bust + p_dealer_lower;
    let p_lose = p_dealer_higher;
    p_win - p_lose
}

type PlayerCache = HashMap<(CardCount, u16, bool), f64>;

fn best_play_ev(
    composition: &CardCount,
    total: u16,
    is_soft: bool,
    dealer: &DealerOutcomeDistribution,
    cache: &mut PlayerCache,
) -> f64 {
    if total > 21 {
        return -1.0;
    }
    if total == 21 {
        return ev_stand(21, dealer);
    }
    if let Some(cached) = cache.get(&(*composition, total, is_soft)) {
        return *cached;
    }

    let standing = ev_stand(total, dealer);
    let mut hitting = 0.0;
    for value in 1..=10u8 {
        let p = composition.probability_of(value);
        if p <= 0.0 {
            continue;
        }
        let mut next_composition = *composition;
        next_composition.remove(value);
        let (new_total, new_soft) = next_total(total, is_soft, value);
        hitting += p * best_play_ev(&next_composition, new_total, new_soft, dealer, cache);
    }
    let best = standing.max(hitting);
    cache.insert((*composition, total, is_soft), best);
    best
}

/// EV of hitting once and then playing on optimally (composition-aware).
pub fn ev_hit(composition: &CardCount, total: u16, is_soft: bool, dealer: &DealerOutcomeDistribution) -> f64 {
    let mut cache = PlayerCache::new();
    let mut result = 0.0;
    for value in 1..=10u8 {
        let p = composition.probability_of(value);
        if p <= 0.0 {
            continue;
        }
        let mut next_composition = *composition;
        next_composition.remove(value);
        let (new_total, new_soft) = next_total(total, is_soft, value);
        result += p * best_play_ev(&next_composition, new_total, new_soft, dealer, &mut cache);
    }
    result
}

/// EV of doubling: exactly one more card, then forced to stand, at twice
/// the original wager.
pub fn ev_double(composition: &CardCount, total: u16, is_soft: bool, dealer: &DealerOutcomeDistribution) -> f64 {
    let mut result = 0.0;
    for value in 1..=10u8 {
        let p = composition.probability_of(value);
        if p <= 0.0 {
            continue;
        }
        let mut next_composition = *composition;
        next_composition.remove(value);
        let (new_total, _) = next_total(total, is_soft, value);
        result += p * ev_stand(new_total, dealer);
    }
    2.0 * result
}

/// EV of splitting a pair of `pair_value` cards into two hands, each dealt
/// one more card and then played optimally. Re-splitting and doubling after
/// split are not modeled; this is an approximation of the exact (and far
/// more expensive) joint two-hand recursion.
pub fn ev_split(composition: &CardCount, pair_value: u8, dealer: &DealerOutcomeDistribution) -> f64 {
    let mut per_hand_ev = 0.0;
    let mut cache = PlayerCache::new();
    for value in 1..=10u8 {
        let p = composition.probability_of(value);
        if p <= 0.0 {
            continue;
        }
        let mut next_composition = *composition;
        next_composition.remove(value);
        let (total, is_soft) = next_total(pair_value as u16, pair_value == 1, value);
        per_hand_ev += p * best_play_ev(&next_composition, total, is_soft, dealer, &mut cache);
    }
    2.0 * per_hand_ev
}

/// The house's edge against optimal play, as a fraction of the original
/// wager: the full initial deal is enumerated (player's two cards, dealer's
/// upcard) against a fresh shoe, each branch played at its best of
/// stand/hit/double, and the player's weighted EV is negated.
pub fn house_edge(rules: &RuleSet) -> f64 {
    let shoe = CardCount::full_shoe(rules.num_decks);
    let mut player_ev = 0.0;

    for first in 1..=10u8 {
        let p_first = shoe.probability_of(first);
        if p_first <= 0.0 {
            continue;
        }
        let mut after_first = shoe;
        after_first.remove(first);

        for second in 1..=10u8 {
            let p_second = after_first.probability_of(second);
            if p_second <= 0.0 {
                continue;
            }
            let mut after_player = after_first;
            after_player.remove(second);

            for upcard in 1..=10u8 {
                let p_upcard = after_player.probability_of(upcard);
                if p_upcard <= 0.0 {
                    continue;
                }
                let mut after_upcard = after_player;
                after_upcard.remove(upcard);

                let joint = p_first * p_second * p_upcard;
                let dealer = dealer_distribution(&after_upcard, Rank::from_blackjack_value(upcard), rules.dealer_hits_soft_17);

                let (t1, s1) = next_total(0, false, first);
                let (total, is_soft) = next_total(t1, s1, second);

                let stand = ev_stand(total, &dealer);
                let hit = ev_hit(&after_upcard, total, is_soft, &dealer);
                let double = ev_double(&after_upcard, total, is_soft, &dealer);
                let best = stand.max(hit).max(double);

                player_ev += joint * best;
            }
        }
    }

    -player_ev
}

pub const EV_SURRENDER: f64 = -0.5;

/// Kelly-optimal fraction of bankroll to wager, `edge / variance`. Variance
/// per hand for typical six-deck blackjack is taken as the conventional
/// `1.3225`.
pub const BLACKJACK_VARIANCE: f64 = 1.3225;

pub fn kelly_fraction(edge: f64) -> f64 {
    edge / BLACKJACK_VARIANCE
}

/// The Kelly-optimal stake in cents: `bankroll * kelly_fraction(edge) *
/// fraction`, where `fraction` lets a caller scale down to half- or
/// quarter-Kelly. Negative edges and fractions clamp to zero rather than
/// recommending a short.
pub fn kelly(edge: f64, bankroll: Cents, fraction: f64) -> Cents {
    let stake_fraction = (kelly_fraction(edge) * fraction).max(0.0);
    Cents((bankroll.0 as f64 * stake_fraction).round() as i64)
}

/// Probability of losing `bankroll_units` betting units before the
/// bankroll grows unboundedly, under the standard diffusion approximation.
pub fn risk_of_ruin(edge: f64, bankroll_units: f64) -> f64 {
    if edge <= 0.0 {
        return 1.0;
    }
    (-2.0 * edge * bankroll_units / BLACKJACK_VARIANCE).exp()
}

/// N0: hands needed for the player's edge to overcome one standard
/// deviation of variance, a standard measure of how quickly an edge
/// "proves itself" statistically.
pub fn n_zero(edge: f64) -> f64 {
    if edge == 0.0 {
        return f64::INFINITY;
    }
    BLACKJACK_VARIANCE / (edge * edge)
}

/// A simple bet-spread ramp: one unit below true count 2, then one extra
/// unit per true count point above that, capped at `max_units`.
pub fn recommended_bet_units(true_count: f64, max_units: u32) -> u32 {
    if true_count < 2.0 {
        1
    } else {
        (true_count.floor() as u32).saturating_sub(1).clamp(1, max_units)
    }
}

/// `base_bet` scaled by [`recommended_bet_units`]'s ramp, in cents.
pub fn bet_spread(true_count: f64, base_bet: Cents, max_spread: u32) -> Cents {
    let units = recommended_bet_units(true_count, max_spread);
    Cents(base_bet.0 * units as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dealer_distribution_sums_to_one() {
        let shoe = CardCount::full_shoe(6);
        let dist = dealer_distribution(&shoe, Rank::Seven, false);
        assert!((dist.total_probability() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dealer_busts_more_showing_a_six_than_a_seven() {
        let shoe = CardCount::full_shoe(6);
        let six = dealer_distribution(&shoe, Rank::Six, false);
        let seven = dealer_distribution(&shoe, Rank::Seven, false);
        assert!(six.bust > seven.bust);
    }

    #[test]
    fn standing_on_twenty_one_beats_everything_but_another_twenty_one() {
        let dist = DealerOutcomeDistribution {
            p17: 0.0,
            p18: 0.0,
            p19: 0.0,
            p20: 0.0,
            p21: 0.3,
            bust: 0.7,
        };
        let ev = ev_stand(21, &dist);
        assert!(ev > 0.0 && ev < 1.0);
    }

    #[test]
    fn hitting_hard_twenty_is_worse_than_standing() {
        let shoe = CardCount::full_shoe(6);
        let dealer = dealer_distribution(&shoe, Rank::Six, false);
        let stand = ev_stand(20, &dealer);
        let hit = ev_hit(&shoe, 20, false, &dealer);
        assert!(stand > hit);
    }

    #[test]
    fn kelly_and_risk_of_ruin_are_sane() {
        let f = kelly_fraction(0.01);
        assert!(f > 0.0 && f < 0.1);
        let ror = risk_of_ruin(0.01, 100.0);
        assert!(ror > 0.0 && ror < 1.0);
        assert_eq!(risk_of_ruin(-0.01, 100.0), 1.0);
    }

    #[test]
    fn bet_spread_ramps_up_with_true_count() {
        assert_eq!(recommended_bet_units(1.0, 8), 1);
        assert_eq!(recommended_bet_units(3.0, 8), 2);
        assert_eq!(recommended_bet_units(20.0, 8), 8);
    }

    #[test]
    fn kelly_stake_matches_the_closed_form_amount() {
        let bankroll = Cents(1_000_000); // $10,000.00
        let stake = kelly(0.01, bankroll, 0.5);
        assert_eq!(stake, Cents(3781)); // $37.81
    }

    #[test]
    fn kelly_stake_is_zero_for_a_negative_edge() {
        let bankroll = Cents(500_000);
        assert_eq!(kelly(-0.01, bankroll, 1.0), Cents(0));
    }

    #[test]
    fn bet_spread_scales_the_base_bet_by_units() {
        let base = Cents(1000);
        assert_eq!(bet_spread(1.0, base, 8), Cents(1000));
        assert_eq!(bet_spread(3.0, base, 8), Cents(2000));
    }

    #[test]
    fn house_edge_for_default_rules_is_in_the_expected_band() {
        let rules = RuleSet::default();
        let edge = house_edge(&rules);
        assert!((-0.02..=0.05).contains(&edge), "house edge out of band: {edge}");
    }
}
