//! C3: Counting Systems. Design Note §9 ("Inheritance of counting systems")
//! replaces a class hierarchy with a capability record: each [`System`]
//! variant resolves to a [`CountingSystemSpec`] — tag table, balance flag,
//! initial running count function and metadata — built once from
//! declarative data, rather than four trait impls.

use crate::card::Rank;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum System {
    HiLo,
    Ko,
    OmegaTwo,
    WongHalves,
}

/// A counting system's capability record. Wong Halves values are doubled
/// (`scale = 2`) so half-point tags stay exact integers; divide by `scale`
/// before presenting or computing a true count.
pub struct CountingSystemSpec {
    pub name: &'static str,
    pub is_balanced: bool,
    pub scale: i64,
    tag_table: [i64; 13],
    irc: fn(u32) -> i64,
    pub betting_correlation: f64,
    pub playing_efficiency: f64,
}

fn rank_index(rank: Rank) -> usize {
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

// Columns: 2 3 4 5 6 7 8 9 10 A
const HI_LO_TABLE: [i64; 13] = tag_table_from_ten([1, 1, 1, 1, 1, 0, 0, 0, -1, -1]);
const KO_TABLE: [i64; 13] = tag_table_from_ten([1, 1, 1, 1, 1, 1, 0, 0, -1, -1]);
const OMEGA_II_TABLE: [i64; 13] = tag_table_from_ten([1, 1, 2, 2, 2, 1, 0, -1, -2, 0]);
// Wong Halves, doubled to keep halves exact: +0.5 -> 1, +1.5 -> 3, etc.
const WONG_HALVES_TABLE: [i64; 13] = tag_table_from_ten([1, 2, 2, 3, 2, 1, 0, -1, -2, -2]);

/// Expands a 10-entry `[2..=9, 10, A]` column table into the 13-entry
/// `Rank::ALL` order by duplicating the ten-value column across T/J/Q/K.
const fn tag_table_from_ten(ten: [i64; 10]) -> [i64; 13] {
    [
        ten[0], ten[1], ten[2], ten[3], ten[4], ten[5], ten[6], ten[7], ten[8], ten[8], ten[8],
        ten[8], ten[9],
    ]
}

fn balanced_irc(_num_decks: u32) -> i64 {
    0
}

fn ko_irc(num_decks: u32) -> i64 {
    4 - 4 * num_decks as i64
}

impl System {
    pub fn spec(self) -> CountingSystemSpec {
        match self {
            System::HiLo => CountingSystemSpec {
                name: "Hi-Lo",
                is_balanced: true,
                scale: 1,
                tag_table: HI_LO_TABLE,
                irc: balanced_irc,
                betting_correlation: 0.97,
                playing_efficiency: 0.51,
            },
            System::Ko => CountingSystemSpec {
                name: "Knock-Out",
                is_balanced: false,
                scale: 1,
                tag_table: KO_TABLE,
                irc: ko_irc,
                betting_correlation: 0.98,
                playing_efficiency: 0.55,
            },
            System::OmegaTwo => CountingSystemSpec {
                name: "Omega II",
                is_balanced: true,
                scale: 1,
                tag_table: OMEGA_II_TABLE,
                irc: balanced_irc,
                betting_correlation: 0.92,
                playing_efficiency: 0.67,
            },
            System::WongHalves => CountingSystemSpec {
                name: "Wong Halves",
                is_balanced: true,
                scale: 2,
                tag_table: WONG_HALVES_TABLE,
                irc: balanced_irc,
                betting_correlation: 0.99,
                playing_efficiency: 0.56,
            },
        }
    }
}

impl CountingSystemSpec {
    pub fn tag(&self, rank: Rank) -> i64 {
        self.tag_table[rank_index(rank)]
    }

    pub fn initial_running_count(&self, num_decks: u32) -> i64 {
        (self.irc)(num_decks)
    }
}

/// Mutable per-shoe counting state. `running_count` is in the system's
/// scaled units (see [`CountingSystemSpec::scale`]).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountingState {
    pub system: System,
    pub running_count: i64,
    /// Omega II's side count of Aces seen; unused by other systems.
    pub ace_side_count: i64,
    pub cards_seen: u32,
}

impl CountingState {
    pub fn new(system: System, num_decks: u32) -> Self {
        CountingState {
            system,
            running_count: system.spec().initial_running_count(num_decks),
            ace_side_count: 0,
            cards_seen: 0,
        }
    }

    pub fn reset(&mut self, num_decks: u32) {
        *self = Self::new(self.system, num_decks);
    }

    pub fn observe(&mut self, rank: Rank) {
        let spec = self.system.spec();
        self.running_count += spec.tag(rank);
        self.cards_seen += 1;
        if self.system == System::OmegaTwo && rank == Rank::Ace {
            self.ace_side_count += 1;
        }
    }

    /// Running count in real (unscaled) units, e.g. Wong Halves' `1` unit
    /// reported back as `0.5`.
    pub fn display_running_count(&self) -> f64 {
        self.running_count as f64 / self.system.spec().scale as f64
    }

    /// True count. Balanced systems divide the (unscaled) running count by
    /// decks remaining; unbalanced systems (KO) report the running count
    /// itself, since KO is read via pivot/key points rather than a division.
    pub fn true_count(&self, decks_remaining: f64) -> f64 {
        let spec = self.system.spec();
        let rc = self.display_running_count();
        if spec.is_balanced {
            rc / decks_remaining.max(0.5)
        } else {
            rc
        }
    }

    /// Effect-of-removal style richness of Aces relative to a fresh shoe's
    /// 4-per-deck expectation; only meaningful for Omega II.
    pub fn ace_richness(&self) -> f64 {
        self.ace_side_count as f64 - (self.cards_seen as f64 / 52.0) * 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Suit};

    fn card(rank: Rank) -> Card {
        Card {
            rank,
            suit: Suit::Heart,
        }
    }

    #[test]
    fn hi_lo_over_one_full_deck_sums_to_zero() {
        let mut state = CountingState::new(System::HiLo, 1);
        for rank in Rank::ALL {
            for _ in 0..4 {
                state.observe(rank);
            }
        }
        assert_eq!(state.running_count, 0);
        assert_eq!(state.cards_seen, 52);
    }

    #[test]
    fn ko_irc_for_six_decks_is_minus_twenty() {
        let state = CountingState::new(System::Ko, 6);
        assert_eq!(state.running_count, -20);
    }

    #[test]
    fn ko_ends_a_full_shoe_at_plus_four() {
        let mut state = CountingState::new(System::Ko, 6);
        for rank in Rank::ALL {
            for _ in 0..(4 * 6) {
                state.observe(card(rank).rank);
            }
        }
        assert_eq!(state.running_count, 4);
    }

    #[test]
    fn wong_halves_tags_are_doubled_internally() {
        let spec = System::WongHalves.spec();
        assert_eq!(spec.tag(Rank::Five), 3); // +1.5 doubled
        assert_eq!(spec.tag(Rank::Two), 1); // +0.5 doubled
    }

    #[test]
    fn omega_two_ace_side_count_tracks_aces_only() {
        let mut state = CountingState::new(System::OmegaTwo, 6);
        state.observe(Rank::Ace);
        state.observe(Rank::Eight);
        assert_eq!(state.ace_side_count, 1);
    }

    #[test]
    fn true_count_divides_balanced_running_count() {
        let mut state = CountingState::new(System::HiLo, 6);
        state.running_count = 10;
        let decks_remaining = 5.0;
        assert_eq!(state.true_count(decks_remaining), 2.0);
    }

    #[test]
    fn unbalanced_true_count_is_the_running_count() {
        let state = CountingState::new(System::Ko, 6);
        assert_eq!(state.true_count(3.0), state.display_running_count());
    }
}
