//! C1: Card & Shoe. Grounded in the teacher's `simulation::shoe::Shoe`
//! (Fisher-Yates via `rand::seq::SliceRandom`, front/back split between
//! dealt and undrawn), generalized to a configurable penetration and an
//! injectable RNG instead of a hard-wired `thread_rng()`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::card::{Card, Rank, Suit};
use crate::composition::CardCount;
use crate::error::{EngineError, EngineResult};
use strum::IntoEnumIterator;

/// Number of decks a shoe may be built from.
pub const VALID_DECK_COUNTS: [u32; 5] = [1, 2, 4, 6, 8];

#[derive(Debug, Clone)]
pub struct Shoe {
    num_decks: u32,
    penetration: f64,
    /// Undrawn cards, next-to-deal at the end of the vec.
    undrawn: Vec<Card>,
    dealt: Vec<Card>,
    rng: StdRng,
}

impl Shoe {
    /// Builds and shuffles a fresh shoe. `seed` fixes the PRNG for
    /// reproducible tests and drills; `None` seeds from OS entropy.
    pub fn new(num_decks: u32, penetration: f64, seed: Option<u64>) -> EngineResult<Self> {
        if !VALID_DECK_COUNTS.contains(&num_decks) {
            return Err(EngineError::configuration(format!(
                "num_decks must be one of {VALID_DECK_COUNTS:?}, got {num_decks}"
            )));
        }
        if !(0.0..=1.0).contains(&penetration) || penetration <= 0.0 {
            return Err(EngineError::configuration(format!(
                "penetration must be in (0, 1], got {penetration}"
            )));
        }

        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let mut undrawn = Vec::with_capacity(num_decks as usize * 52);
        for _ in 0..num_decks {
            for suit in Suit::iter() {
                for rank in Rank::ALL {
                    undrawn.push(Card { rank, suit });
                }
            }
        }
        undrawn.shuffle(&mut rng);

        Ok(Shoe {
            num_decks,
            penetration,
            undrawn,
            dealt: Vec::with_capacity(num_decks as usize * 52),
            rng,
        })
    }

    pub fn num_decks(&self) -> u32 {
        self.num_decks
    }

    pub fn cards_remaining(&self) -> usize {
        self.undrawn.len()
    }

    pub fn cards_dealt(&self) -> usize {
        self.dealt.len()
    }

    fn total_cards(&self) -> usize {
        self.num_decks as usize * 52
    }

    pub fn needs_shuffle(&self) -> bool {
        self.dealt.len() as f64 / self.total_cards() as f64 >= self.penetration
    }

    pub fn deal(&mut self) -> EngineResult<Card> {
        let card = self.undrawn.pop().ok_or_else(|| {
            EngineError::ShoeExhausted("no cards remain in the shoe".to_string())
        })?;
        self.dealt.push(card);
        Ok(card)
    }

    pub fn peek(&self) -> Option<Card> {
        self.undrawn.last().copied()
    }

    /// Restores the full composition, reshuffles, and resets the dealt
    /// record. The caller is responsible for resetting any subscribed
    /// counting states (`CountingState::reset`).
    pub fn reshuffle(&mut self) {
        self.undrawn.append(&mut self.dealt);
        self.undrawn.shuffle(&mut self.rng);
        debug_assert_eq!(self.undrawn.len(), self.total_cards());
    }

    /// The remaining composition, for the probability engine and true-count
    /// math. O(n) in cards remaining; cheap relative to the DP it feeds.
    pub fn composition(&self) -> CardCount {
        let mut counts = [0u16; 10];
        for card in &self.undrawn {
            counts[(card.blackjack_value() - 1) as usize] += 1;
        }
        CardCount::new(counts)
    }

    pub fn decks_remaining(&self) -> f64 {
        self.composition().decks_remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition_matches_multiset(shoe: &Shoe) -> bool {
        let mut counts = [0u32; 52];
        for card in shoe.undrawn.iter().chain(shoe.dealt.iter()) {
            let idx = card.suit as u32 * 13
                + Rank::ALL.iter().position(|r| *r == card.rank).unwrap() as u32;
            counts[idx as usize] += 1;
        }
        counts.iter().all(|&c| c == shoe.num_decks)
    }

    #[test]
    fn fresh_shoe_has_correct_multiset() {
        let shoe = Shoe::new(6, 0.75, Some(1)).unwrap();
        assert_eq!(shoe.cards_remaining(), 6 * 52);
        assert!(composition_matches_multiset(&shoe));
    }

    #[test]
    fn deal_moves_card_from_undrawn_to_dealt() {
        let mut shoe = Shoe::new(1, 0.75, Some(2)).unwrap();
        let before = shoe.cards_remaining();
        shoe.deal().unwrap();
        assert_eq!(shoe.cards_remaining(), before - 1);
        assert_eq!(shoe.cards_dealt(), 1);
        assert!(composition_matches_multiset(&shoe));
    }

    #[test]
    fn exhausted_shoe_errors_instead_of_panicking() {
        let mut shoe = Shoe::new(1, 1.0, Some(3)).unwrap();
        for _ in 0..52 {
            shoe.deal().unwrap();
        }
        assert!(matches!(shoe.deal(), Err(EngineError::ShoeExhausted(_))));
    }

    #[test]
    fn needs_shuffle_honors_penetration() {
        let mut shoe = Shoe::new(1, 0.5, Some(4)).unwrap();
        for _ in 0..25 {
            shoe.deal().unwrap();
        }
        assert!(!shoe.needs_shuffle());
        shoe.deal().unwrap();
        assert!(shoe.needs_shuffle());
    }

    #[test]
    fn reshuffle_restores_full_composition() {
        let mut shoe = Shoe::new(2, 0.75, Some(5)).unwrap();
        for _ in 0..80 {
            shoe.deal().unwrap();
        }
        shoe.reshuffle();
        assert_eq!(shoe.cards_remaining(), 2 * 52);
        assert_eq!(shoe.cards_dealt(), 0);
        assert!(composition_matches_multiset(&shoe));
    }

    #[test]
    fn rejects_invalid_deck_count() {
        assert!(Shoe::new(3, 0.75, Some(1)).is_err());
    }

    #[test]
    fn rejects_invalid_penetration() {
        assert!(Shoe::new(6, 0.0, Some(1)).is_err());
        assert!(Shoe::new(6, 1.5, Some(1)).is_err());
    }
}
