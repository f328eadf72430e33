//! C2: Hand Evaluator. Grounded in the teacher's `CardCount`-as-hand-state
//! idiom (`is_soft`, `bust`, `is_natural`, `get_actual_sum`), but `Hand`
//! additionally keeps the ordered card list and split/bet/surrender
//! bookkeeping that the game state machine (C7) needs to drive a round.

use crate::card::Card;
use crate::money::Cents;

#[derive(Debug, Clone)]
pub struct Hand {
    cards: Vec<Card>,
    pub bet: Cents,
    pub doubled: bool,
    pub from_split: bool,
    pub surrendered: bool,
}

impl Hand {
    pub fn new(bet: Cents) -> Self {
        Hand {
            cards: Vec::with_capacity(4),
            bet,
            doubled: false,
            from_split: false,
            surrendered: false,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Removes and returns the last card; used when splitting a pair into
    /// two one-card hands.
    pub fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn hard_sum(&self) -> u16 {
        self.cards.iter().map(|c| c.blackjack_value() as u16).sum()
    }

    fn ace_count(&self) -> usize {
        self.cards.iter().filter(|c| c.blackjack_value() == 1).count()
    }

    /// Highest non-busting total, treating aces as soft where possible.
    pub fn total(&self) -> u16 {
        let hard = self.hard_sum();
        if self.ace_count() > 0 && hard + 10 <= 21 {
            hard + 10
        } else {
            hard
        }
    }

    pub fn is_soft(&self) -> bool {
        let hard = self.hard_sum();
        self.ace_count() > 0 && hard + 10 <= 21
    }

    pub fn is_bust(&self) -> bool {
        self.hard_sum() > 21
    }

    /// Two cards of equal blackjack value; 10/J/Q/K count as a pair for
    /// splitting purposes even when ranks differ.
    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].blackjack_value() == self.cards[1].blackjack_value()
    }

    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.total() == 21 && !self.from_split
    }

    /// Splits this hand in place, returning the sibling hand. Both hands
    /// hold exactly one card after the split; the caller deals the second
    /// card to each.
    pub fn split_off(&mut self) -> Hand {
        debug_assert!(self.is_pair());
        let kept_card = self.cards[0];
        let sibling_card = self.cards[1];
        self.cards.clear();
        self.cards.push(kept_card);
        self.from_split = true;

        let mut sibling = Hand::new(self.bet);
        sibling.push(sibling_card);
        sibling.from_split = true;
        sibling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Rank, Suit};

    fn card(rank: Rank) -> Card {
        Card {
            rank,
            suit: Suit::Spade,
        }
    }

    #[test]
    fn soft_total_counts_one_ace_as_eleven() {
        let mut hand = Hand::new(Cents(1000));
        hand.push(card(Rank::Ace));
        hand.push(card(Rank::Six));
        assert_eq!(hand.total(), 17);
        assert!(hand.is_soft());
    }

    #[test]
    fn two_aces_are_hard_twelve() {
        let mut hand = Hand::new(Cents(1000));
        hand.push(card(Rank::Ace));
        hand.push(card(Rank::Ace));
        assert_eq!(hand.total(), 12);
        assert!(hand.is_soft());
        assert!(hand.is_pair());
    }

    #[test]
    fn bust_detection() {
        let mut hand = Hand::new(Cents(1000));
        hand.push(card(Rank::King));
        hand.push(card(Rank::Queen));
        hand.push(card(Rank::Two));
        assert!(hand.is_bust());
    }

    #[test]
    fn mixed_ten_valued_cards_count_as_pair() {
        let mut hand = Hand::new(Cents(1000));
        hand.push(card(Rank::King));
        hand.push(card(Rank::Jack));
        assert!(hand.is_pair());
    }

    #[test]
    fn natural_requires_two_cards_and_not_from_split() {
        let mut hand = Hand::new(Cents(1000));
        hand.push(card(Rank::Ace));
        hand.push(card(Rank::King));
        assert!(hand.is_natural());
        hand.from_split = true;
        assert!(!hand.is_natural());
    }

    #[test]
    fn split_off_produces_two_one_card_hands() {
        let mut hand = Hand::new(Cents(1000));
        hand.push(card(Rank::Eight));
        hand.push(card(Rank::Eight));
        let sibling = hand.split_off();
        assert_eq!(hand.len(), 1);
        assert_eq!(sibling.len(), 1);
        assert!(hand.from_split);
        assert!(sibling.from_split);
    }
}
