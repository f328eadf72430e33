use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// A suit. Carried for display and full equality; strategy and counting
/// logic only ever look at [`Rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Suit {
    Diamond,
    Club,
    Heart,
    Spade,
}

impl Suit {
    fn glyph(self) -> char {
        match self {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }
}

/// A card rank, `2..=10, J, Q, K, A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Blackjack value; Ace is reported as 1 here, the Hand evaluator is
    /// responsible for treating it as 11 where legal.
    pub fn blackjack_value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 1,
        }
    }

    /// The 1..=10 composition index used by [`crate::probability::CardCount`]
    /// and the counting-system tag tables. 10/J/Q/K all collapse to index 10.
    pub fn composition_index(self) -> u8 {
        self.blackjack_value()
    }

    fn glyph(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    /// Maps a blackjack value (`1..=10`, Ace as `1`) back onto a
    /// representative rank; value `10` returns `Rank::Ten`, one of four
    /// ten-valued ranks sharing that value.
    pub fn from_blackjack_value(value: u8) -> Self {
        match value {
            1 => Rank::Ace,
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            _ => panic!("blackjack values are 1..=10, got {value}"),
        }
    }

    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
}

/// An immutable card. Equality including suit is derived; strategy/count
/// code compares `rank` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn blackjack_value(self) -> u8 {
        self.rank.blackjack_value()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank.glyph(), self.suit.glyph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_cards_are_worth_ten() {
        for rank in [Rank::Ten, Rank::Jack, Rank::Queen, Rank::King] {
            assert_eq!(rank.blackjack_value(), 10);
        }
    }

    #[test]
    fn ace_is_worth_one_at_card_level() {
        assert_eq!(Rank::Ace.blackjack_value(), 1);
    }

    #[test]
    fn display_is_compact() {
        let card = Card {
            rank: Rank::Ace,
            suit: Suit::Spade,
        };
        assert_eq!(card.to_string(), "AS");
    }
}
