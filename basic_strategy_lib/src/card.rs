use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The thirteen ranks of a standard deck, in the order they appear in a strategy chart's columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Ace,
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
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
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
    ];

    /// The value a card of this rank starts with. Aces start high at 11.
    pub fn base_value(&self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }

    /// The english name of the rank, used when rendering hands for the outcome log.
    pub fn name(&self) -> &'static str {
        match self {
            Rank::Ace => "Ace",
            Rank::Two => "Two",
            Rank::Three => "Three",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
        }
    }

    /// Short chart label, i.e. the column header a strategy chart uses for this up card.
    pub fn label(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    /// Parses a chart label such as `"A"`, `"7"` or `"K"`.
    pub fn from_label(label: &str) -> Option<Rank> {
        let label = label.trim();
        Rank::ALL
            .iter()
            .copied()
            .find(|rank| rank.label().eq_ignore_ascii_case(label))
    }

    pub fn is_ten_valued(&self) -> bool {
        self.base_value() == 10
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A playing card. `value` is the card's current effective value, only an ace's value ever moves (between 11 and 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub value: u8,
}

impl Card {
    pub fn new(rank: Rank) -> Card {
        Card {
            rank,
            value: rank.base_value(),
        }
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    /// True if this card is an ace still counted as 11.
    pub fn is_soft_ace(&self) -> bool {
        self.is_ace() && self.value == 11
    }

    /// Counts an ace as 1 from now on. Has no effect on other ranks.
    pub fn demote(&mut self) {
        if self.is_ace() {
            self.value = 1;
        }
    }

    /// Restores the card to the value its rank starts with.
    pub fn reset(&mut self) {
        self.value = self.rank.base_value();
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rank.name())
    }
}
