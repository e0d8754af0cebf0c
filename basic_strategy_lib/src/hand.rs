use crate::card::{Card, Rank};
use crate::error::BlackjackGameError;
use crate::rules::HouseRules;
use std::fmt::Display;

/// A hand of blackjack, held either by a player or the dealer.
///
/// Ace valuations are re-derived from scratch every time the cards change: every ace is reset to 11,
/// then aces are demoted to 1 one at a time, in hand order, while the hand is over 21. Because of this
/// `value()` and `is_soft()` are plain reads that always agree with the cards' stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
    pub split: bool,
    pub surrendered: bool,
    pub doubled: bool,
}

impl Hand {
    pub fn new(cards: Vec<Card>) -> Hand {
        let mut hand = Hand {
            cards,
            split: false,
            surrendered: false,
            doubled: false,
        };
        hand.revalue();
        hand
    }

    /// Convenience constructor from ranks, mostly for building known hands.
    pub fn from_ranks(ranks: &[Rank]) -> Hand {
        Hand::new(ranks.iter().copied().map(Card::new).collect())
    }

    fn revalue(&mut self) {
        for card in self.cards.iter_mut() {
            card.reset();
        }
        let mut total: u32 = self.cards.iter().map(|c| c.value as u32).sum();
        for card in self.cards.iter_mut() {
            if total <= 21 {
                break;
            }
            if card.is_soft_ace() {
                card.demote();
                total -= 10;
            }
        }
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.revalue();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Rank of the first card dealt to the hand, i.e. the up card for the dealer.
    pub fn first_rank(&self) -> Option<Rank> {
        self.cards.first().map(|c| c.rank)
    }

    /// The current value of the hand. Values over 21 mean the hand is busted.
    pub fn value(&self) -> u8 {
        self.cards.iter().map(|c| c.value).sum()
    }

    pub fn aces(&self) -> usize {
        self.cards.iter().filter(|c| c.is_ace()).count()
    }

    /// Number of aces currently counted as 11.
    pub fn soft_aces(&self) -> usize {
        self.cards.iter().filter(|c| c.is_soft_ace()).count()
    }

    pub fn is_soft(&self) -> bool {
        self.soft_aces() > 0
    }

    pub fn is_splitable(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank
    }

    /// True if this hand is a pair of aces.
    pub fn is_ace_pair(&self) -> bool {
        self.is_splitable() && self.cards[0].is_ace()
    }

    /// Doubling needs exactly two cards. A hand that came out of a split may only double when the
    /// house allows doubling after a split and the split card is not an ace or ten valued card.
    pub fn can_double(&self, rules: &HouseRules) -> bool {
        self.cards.len() == 2
            && (!self.split
                || (rules.double_after_split
                    && !matches!(self.cards[0].rank.base_value(), 10 | 11)))
    }

    /// A two card 21 that did not come from a split.
    pub fn is_blackjack(&self) -> bool {
        self.value() == 21 && self.cards.len() == 2 && !self.split
    }

    pub fn is_busted(&self) -> bool {
        self.value() > 21
    }

    /// Splits the pair, the last card moves to a new hand. Both hands are marked as split hands.
    pub fn split(&mut self) -> Result<Hand, BlackjackGameError> {
        if !self.is_splitable() {
            return Err(BlackjackGameError::UnsplittableHand {
                hand: self.to_string(),
            });
        }
        let mut new_hand = Hand::new(self.cards.split_off(1));
        self.split = true;
        self.revalue();

        new_hand.split = true;
        Ok(new_hand)
    }
}

impl Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .cards
            .iter()
            .map(|c| c.rank.name())
            .collect::<Vec<&str>>()
            .join(" ");
        write!(f, "{}", names)
    }
}
