use crate::card::{Card, Rank};
use crate::error::BlackjackGameError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Number of cards in a single deck.
pub const DECK_SIZE: usize = 52;

/// Default range the penetration threshold is drawn from, as a fraction of the shoe left undealt.
pub const DEFAULT_PENETRATION: Range<f64> = 0.15..0.25;

/// A shoe made up of `decks` shuffled decks. Cards are dealt off the end of `cards`.
/// Once the fraction of cards remaining drops below `penetration_threshold` the shoe flags itself
/// for a reshuffle, the reshuffle itself happens between rounds when the owner calls `reshuffle`.
pub struct Shoe {
    decks: usize,
    cards: Vec<Card>,
    penetration: Range<f64>,
    penetration_threshold: f64,
    reshuffle_flag: bool,
    rng: StdRng,
}

impl Shoe {
    /// Associated method for building a freshly shuffled shoe seeded from system entropy.
    pub fn new(decks: usize) -> Shoe {
        Shoe::from_rng(decks, DEFAULT_PENETRATION, StdRng::from_entropy())
    }

    /// Builds a shoe whose shuffles and threshold are reproducible from `seed`.
    pub fn with_seed(decks: usize, seed: u64) -> Shoe {
        Shoe::from_rng(decks, DEFAULT_PENETRATION, StdRng::seed_from_u64(seed))
    }

    /// Builds a shoe with a custom penetration range, e.g. from a simulation config.
    pub fn from_rng(decks: usize, penetration: Range<f64>, mut rng: StdRng) -> Shoe {
        let penetration_threshold = rng.gen_range(penetration.clone());
        let mut shoe = Shoe {
            decks,
            cards: Vec::with_capacity(decks * DECK_SIZE),
            penetration,
            penetration_threshold,
            reshuffle_flag: false,
            rng,
        };
        shoe.fill();
        shoe
    }

    /// Builds an unshuffled shoe that deals `cards` in the order given. `decks` is only used for
    /// penetration bookkeeping, so a short stack flags itself for a reshuffle almost at once.
    pub fn stacked(decks: usize, cards: Vec<Card>) -> Shoe {
        let mut cards = cards;
        cards.reverse();
        Shoe {
            decks,
            cards,
            penetration: DEFAULT_PENETRATION,
            penetration_threshold: DEFAULT_PENETRATION.start,
            reshuffle_flag: false,
            rng: StdRng::seed_from_u64(0),
        }
    }

    fn fill(&mut self) {
        self.cards.clear();
        for _ in 0..self.decks {
            for rank in Rank::ALL {
                for _ in 0..4 {
                    self.cards.push(Card::new(rank));
                }
            }
        }
        self.cards.shuffle(&mut self.rng);
    }

    /// Removes the next card from the shoe. Raises the reshuffle flag once the remaining fraction of the
    /// shoe is below the penetration threshold.
    pub fn deal(&mut self) -> Result<Card, BlackjackGameError> {
        let card = self.cards.pop().ok_or(BlackjackGameError::EmptyShoe)?;
        if !self.reshuffle_flag && self.remaining_fraction() < self.penetration_threshold {
            log::debug!(
                "shoe penetration reached, {} of {} cards remaining",
                self.cards.len(),
                self.total()
            );
            self.reshuffle_flag = true;
        }
        Ok(card)
    }

    /// Replaces the contents of the shoe with a full freshly shuffled set of cards and clears the flag.
    /// The threshold is kept unless `redraw_threshold` is set.
    pub fn reshuffle(&mut self, redraw_threshold: bool) {
        self.fill();
        self.reshuffle_flag = false;
        if redraw_threshold {
            self.penetration_threshold = self.rng.gen_range(self.penetration.clone());
        }
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.reshuffle_flag
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Size of a full shoe.
    pub fn total(&self) -> usize {
        self.decks * DECK_SIZE
    }

    pub fn penetration_threshold(&self) -> f64 {
        self.penetration_threshold
    }

    fn remaining_fraction(&self) -> f64 {
        (self.cards.len() as f64) / (self.total() as f64)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_new_shoe() {
        let shoe = Shoe::with_seed(6, 7);
        assert_eq!(shoe.remaining(), 312);
        assert_eq!(shoe.total(), 312);
        assert!(!shoe.needs_reshuffle());
        assert!(shoe.penetration_threshold() >= 0.15 && shoe.penetration_threshold() < 0.25);

        let mut counts: HashMap<Rank, usize> = HashMap::new();
        for card in shoe.cards.iter() {
            *counts.entry(card.rank).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 13);
        assert!(counts.values().all(|c| *c == 24));
    }

    #[test]
    fn test_reshuffle_flag() {
        let mut shoe = Shoe::with_seed(6, 42);
        let threshold = shoe.penetration_threshold();
        while !shoe.needs_reshuffle() {
            let before = shoe.remaining();
            shoe.deal().unwrap();
            assert_eq!(shoe.remaining(), before - 1);
        }
        // The flag goes up on the first deal that leaves the shoe below its threshold
        assert!((shoe.remaining() as f64) < threshold * 312.0);
        assert!(((shoe.remaining() + 1) as f64) >= threshold * 312.0);

        // and stays up for the rest of the round
        shoe.deal().unwrap();
        assert!(shoe.needs_reshuffle());

        shoe.reshuffle(false);
        assert_eq!(shoe.remaining(), 312);
        assert!(!shoe.needs_reshuffle());
        assert_eq!(shoe.penetration_threshold(), threshold);
    }

    #[test]
    fn test_redraw_threshold_stays_in_range() {
        let mut shoe = Shoe::with_seed(2, 3);
        for _ in 0..20 {
            shoe.reshuffle(true);
            let t = shoe.penetration_threshold();
            assert!((0.15..0.25).contains(&t));
        }
    }

    #[test]
    fn test_empty_shoe() {
        let mut shoe = Shoe::stacked(1, vec![Card::new(Rank::Five)]);
        assert_eq!(shoe.deal().unwrap().rank, Rank::Five);
        assert_eq!(shoe.deal(), Err(BlackjackGameError::EmptyShoe));
    }

    #[test]
    fn test_stacked_order() {
        let mut shoe = Shoe::stacked(
            1,
            vec![Rank::Two, Rank::Three, Rank::King]
                .into_iter()
                .map(Card::new)
                .collect(),
        );
        assert_eq!(shoe.deal().unwrap().rank, Rank::Two);
        assert_eq!(shoe.deal().unwrap().rank, Rank::Three);
        assert_eq!(shoe.deal().unwrap().rank, Rank::King);
    }

    #[test]
    fn test_seeded_shoes_match() {
        let mut a = Shoe::with_seed(1, 99);
        let mut b = Shoe::with_seed(1, 99);
        for _ in 0..52 {
            assert_eq!(a.deal().unwrap(), b.deal().unwrap());
        }
    }
}
