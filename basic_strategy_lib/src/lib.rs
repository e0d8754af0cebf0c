//! Game model for basic strategy blackjack simulations: cards, the shoe, hand valuation, house rules,
//! the read only strategy tables and outcome resolution.

pub mod card;
pub mod error;
pub mod hand;
pub mod outcome;
pub mod rules;
pub mod shoe;
pub mod strategy;

pub use card::{Card, Rank};
pub use error::BlackjackGameError;
pub use hand::Hand;
pub use outcome::{resolve, Outcome, Resolution};
pub use rules::{HouseRules, NaturalRule};
pub use shoe::{Shoe, DECK_SIZE};
pub use strategy::{Action, StrategyTable, StrategyTableBuilder, TableKind, ACE_PAIR_KEY};
