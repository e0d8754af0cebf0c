use crate::card::Rank;
use crate::strategy::{Action, TableKind};
use std::error::Error;
use std::fmt::Display;

/// Errors raised by the game model. None of them are recoverable, each one points at a misconfigured
/// simulation (shoe too small, incomplete strategy chart) or a bug in the code driving the game.
#[derive(Debug, Clone, PartialEq)]
pub enum BlackjackGameError {
    /// A card was requested from a shoe with no cards left.
    EmptyShoe,
    /// An outcome was requested for a hand that has not finished playing.
    IncompleteHand {
        player_cards: usize,
        dealer_cards: usize,
    },
    /// `Hand::split` was called on a hand that is not a pair.
    UnsplittableHand { hand: String },
    /// The strategy table has no entry for the given hand key and up card.
    MissingStrategy {
        table: TableKind,
        total: u8,
        up_card: Rank,
    },
    /// The strategy table asked for an action that can never be played in its context.
    IllegalAction { action: Action, hand: String },
}

impl Display for BlackjackGameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlackjackGameError::EmptyShoe => {
                write!(f, "attempted to deal from an empty shoe")
            }
            BlackjackGameError::IncompleteHand {
                player_cards,
                dealer_cards,
            } => write!(
                f,
                "at least one of these hands has not completed playing (player holds {} cards, dealer holds {})",
                player_cards, dealer_cards
            ),
            BlackjackGameError::UnsplittableHand { hand } => {
                write!(f, "hand [{}] is not a pair and cannot be split", hand)
            }
            BlackjackGameError::MissingStrategy {
                table,
                total,
                up_card,
            } => write!(
                f,
                "{} strategy table has no entry for {} against dealer {}",
                table, total, up_card
            ),
            BlackjackGameError::IllegalAction { action, hand } => {
                write!(f, "action {} cannot be played on hand [{}]", action, hand)
            }
        }
    }
}

impl Error for BlackjackGameError {}
