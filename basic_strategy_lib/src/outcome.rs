use crate::error::BlackjackGameError;
use crate::hand::Hand;
use crate::rules::{HouseRules, NaturalRule};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::Display;

/// Result of a finished player hand against the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Lose,
    Push,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Lose => write!(f, "LOSE"),
            Outcome::Push => write!(f, "PUSH"),
        }
    }
}

/// An `Outcome` together with the payout multiplier applied to the hand's initial bet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub payout: f64,
}

/// Decides the outcome of `player` against `dealer`. Both hands must have finished playing, i.e. hold at
/// least two cards each, otherwise an `IncompleteHand` error is returned.
///
/// The checks run in order: surrender or bust loses, a dealer bust wins, a lone blackjack decides the hand
/// (see `NaturalRule` for the player's side), two blackjacks push, otherwise the higher total wins.
pub fn resolve(
    player: &Hand,
    dealer: &Hand,
    rules: &HouseRules,
) -> Result<Resolution, BlackjackGameError> {
    if player.len() < 2 || dealer.len() < 2 {
        return Err(BlackjackGameError::IncompleteHand {
            player_cards: player.len(),
            dealer_cards: dealer.len(),
        });
    }

    let (outcome, payout) = if player.surrendered {
        (Outcome::Lose, -0.5)
    } else if player.is_busted() {
        (Outcome::Lose, -1.0)
    } else if dealer.is_busted() {
        (Outcome::Win, 1.0)
    } else {
        match (player.is_blackjack(), dealer.is_blackjack()) {
            (true, false) => match rules.natural {
                NaturalRule::Win => (Outcome::Win, rules.blackjack_payout),
                NaturalRule::Push => (Outcome::Push, 0.0),
            },
            (false, true) => (Outcome::Lose, -1.0),
            (true, true) => (Outcome::Push, 0.0),
            (false, false) => match player.value().cmp(&dealer.value()) {
                Ordering::Greater => (Outcome::Win, 1.0),
                Ordering::Less => (Outcome::Lose, -1.0),
                Ordering::Equal => (Outcome::Push, 0.0),
            },
        }
    };

    let payout = if player.doubled { payout * 2.0 } else { payout };
    Ok(Resolution { outcome, payout })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::card::{Card, Rank::*};

    fn rules() -> HouseRules {
        HouseRules::default()
    }

    #[test]
    fn test_incomplete_hand() {
        let player = Hand::from_ranks(&[Ten]);
        let dealer = Hand::from_ranks(&[Nine, Eight]);
        assert_eq!(
            resolve(&player, &dealer, &rules()),
            Err(BlackjackGameError::IncompleteHand {
                player_cards: 1,
                dealer_cards: 2
            })
        );
        assert!(resolve(&dealer, &player, &rules()).is_err());
    }

    #[test]
    fn test_surrender() {
        let mut player = Hand::from_ranks(&[Ten, Six]);
        player.surrendered = true;
        let dealer = Hand::from_ranks(&[Ace, Seven]);
        let res = resolve(&player, &dealer, &rules()).unwrap();
        assert_eq!(res.outcome, Outcome::Lose);
        assert_eq!(res.payout, -0.5);
    }

    #[test]
    fn test_bust_before_dealer_bust() {
        let player = Hand::from_ranks(&[Ten, Six, Nine]);
        let dealer = Hand::from_ranks(&[Ten, Six, Eight]);
        let res = resolve(&player, &dealer, &rules()).unwrap();
        assert_eq!(res.outcome, Outcome::Lose);
        assert_eq!(res.payout, -1.0);

        let player = Hand::from_ranks(&[Ten, Two]);
        let res = resolve(&player, &dealer, &rules()).unwrap();
        assert_eq!(res.outcome, Outcome::Win);
        assert_eq!(res.payout, 1.0);
    }

    #[test]
    fn test_blackjacks() {
        let blackjack = Hand::from_ranks(&[Ace, King]);
        let twenty = Hand::from_ranks(&[Queen, King]);
        let three_card_21 = Hand::from_ranks(&[Seven, Seven, Seven]);

        let res = resolve(&blackjack, &twenty, &rules()).unwrap();
        assert_eq!(
            res,
            Resolution {
                outcome: Outcome::Win,
                payout: 1.5
            }
        );

        // A blackjack beats a 21 made of three cards
        let res = resolve(&blackjack, &three_card_21, &rules()).unwrap();
        assert_eq!(res.outcome, Outcome::Win);
        let res = resolve(&three_card_21, &blackjack, &rules()).unwrap();
        assert_eq!(res.outcome, Outcome::Lose);

        let res = resolve(&blackjack, &blackjack.clone(), &rules()).unwrap();
        assert_eq!(
            res,
            Resolution {
                outcome: Outcome::Push,
                payout: 0.0
            }
        );

        let push_rules = HouseRules {
            natural: NaturalRule::Push,
            ..HouseRules::default()
        };
        let res = resolve(&blackjack, &twenty, &push_rules).unwrap();
        assert_eq!(
            res,
            Resolution {
                outcome: Outcome::Push,
                payout: 0.0
            }
        );
        // The variant only affects the player's side
        let res = resolve(&twenty, &blackjack, &push_rules).unwrap();
        assert_eq!(res.outcome, Outcome::Lose);
    }

    #[test]
    fn test_split_21_is_not_blackjack() {
        let mut aces = Hand::from_ranks(&[Ace, Ace]);
        let _ = aces.split().unwrap();
        aces.add_card(Card::new(King));
        let dealer = Hand::from_ranks(&[Ten, Queen]);
        let res = resolve(&aces, &dealer, &rules()).unwrap();
        assert_eq!(
            res,
            Resolution {
                outcome: Outcome::Win,
                payout: 1.0
            }
        );
    }

    #[test]
    fn test_totals_symmetric() {
        let hands = [
            Hand::from_ranks(&[Ten, Seven]),
            Hand::from_ranks(&[Ten, Eight]),
            Hand::from_ranks(&[Nine, Nine]),
            Hand::from_ranks(&[Ten, Nine]),
            Hand::from_ranks(&[Ten, Five, Five]),
            Hand::from_ranks(&[Ace, Nine]),
        ];
        for a in hands.iter() {
            for b in hands.iter() {
                let forward = resolve(a, b, &rules()).unwrap().outcome;
                let backward = resolve(b, a, &rules()).unwrap().outcome;
                let expected = match forward {
                    Outcome::Win => Outcome::Lose,
                    Outcome::Lose => Outcome::Win,
                    Outcome::Push => Outcome::Push,
                };
                assert_eq!(backward, expected, "{} vs {}", a, b);
                assert_eq!(forward == Outcome::Push, a.value() == b.value());
            }
        }
    }

    #[test]
    fn test_doubled_payouts() {
        let mut player = Hand::from_ranks(&[Six, Five, Ten]);
        player.doubled = true;
        let dealer = Hand::from_ranks(&[Ten, Nine]);
        assert_eq!(resolve(&player, &dealer, &rules()).unwrap().payout, 2.0);

        let mut player = Hand::from_ranks(&[Six, Five, Two]);
        player.doubled = true;
        assert_eq!(resolve(&player, &dealer, &rules()).unwrap().payout, -2.0);

        let mut player = Hand::from_ranks(&[Six, Five, Eight]);
        player.doubled = true;
        assert_eq!(resolve(&player, &dealer, &rules()).unwrap().payout, 0.0);
    }
}
