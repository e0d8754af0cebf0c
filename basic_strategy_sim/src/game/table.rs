use crate::game::player::{PlayerSim, TableState};
use crate::write::HandRecord;
use crate::SimulationError;
use basic_strategy_lib::{resolve, BlackjackGameError, Hand, HouseRules, Rank, Shoe, StrategyTable};
use std::sync::Arc;

/// The dealer's hand. The dealer follows a fixed rule and never looks at a strategy chart.
#[derive(Debug, Clone)]
pub struct DealersHandSim {
    pub hand: Hand,
}

impl DealersHandSim {
    pub fn new(hand: Hand) -> Self {
        DealersHandSim { hand }
    }

    /// The dealer's face up card, i.e. the first card dealt to the dealer.
    pub fn up_card(&self) -> Result<Rank, BlackjackGameError> {
        self.hand
            .first_rank()
            .ok_or(BlackjackGameError::IncompleteHand {
                player_cards: 0,
                dealer_cards: 0,
            })
    }

    pub fn has_blackjack(&self) -> bool {
        self.hand.is_blackjack()
    }

    /// Draws until the hand reaches 17, on a soft 17 the dealer keeps drawing only if the house says so.
    pub fn play(&mut self, shoe: &mut Shoe, rules: &HouseRules) -> Result<(), BlackjackGameError> {
        while self.hand.value() < 17
            || (rules.dealer_hits_soft_17 && self.hand.value() == 17 && self.hand.is_soft())
        {
            let card = shoe.deal()?;
            log::trace!("dealer hit: {}", card);
            self.hand.add_card(card);
        }
        Ok(())
    }
}

/// Struct for a simulated blackjack table: the shoe, the chart every seat plays by and the house rules.
pub struct BlackjackTableSim {
    shoe: Shoe,
    strategy: Arc<StrategyTable>,
    rules: HouseRules,
    num_players: usize,
    redraw_threshold: bool,
}

impl BlackjackTableSim {
    pub fn new(
        shoe: Shoe,
        strategy: Arc<StrategyTable>,
        rules: HouseRules,
        num_players: usize,
        redraw_threshold: bool,
    ) -> Self {
        BlackjackTableSim {
            shoe,
            strategy,
            rules,
            num_players,
            redraw_threshold,
        }
    }

    /// Deals two cards to every seat and the dealer, one card at a time going around the table with the
    /// dealer last.
    pub fn deal_hand(&mut self) -> Result<(Vec<Hand>, DealersHandSim), BlackjackGameError> {
        let mut starting_cards = vec![Vec::with_capacity(2); self.num_players];
        let mut dealer_cards = Vec::with_capacity(2);
        for _ in 0..2 {
            for cards in starting_cards.iter_mut() {
                cards.push(self.shoe.deal()?);
            }
            dealer_cards.push(self.shoe.deal()?);
        }
        let hands = starting_cards.into_iter().map(Hand::new).collect();
        Ok((hands, DealersHandSim::new(Hand::new(dealer_cards))))
    }

    /// Plays a complete round and returns one record per finished player hand.
    /// When the dealer has a blackjack nobody acts, and every seat's first two cards are settled against it.
    pub fn play_round(
        &mut self,
        shoe_id: u32,
        round: u32,
    ) -> Result<Vec<HandRecord>, SimulationError> {
        let context = |player: Option<usize>| {
            move |source: BlackjackGameError| SimulationError::GameError {
                shoe_id,
                round,
                player,
                source,
            }
        };

        let (hands, mut dealer) = self.deal_hand().map_err(context(None))?;
        let up_card = dealer.up_card().map_err(context(None))?;
        let mut players = hands.into_iter().map(PlayerSim::new).collect::<Vec<_>>();

        if dealer.has_blackjack() {
            log::debug!("round {}: dealer blackjack, {}", round, dealer.hand);
        } else {
            let state = TableState::new(&self.strategy, &self.rules, up_card);
            for (player_idx, player) in players.iter_mut().enumerate() {
                player
                    .play(&mut self.shoe, &state)
                    .map_err(context(Some(player_idx)))?;
                log::trace!("player #{} {}", player_idx, player);
            }
            dealer
                .play(&mut self.shoe, &self.rules)
                .map_err(context(None))?;
        }

        let mut records = vec![];
        for (player_idx, player) in players.iter().enumerate() {
            for (hand_idx, hand) in player.hands().iter().enumerate() {
                let resolution =
                    resolve(hand, &dealer.hand, &self.rules).map_err(context(Some(player_idx)))?;
                records.push(HandRecord::new(
                    shoe_id,
                    round,
                    player_idx,
                    hand_idx,
                    hand,
                    &dealer.hand,
                    resolution,
                ));
            }
        }
        Ok(records)
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.shoe.needs_reshuffle()
    }

    /// Reshuffles the shoe, only ever called between rounds.
    pub fn reshuffle(&mut self) {
        self.shoe.reshuffle(self.redraw_threshold);
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::strategy::basic_strategy;
    use basic_strategy_lib::{Card, Outcome};
    use Rank::*;

    fn table(ranks: &[Rank], num_players: usize, rules: HouseRules) -> BlackjackTableSim {
        let shoe = Shoe::stacked(6, ranks.iter().copied().map(Card::new).collect());
        BlackjackTableSim::new(shoe, basic_strategy().unwrap(), rules, num_players, false)
    }

    #[test]
    fn test_dealer_stands_on_17() {
        let mut shoe = Shoe::stacked(1, vec![Card::new(Six), Card::new(Ten)]);
        let mut dealer = DealersHandSim::new(Hand::from_ranks(&[Ten, Seven]));
        dealer.play(&mut shoe, &HouseRules::default()).unwrap();
        assert_eq!(dealer.hand.value(), 17);
        assert_eq!(shoe.remaining(), 2);

        let mut dealer = DealersHandSim::new(Hand::from_ranks(&[Ten, Two]));
        dealer.play(&mut shoe, &HouseRules::default()).unwrap();
        assert_eq!(dealer.hand.value(), 18);
        assert_eq!(shoe.remaining(), 1);
    }

    #[test]
    fn test_dealer_soft_17() {
        let stands = HouseRules::default();
        let hits = HouseRules {
            dealer_hits_soft_17: true,
            ..HouseRules::default()
        };

        let mut shoe = Shoe::stacked(1, vec![Card::new(Three)]);
        let mut dealer = DealersHandSim::new(Hand::from_ranks(&[Ace, Six]));
        dealer.play(&mut shoe, &stands).unwrap();
        assert_eq!(dealer.hand.value(), 17);

        dealer.play(&mut shoe, &hits).unwrap();
        assert_eq!(dealer.hand.value(), 20);
        assert_eq!(shoe.remaining(), 0);

        // A hard 17 stands under either rule
        let mut dealer = DealersHandSim::new(Hand::from_ranks(&[Ace, Six, Ten]));
        dealer.play(&mut shoe, &hits).unwrap();
        assert_eq!(dealer.hand.len(), 3);
    }

    #[test]
    fn test_dealer_busts() {
        let mut shoe = Shoe::stacked(1, vec![Card::new(Ten)]);
        let mut dealer = DealersHandSim::new(Hand::from_ranks(&[Ten, Six]));
        dealer.play(&mut shoe, &HouseRules::default()).unwrap();
        assert!(dealer.hand.is_busted());
    }

    #[test]
    fn test_deal_order() {
        // seat 0, seat 1, dealer, seat 0, seat 1, dealer
        let mut table = table(&[Two, Three, Four, Five, Six, Seven], 2, HouseRules::default());
        let (hands, dealer) = table.deal_hand().unwrap();
        assert_eq!(hands[0].to_string(), "Two Five");
        assert_eq!(hands[1].to_string(), "Three Six");
        assert_eq!(dealer.hand.to_string(), "Four Seven");
        assert_eq!(dealer.up_card(), Ok(Four));
    }

    #[test]
    fn test_split_round_logs_two_rows() {
        // seat 0 gets 8 8, dealer shows an ace with a 6 underneath
        let mut table = table(
            &[Eight, Ace, Eight, Six, Three, King, Ten, Nine],
            1,
            HouseRules::default(),
        );
        let records = table.play_round(3, 17).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].player_cards, "Eight Three King");
        assert_eq!(records[1].player_cards, "Eight Ten");
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.shoe_id, 3);
            assert_eq!(record.round, 17);
            assert_eq!(record.player, 0);
            assert_eq!(record.hand, i);
            assert!(record.split);
            assert_eq!(record.dealer_cards, "Ace Six");
            assert_eq!(record.dealer_value, 17);
        }
        assert_eq!(records[0].outcome, Outcome::Win);
        assert_eq!(records[1].outcome, Outcome::Win);
        // The dealer's soft 17 stands, the nine stays in the shoe
        assert_eq!(table.shoe().remaining(), 1);
    }

    #[test]
    fn test_dealer_blackjack_skips_play() {
        // seat 1 holds a natural of its own against the dealer's
        let mut table = table(&[Ten, Ace, Ace, Six, King, King, Five], 2, HouseRules::default());
        let records = table.play_round(0, 0).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].player_cards, "Ten Six");
        assert!(records[0].dealer_blackjack);
        assert_eq!(records[0].outcome, Outcome::Lose);
        assert_eq!(records[0].payout, -1.0);

        assert_eq!(records[1].player_cards, "Ace King");
        assert!(records[1].blackjack);
        assert!(records[1].dealer_blackjack);
        assert_eq!(records[1].outcome, Outcome::Push);
        assert_eq!(records[1].payout, 0.0);

        // Nobody drew, the five stays in the shoe
        assert_eq!(table.shoe().remaining(), 1);
    }

    #[test]
    fn test_surrender_round() {
        // seat 0 holds 10 6 against an ace
        let mut table = table(&[Ten, Ace, Six, Seven, Two], 1, HouseRules::default());
        let records = table.play_round(0, 0).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].player_cards, "Ten Six");
        assert!(records[0].surrendered);
        assert_eq!(records[0].outcome, Outcome::Lose);
        assert_eq!(records[0].payout, -0.5);
        // The dealer stands on the soft 18
        assert_eq!(records[0].dealer_value, 18);
        assert_eq!(table.shoe().remaining(), 1);
    }

    #[test]
    fn test_round_error_carries_context() {
        // Seat 0 hits a hard 5 against a ten with nothing left in the shoe
        let mut table = table(&[Two, Ten, Three, Seven], 1, HouseRules::default());
        match table.play_round(4, 9) {
            Err(SimulationError::GameError {
                shoe_id: 4,
                round: 9,
                player: Some(0),
                source: BlackjackGameError::EmptyShoe,
            }) => {}
            other => panic!("unexpected result {:?}", other.map(|r| r.len())),
        }
    }
}
