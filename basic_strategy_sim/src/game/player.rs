use basic_strategy_lib::{
    Action, BlackjackGameError, Hand, HouseRules, Rank, Shoe, StrategyTable, TableKind,
    ACE_PAIR_KEY,
};
use std::fmt::Display;

/// Everything a player needs to know about the table to decide how to play a hand.
pub struct TableState<'a> {
    pub strategy: &'a StrategyTable,
    pub rules: &'a HouseRules,
    pub dealers_up_card: Rank,
}

impl<'a> TableState<'a> {
    pub fn new(strategy: &'a StrategyTable, rules: &'a HouseRules, dealers_up_card: Rank) -> Self {
        TableState {
            strategy,
            rules,
            dealers_up_card,
        }
    }
}

/// Struct for a simulated player following basic strategy. Starts with a single hand, splitting appends new
/// hands to the end of `hands`, and hands are played to completion in the order they were created.
#[derive(Debug, Clone)]
pub struct PlayerSim {
    hands: Vec<Hand>,
}

impl PlayerSim {
    pub fn new(hand: Hand) -> PlayerSim {
        PlayerSim { hands: vec![hand] }
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    /// Plays every hand, including the ones created by splits, until each one stands, busts, doubles,
    /// surrenders or is a blackjack.
    pub fn play(&mut self, shoe: &mut Shoe, state: &TableState) -> Result<(), BlackjackGameError> {
        let mut hand_idx = 0;
        while hand_idx < self.hands.len() {
            log::trace!("playing hand #{}: {}", hand_idx, self.hands[hand_idx]);
            self.play_hand(hand_idx, shoe, state)?;
            hand_idx += 1;
        }
        Ok(())
    }

    /// Returns true if the hand at `hand_idx` may be split under `rules`.
    fn can_split(&self, hand_idx: usize, rules: &HouseRules) -> bool {
        let hand = &self.hands[hand_idx];
        hand.is_splitable()
            && self.hands.len() < rules.max_split_hands
            && (!hand.is_ace_pair() || !hand.split || rules.resplit_aces)
    }

    /// Looks up the chart's action for the hand at `hand_idx`. A splittable pair reads the pair table, then soft
    /// hands read the soft table and everything else the hard table.
    pub fn decide_option(
        &self,
        hand_idx: usize,
        state: &TableState,
    ) -> Result<Action, BlackjackGameError> {
        let hand = &self.hands[hand_idx];
        let (kind, key) = if self.can_split(hand_idx, state.rules) {
            let key = if hand.is_ace_pair() {
                ACE_PAIR_KEY
            } else {
                hand.value()
            };
            (TableKind::Pair, key)
        } else if hand.is_soft() {
            (TableKind::Soft, hand.value())
        } else {
            (TableKind::Hard, hand.value())
        };
        state.strategy.lookup(kind, key, state.dealers_up_card)
    }

    fn hit(&mut self, hand_idx: usize, shoe: &mut Shoe) -> Result<(), BlackjackGameError> {
        let card = shoe.deal()?;
        log::trace!("hand #{} hit: {}", hand_idx, card);
        self.hands[hand_idx].add_card(card);
        Ok(())
    }

    fn play_hand(
        &mut self,
        hand_idx: usize,
        shoe: &mut Shoe,
        state: &TableState,
    ) -> Result<(), BlackjackGameError> {
        loop {
            // A hand fresh out of a split holds a single card
            if self.hands[hand_idx].len() < 2 {
                self.hit(hand_idx, shoe)?;
            }

            let hand = &self.hands[hand_idx];
            if hand.is_busted() || hand.is_blackjack() {
                return Ok(());
            }

            let two_cards = hand.len() == 2;
            let can_double = two_cards && hand.can_double(state.rules);
            let can_surrender = two_cards && state.rules.surrender;

            match self.decide_option(hand_idx, state)? {
                Action::Double if can_double => {
                    log::trace!("hand #{} double down", hand_idx);
                    self.hands[hand_idx].doubled = true;
                    return self.hit(hand_idx, shoe);
                }
                Action::Surrender if can_surrender => {
                    log::trace!("hand #{} surrender", hand_idx);
                    self.hands[hand_idx].surrendered = true;
                    return Ok(());
                }
                Action::Hit | Action::Double | Action::Surrender => {
                    self.hit(hand_idx, shoe)?;
                }
                Action::Split => {
                    if !self.can_split(hand_idx, state.rules) {
                        return Err(BlackjackGameError::IllegalAction {
                            action: Action::Split,
                            hand: self.hands[hand_idx].to_string(),
                        });
                    }
                    let new_hand = self.hands[hand_idx].split()?;
                    log::trace!("hand #{} split {}", hand_idx, new_hand);
                    self.hands.push(new_hand);
                }
                Action::Stand => return Ok(()),
            }
        }
    }
}

impl Display for PlayerSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hands = self
            .hands
            .iter()
            .map(|h| format!("[{}] {}", h, h.value()))
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{:<21}{}", "hands:", hands)
    }
}
