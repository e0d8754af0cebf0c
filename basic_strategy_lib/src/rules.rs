use serde::Deserialize;
use std::fmt::Display;

/// How a player's blackjack is settled when the dealer does not also have one.
/// Historical versions of this game disagreed on this, so it is a house rule rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalRule {
    /// The player's blackjack wins and pays `blackjack_payout`.
    #[default]
    Win,
    /// The player's blackjack is a push.
    Push,
}

impl Display for NaturalRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NaturalRule::Win => write!(f, "win"),
            NaturalRule::Push => write!(f, "push"),
        }
    }
}

/// The house rules the decision loop, dealer and outcome resolver read. Read only once a simulation starts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HouseRules {
    /// Maximum number of hands a player may hold at once through splitting.
    pub max_split_hands: usize,
    /// Dealer draws on a soft 17.
    pub dealer_hits_soft_17: bool,
    /// A hand made of split aces may be split again.
    pub resplit_aces: bool,
    /// Doubling is allowed on a hand that came out of a split.
    pub double_after_split: bool,
    /// Late surrender is offered on a player's first two cards.
    pub surrender: bool,
    pub natural: NaturalRule,
    /// Multiplier paid on a winning blackjack.
    pub blackjack_payout: f64,
}

impl Default for HouseRules {
    fn default() -> Self {
        HouseRules {
            max_split_hands: 4,
            dealer_hits_soft_17: false,
            resplit_aces: false,
            double_after_split: true,
            surrender: true,
            natural: NaturalRule::Win,
            blackjack_payout: 1.5,
        }
    }
}

impl Display for HouseRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "max split hands: {}, dealer {} soft 17, resplit aces: {}, double after split: {}, surrender: {}, natural: {} ({:.2})",
            self.max_split_hands,
            if self.dealer_hits_soft_17 { "hits" } else { "stands on" },
            self.resplit_aces,
            self.double_after_split,
            self.surrender,
            self.natural,
            self.blackjack_payout,
        )
    }
}
