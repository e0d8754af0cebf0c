use crate::card::Rank;
use crate::error::BlackjackGameError;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Pair table key used for a pair of aces. A pair of aces totals 12, which would collide with a pair of
/// sixes, so aces get a key no two card total can reach.
pub const ACE_PAIR_KEY: u8 = 22;

/// Hand totals every hard table must cover.
pub const HARD_TOTALS: std::ops::RangeInclusive<u8> = 4..=21;
/// Hand totals every soft table must cover. A soft 12 is a pair of aces that may not be split.
pub const SOFT_TOTALS: std::ops::RangeInclusive<u8> = 12..=21;

/// Keys every pair table must cover, pairs of twos through tens plus the ace pair.
pub fn pair_keys() -> impl Iterator<Item = u8> {
    (4..=20).step_by(2).chain(std::iter::once(ACE_PAIR_KEY))
}

/// A playing decision from a strategy chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
    Surrender,
}

impl Action {
    /// The chart code of the action.
    pub fn code(&self) -> &'static str {
        match self {
            Action::Stand => "S",
            Action::Hit => "H",
            Action::Double => "D",
            Action::Split => "P",
            Action::Surrender => "Sr",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Action::Stand),
            "H" => Ok(Action::Hit),
            "D" => Ok(Action::Double),
            "P" => Ok(Action::Split),
            "SR" | "R" => Ok(Action::Surrender),
            other => Err(format!("unknown action code '{}'", other)),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Stand => write!(f, "stand"),
            Action::Hit => write!(f, "hit"),
            Action::Double => write!(f, "double down"),
            Action::Split => write!(f, "split"),
            Action::Surrender => write!(f, "surrender"),
        }
    }
}

/// Which of the three lookup tables an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Hard,
    Soft,
    Pair,
}

impl Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Hard => write!(f, "hard"),
            TableKind::Soft => write!(f, "soft"),
            TableKind::Pair => write!(f, "pair"),
        }
    }
}

/// The three basic strategy lookup tables, keyed by `(hand key, dealer up card)`.
/// Built once through `StrategyTableBuilder` and read only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyTable {
    hard_totals: HashMap<(u8, Rank), Action>,
    soft_totals: HashMap<(u8, Rank), Action>,
    pair_totals: HashMap<(u8, Rank), Action>,
}

impl StrategyTable {
    /// Returns a new `StrategyTableBuilder`.
    pub fn builder() -> StrategyTableBuilder {
        StrategyTableBuilder {
            hard_totals: HashMap::new(),
            soft_totals: HashMap::new(),
            pair_totals: HashMap::new(),
        }
    }

    fn table(&self, kind: TableKind) -> &HashMap<(u8, Rank), Action> {
        match kind {
            TableKind::Hard => &self.hard_totals,
            TableKind::Soft => &self.soft_totals,
            TableKind::Pair => &self.pair_totals,
        }
    }

    /// Looks up the action for `key` against the dealer's `up_card`. A miss means the chart does not cover a
    /// reachable hand, which is a configuration error.
    pub fn lookup(
        &self,
        kind: TableKind,
        key: u8,
        up_card: Rank,
    ) -> Result<Action, BlackjackGameError> {
        self.table(kind)
            .get(&(key, up_card))
            .copied()
            .ok_or(BlackjackGameError::MissingStrategy {
                table: kind,
                total: key,
                up_card,
            })
    }

    pub fn len(&self, kind: TableKind) -> usize {
        self.table(kind).len()
    }
}

/// Builder for a `StrategyTable`. `build` checks that every reachable hand is covered against every up card.
#[derive(Debug, Clone, Default)]
pub struct StrategyTableBuilder {
    hard_totals: HashMap<(u8, Rank), Action>,
    soft_totals: HashMap<(u8, Rank), Action>,
    pair_totals: HashMap<(u8, Rank), Action>,
}

impl StrategyTableBuilder {
    /// Sets the action for `key` against `up_card`, replacing any earlier entry.
    pub fn insert(&mut self, kind: TableKind, key: u8, up_card: Rank, action: Action) -> &mut Self {
        let table = match kind {
            TableKind::Hard => &mut self.hard_totals,
            TableKind::Soft => &mut self.soft_totals,
            TableKind::Pair => &mut self.pair_totals,
        };
        table.insert((key, up_card), action);
        self
    }

    /// Sets the same action for `key` against every up card.
    pub fn row(&mut self, kind: TableKind, key: u8, action: Action) -> &mut Self {
        for up_card in Rank::ALL {
            self.insert(kind, key, up_card, action);
        }
        self
    }

    fn check(
        &self,
        kind: TableKind,
        keys: impl Iterator<Item = u8>,
    ) -> Result<(), BlackjackGameError> {
        let table = match kind {
            TableKind::Hard => &self.hard_totals,
            TableKind::Soft => &self.soft_totals,
            TableKind::Pair => &self.pair_totals,
        };
        for key in keys {
            for up_card in Rank::ALL {
                if !table.contains_key(&(key, up_card)) {
                    return Err(BlackjackGameError::MissingStrategy {
                        table: kind,
                        total: key,
                        up_card,
                    });
                }
            }
        }
        // Splits only make sense in the pair table
        if kind != TableKind::Pair {
            if let Some(((total, _), action)) =
                table.iter().find(|(_, action)| **action == Action::Split)
            {
                return Err(BlackjackGameError::IllegalAction {
                    action: *action,
                    hand: format!("{} {}", kind, total),
                });
            }
        }
        Ok(())
    }

    /// Validates the tables and builds the read only `StrategyTable`.
    pub fn build(&self) -> Result<StrategyTable, BlackjackGameError> {
        self.check(TableKind::Hard, HARD_TOTALS)?;
        self.check(TableKind::Soft, SOFT_TOTALS)?;
        self.check(TableKind::Pair, pair_keys())?;
        Ok(StrategyTable {
            hard_totals: self.hard_totals.clone(),
            soft_totals: self.soft_totals.clone(),
            pair_totals: self.pair_totals.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A complete table that stands on everything, for overriding single cells in tests.
    pub(crate) fn standing_builder() -> StrategyTableBuilder {
        let mut builder = StrategyTable::builder();
        for total in HARD_TOTALS {
            builder.row(TableKind::Hard, total, Action::Stand);
        }
        for total in SOFT_TOTALS {
            builder.row(TableKind::Soft, total, Action::Stand);
        }
        for key in pair_keys() {
            builder.row(TableKind::Pair, key, Action::Stand);
        }
        builder
    }

    #[test]
    fn test_action_codes() {
        for action in [
            Action::Stand,
            Action::Hit,
            Action::Double,
            Action::Split,
            Action::Surrender,
        ] {
            assert_eq!(action.code().parse::<Action>(), Ok(action));
        }
        assert_eq!("sr".parse::<Action>(), Ok(Action::Surrender));
        assert!("X".parse::<Action>().is_err());
    }

    #[test]
    fn test_lookup() {
        let table = standing_builder()
            .insert(TableKind::Hard, 16, Rank::Ten, Action::Hit)
            .build()
            .unwrap();
        assert_eq!(table.lookup(TableKind::Hard, 16, Rank::Ten), Ok(Action::Hit));
        assert_eq!(table.lookup(TableKind::Hard, 16, Rank::Six), Ok(Action::Stand));
        assert_eq!(
            table.lookup(TableKind::Hard, 30, Rank::Six),
            Err(BlackjackGameError::MissingStrategy {
                table: TableKind::Hard,
                total: 30,
                up_card: Rank::Six
            })
        );
        assert_eq!(table.len(TableKind::Pair), 10 * 13);
    }

    #[test]
    fn test_incomplete_table_rejected() {
        let mut builder = standing_builder();
        builder.soft_totals.remove(&(13, Rank::King));
        assert_eq!(
            builder.build(),
            Err(BlackjackGameError::MissingStrategy {
                table: TableKind::Soft,
                total: 13,
                up_card: Rank::King
            })
        );
    }

    #[test]
    fn test_split_outside_pair_table_rejected() {
        let result = standing_builder()
            .insert(TableKind::Hard, 16, Rank::Ace, Action::Split)
            .build();
        assert!(matches!(
            result,
            Err(BlackjackGameError::IllegalAction {
                action: Action::Split,
                ..
            })
        ));
    }
}
