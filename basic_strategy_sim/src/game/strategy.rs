//! Loading basic strategy charts. A chart is either the built in `BASIC_STRATEGY` or imported from a
//! comma separated file laid out the way printed charts are:
//!
//! ```text
//! Hard,2,3,4,5,6,7,8,9,10,A
//! 9,H,D,D,D,D,H,H,H,H,H
//! ...
//! Soft,2,3,4,5,6,7,8,9,10,A
//! 18,S,S,S,S,S,S,S,H,H,H
//! ...
//! Pair,2,3,4,5,6,7,8,9,10,A
//! 16,P,P,P,P,P,P,P,P,P,P
//! A,P,P,P,P,P,P,P,P,P,P
//! ```
//!
//! Rows are keyed by hand total, the ace pair row by `A`. A `10` column also covers jacks, queens and kings
//! unless the header gives them columns of their own. Blank lines and lines starting with `#` are skipped.

use basic_strategy_lib::strategy::{pair_keys, HARD_TOTALS, SOFT_TOTALS};
use basic_strategy_lib::{
    Action, BlackjackGameError, Rank, StrategyTable, StrategyTableBuilder, TableKind, ACE_PAIR_KEY,
};
use lazy_static::lazy_static;
use std::error::Error;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

lazy_static! {
    /// The built in chart: multiple decks, dealer stands on soft 17, double after split, late surrender.
    pub static ref BASIC_STRATEGY: Result<Arc<StrategyTable>, BlackjackGameError> =
        build_basic_strategy().map(Arc::new);
}

/// Returns a shared handle to the built in chart.
pub fn basic_strategy() -> Result<Arc<StrategyTable>, StrategyImportError> {
    match &*BASIC_STRATEGY {
        Ok(table) => Ok(Arc::clone(table)),
        Err(e) => Err(StrategyImportError::Incomplete(e.clone())),
    }
}

#[derive(Debug)]
pub enum StrategyImportError {
    Io(String),
    Malformed { line: usize, reason: String },
    Incomplete(BlackjackGameError),
}

impl Display for StrategyImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyImportError::Io(s) => write!(f, "unable to read strategy chart: {}", s),
            StrategyImportError::Malformed { line, reason } => {
                write!(f, "malformed strategy chart at line {}: {}", line, reason)
            }
            StrategyImportError::Incomplete(e) => write!(f, "incomplete strategy chart: {}", e),
        }
    }
}

impl Error for StrategyImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StrategyImportError::Incomplete(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BlackjackGameError> for StrategyImportError {
    fn from(value: BlackjackGameError) -> Self {
        StrategyImportError::Incomplete(value)
    }
}

impl From<std::io::Error> for StrategyImportError {
    fn from(value: std::io::Error) -> Self {
        StrategyImportError::Io(value.to_string())
    }
}

/// Reads and validates the chart at `path`.
pub fn import_strategy<P: AsRef<Path>>(path: P) -> Result<StrategyTable, StrategyImportError> {
    let source = std::fs::read_to_string(path.as_ref())?;
    log::info!("importing strategy chart from {}", path.as_ref().display());
    parse_strategy(&source)
}

/// Parses a chart, see the module documentation for the layout.
pub fn parse_strategy(source: &str) -> Result<StrategyTable, StrategyImportError> {
    let mut builder = StrategyTable::builder();
    let mut section: Option<(TableKind, Vec<Vec<Rank>>)> = None;

    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let cells = trimmed.split(',').map(str::trim).collect::<Vec<&str>>();

        if let Some(kind) = parse_section(cells[0]) {
            section = Some((kind, parse_header(&cells[1..], line)?));
            continue;
        }

        let (kind, columns) = match &section {
            Some((kind, columns)) => (*kind, columns),
            None => {
                return Err(StrategyImportError::Malformed {
                    line,
                    reason: "row appears before a Hard, Soft or Pair header".to_string(),
                })
            }
        };

        let key = parse_key(kind, cells[0]).ok_or_else(|| StrategyImportError::Malformed {
            line,
            reason: format!("'{}' is not a valid {} row", cells[0], kind),
        })?;

        if cells.len() - 1 != columns.len() {
            return Err(StrategyImportError::Malformed {
                line,
                reason: format!(
                    "expected {} actions, found {}",
                    columns.len(),
                    cells.len() - 1
                ),
            });
        }

        for (cell, ranks) in cells[1..].iter().zip(columns.iter()) {
            let action = cell
                .parse::<Action>()
                .map_err(|reason| StrategyImportError::Malformed { line, reason })?;
            for up_card in ranks {
                builder.insert(kind, key, *up_card, action);
            }
        }
    }

    Ok(builder.build()?)
}

fn parse_section(cell: &str) -> Option<TableKind> {
    match cell.to_ascii_lowercase().as_str() {
        "hard" => Some(TableKind::Hard),
        "soft" => Some(TableKind::Soft),
        "pair" | "pairs" => Some(TableKind::Pair),
        _ => None,
    }
}

fn parse_header(labels: &[&str], line: usize) -> Result<Vec<Vec<Rank>>, StrategyImportError> {
    let ranks = labels
        .iter()
        .map(|label| {
            Rank::from_label(label).ok_or_else(|| StrategyImportError::Malformed {
                line,
                reason: format!("'{}' is not a dealer up card", label),
            })
        })
        .collect::<Result<Vec<Rank>, StrategyImportError>>()?;

    let has_faces = ranks
        .iter()
        .any(|r| matches!(r, Rank::Jack | Rank::Queen | Rank::King));
    Ok(ranks
        .into_iter()
        .map(|rank| {
            if rank == Rank::Ten && !has_faces {
                vec![Rank::Ten, Rank::Jack, Rank::Queen, Rank::King]
            } else {
                vec![rank]
            }
        })
        .collect())
}

fn parse_key(kind: TableKind, cell: &str) -> Option<u8> {
    let ace_pair = cell.eq_ignore_ascii_case("a") || cell.eq_ignore_ascii_case("aa");
    if kind == TableKind::Pair && ace_pair {
        return Some(ACE_PAIR_KEY);
    }
    cell.parse::<u8>().ok()
}

/// The column a chart uses for `up_card`, aces are 1 and every ten valued card is 10.
fn column(up_card: Rank) -> u8 {
    match up_card.base_value() {
        11 => 1,
        v => v,
    }
}

fn basic_action(kind: TableKind, total: u8, j: u8) -> Action {
    use Action::*;
    match kind {
        TableKind::Hard => match total {
            9 => match j {
                3..=6 => Double,
                _ => Hit,
            },
            10 => match j {
                2..=9 => Double,
                _ => Hit,
            },
            11 => match j {
                1 => Hit,
                _ => Double,
            },
            12 => match j {
                4..=6 => Stand,
                _ => Hit,
            },
            13 | 14 => match j {
                2..=6 => Stand,
                _ => Hit,
            },
            15 => match j {
                2..=6 => Stand,
                10 => Surrender,
                _ => Hit,
            },
            16 => match j {
                2..=6 => Stand,
                1 | 9 | 10 => Surrender,
                _ => Hit,
            },
            17..=21 => Stand,
            _ => Hit,
        },
        TableKind::Soft => match total {
            13 | 14 => match j {
                5 | 6 => Double,
                _ => Hit,
            },
            15 | 16 => match j {
                4..=6 => Double,
                _ => Hit,
            },
            17 => match j {
                3..=6 => Double,
                _ => Hit,
            },
            18 => match j {
                2..=8 => Stand,
                _ => Hit,
            },
            19..=21 => Stand,
            _ => Hit,
        },
        TableKind::Pair => match total {
            4 | 6 => match j {
                2..=7 => Split,
                _ => Hit,
            },
            8 => match j {
                5 | 6 => Split,
                _ => Hit,
            },
            10 => match j {
                2..=9 => Double,
                _ => Hit,
            },
            12 => match j {
                2..=6 => Split,
                _ => Hit,
            },
            14 => match j {
                2..=7 => Split,
                _ => Hit,
            },
            16 | ACE_PAIR_KEY => Split,
            18 => match j {
                2..=6 | 8 | 9 => Split,
                _ => Stand,
            },
            _ => Stand,
        },
    }
}

/// Populates the three lookup tables of the built in chart.
fn build_basic_strategy() -> Result<StrategyTable, BlackjackGameError> {
    let mut builder: StrategyTableBuilder = StrategyTable::builder();
    for (kind, keys) in [
        (TableKind::Hard, HARD_TOTALS.collect::<Vec<u8>>()),
        (TableKind::Soft, SOFT_TOTALS.collect::<Vec<u8>>()),
        (TableKind::Pair, pair_keys().collect::<Vec<u8>>()),
    ] {
        for total in keys {
            for up_card in Rank::ALL {
                builder.insert(kind, total, up_card, basic_action(kind, total, column(up_card)));
            }
        }
    }
    builder.build()
}
