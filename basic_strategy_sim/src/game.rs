//! Module that focuses on the simulation of a single chain of shoes. In otherwords, this module provides all
//! the functionality needed to play a fixed number of rounds of basic strategy blackjack at one table.

pub mod player;
pub mod strategy;
pub mod table;
pub mod prelude {
    pub use super::BlackjackGameSim;
    pub use crate::game::player::{PlayerSim, TableState};
    pub use crate::game::strategy::{self, basic_strategy, import_strategy, StrategyImportError};
    pub use crate::game::table::{BlackjackTableSim, DealersHandSim};
    pub use basic_strategy_lib::{BlackjackGameError, HouseRules, Shoe, StrategyTable};
}

pub use prelude::*;

use crate::stats::SimulationSummary;
use crate::write::HandRecord;
use crate::SimulationError;

/// Struct that runs `num_rounds` rounds at a single table. The shoe is reshuffled between rounds whenever its
/// penetration point has been dealt, and every reshuffle starts a new shoe id.
pub struct BlackjackGameSim {
    table: BlackjackTableSim,
    num_rounds: u32,
    shoe_id: u32,
    shoe_id_stride: u32,
}

impl BlackjackGameSim {
    /// Associated method for building a new game. The first shoe gets id `first_shoe_id` and every following
    /// shoe adds `shoe_id_stride`, so games running side by side can keep their shoe ids apart.
    pub fn new(
        table: BlackjackTableSim,
        num_rounds: u32,
        first_shoe_id: u32,
        shoe_id_stride: u32,
    ) -> BlackjackGameSim {
        BlackjackGameSim {
            table,
            num_rounds,
            shoe_id: first_shoe_id,
            shoe_id_stride: shoe_id_stride.max(1),
        }
    }

    /// Runs every round, handing the records of each finished round to `sink` before the shoe is checked for a
    /// reshuffle. Stops at the first error.
    pub fn run<F>(&mut self, mut sink: F) -> Result<SimulationSummary, SimulationError>
    where
        F: FnMut(Vec<HandRecord>) -> Result<(), SimulationError>,
    {
        let mut summary = SimulationSummary::new();
        summary.shoes = 1;
        for round in 0..self.num_rounds {
            let records = self.table.play_round(self.shoe_id, round)?;
            summary.record_round(&records);
            sink(records)?;

            if self.table.needs_reshuffle() {
                log::debug!(
                    "reshuffling shoe #{} after round {}, {} cards left",
                    self.shoe_id,
                    round,
                    self.table.shoe().remaining()
                );
                self.table.reshuffle();
                self.shoe_id += self.shoe_id_stride;
                summary.shoes += 1;
            }
        }
        Ok(summary)
    }
}
