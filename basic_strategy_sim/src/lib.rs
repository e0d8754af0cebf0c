pub mod game;
pub mod stats;
pub mod write;

pub use game::prelude::*;
pub use stats::SimulationSummary;
pub use write::{HandRecord, LogFormat, OutcomeLog};

use basic_strategy_lib::{NaturalRule, DECK_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

pub mod prelude {
    pub use super::{
        game::prelude::*,
        stats::SimulationSummary,
        write::{HandRecord, LogFormat, OutcomeLog},
        BlackjackSimulator, BlackjackSimulatorConfig, BlackjackSimulatorConfigBuilder, ConfigFile,
        ParallelBlackjackSimulator, SimulationError,
    };
}

#[derive(Debug)]
pub enum SimulationError {
    /// The strategy chart could not be loaded.
    StrategyError(StrategyImportError),
    /// A round could not be finished, `player` is the seat that was acting if any.
    GameError {
        shoe_id: u32,
        round: u32,
        player: Option<usize>,
        source: BlackjackGameError,
    },
    SendingError(String),
    WriteError(String),
    ConfigError(String),
    WorkerPanic(usize),
}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::StrategyError(e) => write!(f, "strategy error: {}", e),
            SimulationError::GameError {
                shoe_id,
                round,
                player: Some(player),
                source,
            } => write!(
                f,
                "shoe #{} round {} player {}: {}",
                shoe_id, round, player, source
            ),
            SimulationError::GameError {
                shoe_id,
                round,
                player: None,
                source,
            } => write!(f, "shoe #{} round {}: {}", shoe_id, round, source),
            SimulationError::SendingError(s)
            | SimulationError::WriteError(s)
            | SimulationError::ConfigError(s) => write!(f, "{}", s),
            SimulationError::WorkerPanic(id) => write!(f, "worker #{} panicked", id),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulationError::StrategyError(e) => Some(e),
            SimulationError::GameError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StrategyImportError> for SimulationError {
    fn from(value: StrategyImportError) -> Self {
        SimulationError::StrategyError(value)
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(value: std::io::Error) -> Self {
        SimulationError::WriteError(format!("{}", value))
    }
}

/// Struct for running a single simulation on the calling thread, writing every finished hand to an `OutcomeLog`.
pub struct BlackjackSimulator {
    config: BlackjackSimulatorConfig,
    strategy: Arc<StrategyTable>,
}

impl BlackjackSimulator {
    /// Returns an error if `config` does not describe a playable game.
    pub fn new(
        config: BlackjackSimulatorConfig,
        strategy: Arc<StrategyTable>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(BlackjackSimulator { config, strategy })
    }

    /// Runs `config.num_rounds` rounds and returns the summary of every hand played.
    pub fn run<W: Write>(
        &mut self,
        log: &mut OutcomeLog<W>,
    ) -> Result<SimulationSummary, SimulationError> {
        log::info!(
            "running {} rounds, {} players, {} decks",
            self.config.num_rounds,
            self.config.num_players,
            self.config.num_decks
        );
        let table = self.config.table(Arc::clone(&self.strategy), 0);
        let mut game = BlackjackGameSim::new(table, self.config.num_rounds, 0, 1);
        let summary = game.run(|records| {
            log.log_deal(&records)?;
            Ok(())
        })?;
        log.flush()?;
        log::info!("finished {} rounds over {} shoes", summary.rounds, summary.shoes);
        Ok(summary)
    }
}

/// Struct for running `config.workers` independent simulations in parallel. Every worker owns its table and
/// shoe, the only thing shared is the strategy chart. Finished rounds are sent to a single writer thread.
pub struct ParallelBlackjackSimulator {
    pub config: BlackjackSimulatorConfig,
    strategy: Arc<StrategyTable>,
}

impl ParallelBlackjackSimulator {
    pub fn new(
        config: BlackjackSimulatorConfig,
        strategy: Arc<StrategyTable>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(ParallelBlackjackSimulator { config, strategy })
    }

    /// Spawns one thread per worker plus a writer thread that owns `file_out`. Each worker plays
    /// `config.num_rounds` rounds; the returned summary merges every worker.
    pub fn run(
        &self,
        file_out: Box<dyn Write + Send + 'static>,
    ) -> Result<SimulationSummary, SimulationError> {
        let workers = self.config.workers;
        log::info!(
            "running {} rounds on each of {} workers",
            self.config.num_rounds,
            workers
        );

        // Open channel
        let (write_sender, write_receiver) = mpsc::channel::<(Option<Vec<HandRecord>>, usize)>();

        // Every worker signs off with its id, that way the writing thread knows when all of them are done
        let ids = HashSet::from_iter(0..workers);
        let log = OutcomeLog::new(file_out, self.config.log_format, self.config.record_payout);
        let write_handle = thread::spawn(move || write::write_records(write_receiver, ids, log));

        let mut handles = vec![];
        for worker in 0..workers {
            let write_sender = write_sender.clone();
            let table = self.config.table(Arc::clone(&self.strategy), worker);
            let mut game =
                BlackjackGameSim::new(table, self.config.num_rounds, worker as u32, workers as u32);

            let handle = thread::spawn(move || {
                let summary = game.run(|records| {
                    write_sender
                        .send((Some(records), worker))
                        .map_err(|e| SimulationError::SendingError(format!("{}", e)))
                })?;
                // Tell the writing thread we are finished
                write_sender
                    .send((None, worker))
                    .map_err(|e| SimulationError::SendingError(format!("{}", e)))?;
                Ok::<_, SimulationError>(summary)
            });
            handles.push(handle);
        }
        // Only the workers hold senders now, the writer stops once they are all gone
        drop(write_sender);

        let mut summary = SimulationSummary::new();
        let mut first_error = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            let result = handle
                .join()
                .unwrap_or_else(|_| Err(SimulationError::WorkerPanic(worker)));
            match result {
                Ok(worker_summary) => summary.merge(&worker_summary),
                Err(e) => {
                    log::error!("worker #{} failed: {}", worker, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        let write_result = write_handle
            .join()
            .map_err(|_| SimulationError::WriteError("writer thread panicked".to_string()))?;
        // A dead writer makes every worker fail to send, report the writer's error instead
        write_result?;
        if let Some(e) = first_error {
            return Err(e);
        }

        log::info!("finished {} rounds over {} shoes", summary.rounds, summary.shoes);
        Ok(summary)
    }
}

/// Struct for configuring a simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackjackSimulatorConfig {
    pub num_rounds: u32,
    pub num_decks: usize,
    pub num_players: usize,
    pub workers: usize,
    pub seed: Option<u64>,
    pub penetration_min: f64,
    pub penetration_max: f64,
    pub redraw_threshold: bool,
    pub record_payout: bool,
    pub log_format: LogFormat,
    pub rules: HouseRules,
}

impl BlackjackSimulatorConfig {
    /// Associated method for returning a new `BlackjackSimulatorConfigBuilder` object, every setting left alone
    /// takes its default.
    pub fn new() -> BlackjackSimulatorConfigBuilder {
        BlackjackSimulatorConfigBuilder {
            num_rounds: None,
            num_decks: None,
            num_players: None,
            workers: None,
            seed: None,
            penetration_min: None,
            penetration_max: None,
            redraw_threshold: None,
            record_payout: None,
            log_format: None,
            rules: None,
        }
    }

    /// Checks that the configured game can actually be dealt.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let fail = |msg: String| Err(SimulationError::ConfigError(msg));
        if self.num_decks == 0 {
            return fail("a shoe needs at least one deck".to_string());
        }
        if self.num_players == 0 {
            return fail("a table needs at least one player".to_string());
        }
        if self.workers == 0 {
            return fail("at least one worker is needed".to_string());
        }
        if !(0.0 < self.penetration_min
            && self.penetration_min < self.penetration_max
            && self.penetration_max < 1.0)
        {
            return fail(format!(
                "penetration range {}..{} must lie strictly between 0 and 1",
                self.penetration_min, self.penetration_max
            ));
        }
        if self.rules.max_split_hands == 0 {
            return fail("max_split_hands must be at least 1".to_string());
        }
        // The opening deal must fit in what is left of the shoe at its reshuffle point
        let opening = 2 * (self.num_players + 1);
        let reserve = (self.num_decks * DECK_SIZE) as f64 * self.penetration_min;
        if opening as f64 > reserve {
            return fail(format!(
                "{} players cannot be dealt from the last {:.0} cards of a {} deck shoe",
                self.num_players, reserve, self.num_decks
            ));
        }
        Ok(())
    }

    /// Builds the shoe for `worker`. Seeded runs give every worker its own stream, `seed + worker`.
    pub fn shoe(&self, worker: usize) -> Shoe {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
            None => StdRng::from_entropy(),
        };
        Shoe::from_rng(
            self.num_decks,
            self.penetration_min..self.penetration_max,
            rng,
        )
    }

    fn table(&self, strategy: Arc<StrategyTable>, worker: usize) -> BlackjackTableSim {
        BlackjackTableSim::new(
            self.shoe(worker),
            strategy,
            self.rules,
            self.num_players,
            self.redraw_threshold,
        )
    }
}

impl Default for BlackjackSimulatorConfig {
    /// Returns the standard configurations for a six deck, six player table.
    fn default() -> Self {
        BlackjackSimulatorConfig::new().build()
    }
}

/// Struct to implement builder pattern for `BlackjackSimulatorConfig`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackjackSimulatorConfigBuilder {
    num_rounds: Option<u32>,
    num_decks: Option<usize>,
    num_players: Option<usize>,
    workers: Option<usize>,
    seed: Option<u64>,
    penetration_min: Option<f64>,
    penetration_max: Option<f64>,
    redraw_threshold: Option<bool>,
    record_payout: Option<bool>,
    log_format: Option<LogFormat>,
    rules: Option<HouseRules>,
}

impl BlackjackSimulatorConfigBuilder {
    /// Method for setting the number of rounds each worker plays.
    pub fn num_rounds(&mut self, n: u32) -> &mut Self {
        self.num_rounds = Some(n);
        self
    }

    /// Method for choosing the number of decks in the shoe
    pub fn num_decks(&mut self, decks: usize) -> &mut Self {
        self.num_decks = Some(decks);
        self
    }

    /// Method for choosing the number of seats at the table
    pub fn num_players(&mut self, players: usize) -> &mut Self {
        self.num_players = Some(players);
        self
    }

    pub fn workers(&mut self, workers: usize) -> &mut Self {
        self.workers = Some(workers);
        self
    }

    /// Method for making the run reproducible.
    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Method for setting the range the reshuffle point is drawn from, as fractions of the shoe left undealt.
    pub fn penetration(&mut self, min: f64, max: f64) -> &mut Self {
        self.penetration_min = Some(min);
        self.penetration_max = Some(max);
        self
    }

    /// Method for setting a flag that draws a new reshuffle point after every reshuffle
    pub fn redraw_threshold(&mut self, redraw: bool) -> &mut Self {
        self.redraw_threshold = Some(redraw);
        self
    }

    /// Method for setting a flag that adds the payout multiplier to every logged hand
    pub fn record_payout(&mut self, record: bool) -> &mut Self {
        self.record_payout = Some(record);
        self
    }

    pub fn log_format(&mut self, format: LogFormat) -> &mut Self {
        self.log_format = Some(format);
        self
    }

    /// Method for replacing every house rule at once.
    pub fn rules(&mut self, rules: HouseRules) -> &mut Self {
        self.rules = Some(rules);
        self
    }

    /// Method for setting the flag that determines if the dealer must hit soft seventeens, default is false
    pub fn dealer_hits_soft_17(&mut self, hits: bool) -> &mut Self {
        self.rules
            .get_or_insert_with(HouseRules::default)
            .dealer_hits_soft_17 = hits;
        self
    }

    /// Method for choosing how a natural is settled against a non natural 21
    pub fn natural(&mut self, natural: NaturalRule) -> &mut Self {
        self.rules.get_or_insert_with(HouseRules::default).natural = natural;
        self
    }

    /// Method for building a `BlackjackSimulatorConfig` object from the given `BlackjackSimulatorConfigBuilder` object.
    pub fn build(&mut self) -> BlackjackSimulatorConfig {
        BlackjackSimulatorConfig {
            num_rounds: self.num_rounds.unwrap_or(100),
            num_decks: self.num_decks.unwrap_or(6),
            num_players: self.num_players.unwrap_or(6),
            workers: self.workers.unwrap_or(1),
            seed: self.seed,
            penetration_min: self.penetration_min.unwrap_or(0.15),
            penetration_max: self.penetration_max.unwrap_or(0.25),
            redraw_threshold: self.redraw_threshold.unwrap_or(false),
            record_payout: self.record_payout.unwrap_or(true),
            log_format: self.log_format.unwrap_or_default(),
            rules: self.rules.unwrap_or_default(),
        }
    }
}

/// A struct for deserializing a simulation configuration from json, every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub num_rounds: Option<u32>,
    pub num_decks: Option<usize>,
    pub num_players: Option<usize>,
    pub workers: Option<usize>,
    pub seed: Option<u64>,
    pub penetration_min: Option<f64>,
    pub penetration_max: Option<f64>,
    pub redraw_threshold: Option<bool>,
    pub record_payout: Option<bool>,
    pub log_format: Option<LogFormat>,
    pub rules: Option<HouseRules>,
}

impl ConfigFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ConfigFile, SimulationError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            SimulationError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        ConfigFile::parse(&source)
    }

    pub fn parse(source: &str) -> Result<ConfigFile, SimulationError> {
        serde_json::from_str(source)
            .map_err(|e| SimulationError::ConfigError(format!("invalid config: {}", e)))
    }
}

impl From<ConfigFile> for BlackjackSimulatorConfigBuilder {
    fn from(value: ConfigFile) -> Self {
        BlackjackSimulatorConfigBuilder {
            num_rounds: value.num_rounds,
            num_decks: value.num_decks,
            num_players: value.num_players,
            workers: value.workers,
            seed: value.seed,
            penetration_min: value.penetration_min,
            penetration_max: value.penetration_max,
            redraw_threshold: value.redraw_threshold,
            record_payout: value.record_payout,
            log_format: value.log_format,
            rules: value.rules,
        }
    }
}

impl From<ConfigFile> for BlackjackSimulatorConfig {
    fn from(value: ConfigFile) -> Self {
        BlackjackSimulatorConfigBuilder::from(value).build()
    }
}
