use anyhow::Context;
use basic_strategy_lib::NaturalRule;
use basic_strategy_sim::prelude::*;
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Simulate basic strategy blackjack and log the outcome of every hand",
    long_about = None
)]
struct Args {
    /// Strategy chart to play by, the built in basic strategy when omitted
    #[arg(short, long)]
    strategy: Option<PathBuf>,
    /// Where the outcome log is written, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON file with simulation settings, flags given here override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Rounds played by each worker
    #[arg(short, long)]
    rounds: Option<u32>,
    #[arg(short, long)]
    players: Option<usize>,
    #[arg(short, long)]
    decks: Option<usize>,
    #[arg(short, long)]
    workers: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Write one JSON object per hand instead of CSV
    #[arg(long)]
    json: bool,
    #[arg(long)]
    hit_soft_17: bool,
    /// A natural only pushes against a dealer 21
    #[arg(long)]
    natural_push: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<BlackjackSimulatorConfig> {
        let mut builder = match &self.config {
            Some(path) => BlackjackSimulatorConfigBuilder::from(ConfigFile::load(path)?),
            None => BlackjackSimulatorConfig::new(),
        };
        if let Some(rounds) = self.rounds {
            builder.num_rounds(rounds);
        }
        if let Some(players) = self.players {
            builder.num_players(players);
        }
        if let Some(decks) = self.decks {
            builder.num_decks(decks);
        }
        if let Some(workers) = self.workers {
            builder.workers(workers);
        }
        if let Some(seed) = self.seed {
            builder.seed(seed);
        }
        if self.json {
            builder.log_format(LogFormat::Json);
        }
        if self.hit_soft_17 {
            builder.dealer_hits_soft_17(true);
        }
        if self.natural_push {
            builder.natural(NaturalRule::Push);
        }
        Ok(builder.build())
    }

    fn strategy(&self) -> anyhow::Result<Arc<StrategyTable>> {
        let table = match &self.strategy {
            Some(path) => Arc::new(
                import_strategy(path)
                    .with_context(|| format!("loading strategy chart {}", path.display()))?,
            ),
            None => basic_strategy()?,
        };
        Ok(table)
    }

    fn output(&self) -> anyhow::Result<Box<dyn Write + Send>> {
        let out: Box<dyn Write + Send> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            )),
            None => Box::new(BufWriter::new(std::io::stdout())),
        };
        Ok(out)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = args.config()?;
    let strategy = args.strategy()?;
    let out = args.output()?;
    log::info!("{}", config.rules);

    let summary = if config.workers > 1 {
        ParallelBlackjackSimulator::new(config, strategy)?.run(out)?
    } else {
        let mut log = OutcomeLog::new(out, config.log_format, config.record_payout);
        BlackjackSimulator::new(config, strategy)?.run(&mut log)?
    };

    eprint!("{}", summary);
    Ok(())
}
