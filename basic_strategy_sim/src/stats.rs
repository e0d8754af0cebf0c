use crate::write::HandRecord;
use basic_strategy_lib::Outcome;
use std::fmt::Display;

/// Simple struct for recording all of the interesting data points accumulated during a simulation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSummary {
    pub rounds: u64,
    pub hands: u64,
    pub wins: u64,
    pub pushes: u64,
    pub losses: u64,
    pub player_blackjacks: u64,
    pub dealer_blackjacks: u64,
    pub doubles: u64,
    pub splits: u64,
    pub surrenders: u64,
    pub busts: u64,
    pub net_payout: f64,
    pub shoes: u64,
}

impl SimulationSummary {
    pub fn new() -> Self {
        SimulationSummary::default()
    }

    /// Records the rows of one finished round.
    pub fn record_round(&mut self, records: &[HandRecord]) {
        self.rounds += 1;
        if records.first().map_or(false, |r| r.dealer_blackjack) {
            self.dealer_blackjacks += 1;
        }
        for record in records {
            self.record(record);
        }
    }

    pub fn record(&mut self, record: &HandRecord) {
        self.hands += 1;
        match record.outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Push => self.pushes += 1,
            Outcome::Lose => self.losses += 1,
        }
        self.player_blackjacks += record.blackjack as u64;
        self.doubles += record.doubled as u64;
        self.splits += record.split as u64;
        self.surrenders += record.surrendered as u64;
        self.busts += record.busted as u64;
        self.net_payout += record.payout;
    }

    /// Folds the counts of another worker's summary into `self`.
    pub fn merge(&mut self, other: &SimulationSummary) {
        self.rounds += other.rounds;
        self.hands += other.hands;
        self.wins += other.wins;
        self.pushes += other.pushes;
        self.losses += other.losses;
        self.player_blackjacks += other.player_blackjacks;
        self.dealer_blackjacks += other.dealer_blackjacks;
        self.doubles += other.doubles;
        self.splits += other.splits;
        self.surrenders += other.surrenders;
        self.busts += other.busts;
        self.net_payout += other.net_payout;
        self.shoes += other.shoes;
    }

    /// Average payout per hand in units of the initial bet, zero before any hand is recorded.
    pub fn expected_value(&self) -> f64 {
        self.ratio_of(self.net_payout)
    }

    pub fn win_percentage(&self) -> f64 {
        self.ratio_of(self.wins as f64)
    }

    pub fn push_percentage(&self) -> f64 {
        self.ratio_of(self.pushes as f64)
    }

    pub fn loss_percentage(&self) -> f64 {
        self.ratio_of(self.losses as f64)
    }

    fn ratio_of(&self, x: f64) -> f64 {
        if self.hands == 0 {
            0.0
        } else {
            x / self.hands as f64
        }
    }
}

impl Display for SimulationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of dealer blackjacks".len() + 20;
        const NUM_WIDTH: usize = WIDTH - TEXT_WIDTH;
        let body = format!(
            "{:-^WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.2}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {:<TEXT_WIDTH$}{:>NUM_WIDTH$.4}\n\
        {}",
            "summary",
            "rounds played",
            self.rounds,
            "shoes used",
            self.shoes,
            "hands played",
            self.hands,
            "hands won",
            self.wins,
            "hands pushed",
            self.pushes,
            "hands lost",
            self.losses,
            "number of player blackjacks",
            self.player_blackjacks,
            "number of dealer blackjacks",
            self.dealer_blackjacks,
            "hands doubled",
            self.doubles,
            "split hands",
            self.splits,
            "hands surrendered",
            self.surrenders,
            "hands busted",
            self.busts,
            "net payout",
            self.net_payout,
            "win percentage",
            self.win_percentage(),
            "push percentage",
            self.push_percentage(),
            "loss percentage",
            self.loss_percentage(),
            "expected value per hand",
            self.expected_value(),
            "-".repeat(WIDTH),
        );
        writeln!(f, "{}", body)
    }
}
