use basic_strategy_lib::{Hand, Outcome, Resolution};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::sync::mpsc::Receiver;

/// One row of the outcome log, a single finished player hand and the dealer hand it was settled against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandRecord {
    pub shoe_id: u32,
    pub round: u32,
    pub player: usize,
    pub hand: usize,
    pub player_cards: String,
    pub value: u8,
    pub blackjack: bool,
    pub doubled: bool,
    pub split: bool,
    pub busted: bool,
    pub dealer_cards: String,
    pub dealer_value: u8,
    pub dealer_blackjack: bool,
    pub dealer_busted: bool,
    pub outcome: Outcome,
    pub payout: f64,
    pub surrendered: bool,
}

impl HandRecord {
    pub fn new(
        shoe_id: u32,
        round: u32,
        player: usize,
        hand_idx: usize,
        hand: &Hand,
        dealer: &Hand,
        resolution: Resolution,
    ) -> Self {
        HandRecord {
            shoe_id,
            round,
            player,
            hand: hand_idx,
            player_cards: hand.to_string(),
            value: hand.value(),
            blackjack: hand.is_blackjack(),
            doubled: hand.doubled,
            split: hand.split,
            busted: hand.is_busted(),
            dealer_cards: dealer.to_string(),
            dealer_value: dealer.value(),
            dealer_blackjack: dealer.is_blackjack(),
            dealer_busted: dealer.is_busted(),
            outcome: resolution.outcome,
            payout: resolution.payout,
            surrendered: hand.surrendered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Comma separated rows under a header row.
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

/// The fixed columns, `Payout` and then `Surrender?` are appended after them.
const HEADERS: [&str; 15] = [
    "Shoe Id",
    "Deal Number",
    "Player",
    "Hand Number",
    "Player Cards",
    "Value",
    "Player BJ",
    "Double?",
    "Split?",
    "Bust?",
    "Dealer Cards",
    "Dealer Value",
    "Dealer BJ",
    "Dealer Bust?",
    "Outcome",
];

/// False flags are written as empty fields.
fn flag(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        ""
    }
}

/// Writes hand outcome records to `writer`.
pub struct OutcomeLog<W: Write> {
    writer: W,
    format: LogFormat,
    record_payout: bool,
    headers_written: bool,
}

impl<W: Write> OutcomeLog<W> {
    pub fn new(writer: W, format: LogFormat, record_payout: bool) -> Self {
        OutcomeLog {
            writer,
            format,
            record_payout,
            headers_written: false,
        }
    }

    fn write_headers(&mut self) -> std::io::Result<()> {
        let mut headers = HEADERS.join(",");
        if self.record_payout {
            headers.push_str(",Payout");
        }
        headers.push_str(",Surrender?");
        writeln!(self.writer, "{}", headers)?;
        self.headers_written = true;
        Ok(())
    }

    fn write_csv(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut row = vec![
            record.shoe_id.to_string(),
            record.round.to_string(),
            record.player.to_string(),
            record.hand.to_string(),
            record.player_cards.clone(),
            record.value.to_string(),
            flag(record.blackjack).to_string(),
            flag(record.doubled).to_string(),
            flag(record.split).to_string(),
            flag(record.busted).to_string(),
            record.dealer_cards.clone(),
            record.dealer_value.to_string(),
            flag(record.dealer_blackjack).to_string(),
            flag(record.dealer_busted).to_string(),
            record.outcome.to_string(),
        ];
        if self.record_payout {
            row.push(record.payout.to_string());
        }
        row.push(flag(record.surrendered).to_string());
        writeln!(self.writer, "{}", row.join(","))
    }

    fn write_json(&mut self, record: &HandRecord) -> std::io::Result<()> {
        let mut value = serde_json::to_value(record)?;
        if !self.record_payout {
            if let Some(object) = value.as_object_mut() {
                object.remove("payout");
            }
        }
        serde_json::to_writer(&mut self.writer, &value)?;
        writeln!(self.writer)
    }

    /// Writes every record from a finished round.
    pub fn log_deal(&mut self, records: &[HandRecord]) -> std::io::Result<()> {
        if self.format == LogFormat::Csv && !self.headers_written {
            self.write_headers()?;
        }
        for record in records {
            match self.format {
                LogFormat::Csv => self.write_csv(record)?,
                LogFormat::Json => self.write_json(record)?,
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Body of the writer thread used by parallel simulations. Each worker sends its rounds tagged with its id
/// and a final `None` once it is done, the thread returns when every id in `ids` has finished or every
/// sender has hung up.
pub fn write_records<W: Write>(
    receiver: Receiver<(Option<Vec<HandRecord>>, usize)>,
    mut ids: HashSet<usize>,
    mut log: OutcomeLog<W>,
) -> std::io::Result<()> {
    while !ids.is_empty() {
        let (records, id) = match receiver.recv() {
            Ok(msg) => msg,
            // Every worker is gone, the ones that failed report their own error
            Err(_) => break,
        };
        match records {
            Some(records) => log.log_deal(&records)?,
            None => {
                log::debug!("worker #{} finished", id);
                ids.remove(&id);
            }
        }
    }
    log.flush()
}

#[cfg(test)]
mod test {
    use super::*;
    use basic_strategy_lib::Rank::{self, *};
    use basic_strategy_lib::{resolve, HouseRules};
    use std::sync::mpsc;

    fn record(round: u32, player: &[Rank], dealer: &[Rank]) -> HandRecord {
        let player = Hand::from_ranks(player);
        let dealer = Hand::from_ranks(dealer);
        let resolution = resolve(&player, &dealer, &HouseRules::default()).unwrap();
        HandRecord::new(2, round, 1, 0, &player, &dealer, resolution)
    }

    fn output(log: OutcomeLog<Vec<u8>>) -> String {
        String::from_utf8(log.into_inner()).unwrap()
    }

    #[test]
    fn test_csv_rows() {
        let mut log = OutcomeLog::new(vec![], LogFormat::Csv, true);
        log.log_deal(&[record(5, &[Ace, King], &[Ten, Nine])]).unwrap();
        log.log_deal(&[record(6, &[Ten, Six, Nine], &[Ten, Seven])]).unwrap();

        let out = output(log);
        let lines = out.lines().collect::<Vec<&str>>();
        assert_eq!(lines.len(), 3);
        let header = lines[0].split(',').collect::<Vec<&str>>();
        assert_eq!(
            header,
            [
                "Shoe Id",
                "Deal Number",
                "Player",
                "Hand Number",
                "Player Cards",
                "Value",
                "Player BJ",
                "Double?",
                "Split?",
                "Bust?",
                "Dealer Cards",
                "Dealer Value",
                "Dealer BJ",
                "Dealer Bust?",
                "Outcome",
                "Payout",
                "Surrender?",
            ]
        );
        assert_eq!(lines[1], "2,5,1,0,Ace King,21,True,,,,Ten Nine,19,,,WIN,1.5,");
        assert_eq!(lines[2], "2,6,1,0,Ten Six Nine,25,,,,True,Ten Seven,17,,,LOSE,-1,");
    }

    #[test]
    fn test_csv_without_payout() {
        let mut surrendered = Hand::from_ranks(&[Ten, Six]);
        surrendered.surrendered = true;
        let dealer = Hand::from_ranks(&[Ace, Seven]);
        let resolution = resolve(&surrendered, &dealer, &HouseRules::default()).unwrap();

        let mut log = OutcomeLog::new(vec![], LogFormat::Csv, false);
        log.log_deal(&[
            record(0, &[Ten, Nine], &[Ten, Nine]),
            HandRecord::new(2, 1, 1, 0, &surrendered, &dealer, resolution),
        ])
        .unwrap();

        let out = output(log);
        let lines = out.lines().collect::<Vec<&str>>();
        let header = lines[0].split(',').collect::<Vec<&str>>();
        assert_eq!(header.len(), 16);
        assert_eq!(header[10], "Dealer Cards");
        assert_eq!(header[14], "Outcome");
        assert_eq!(header[15], "Surrender?");
        assert!(lines[1].ends_with(",PUSH,"));
        assert_eq!(lines[2], "2,1,1,0,Ten Six,16,,,,,Ace Seven,18,,,LOSE,True");
    }

    #[test]
    fn test_json_rows() {
        let mut log = OutcomeLog::new(vec![], LogFormat::Json, false);
        log.log_deal(&[record(1, &[Ten, Nine], &[Ten, Six, Nine])]).unwrap();
        let out = output(log);
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["outcome"], "WIN");
        assert_eq!(value["dealer_busted"], true);
        // JSON keeps its booleans typed, false flags are not blanked
        assert_eq!(value["busted"], false);
        assert_eq!(value["surrendered"], false);
        assert_eq!(value["player_cards"], "Ten Nine");
        assert!(value.get("payout").is_none());
    }

    #[test]
    fn test_write_records() {
        let (sender, receiver) = mpsc::channel();
        let ids = HashSet::from([0, 1]);
        sender.send((Some(vec![record(0, &[Ten, Nine], &[Ten, Eight])]), 0)).unwrap();
        sender.send((None, 0)).unwrap();
        sender.send((Some(vec![record(1, &[Ten, Seven], &[Ten, Eight])]), 1)).unwrap();
        sender.send((None, 1)).unwrap();

        let mut buffer = vec![];
        write_records(receiver, ids, OutcomeLog::new(&mut buffer, LogFormat::Csv, false)).unwrap();
        let out = String::from_utf8(buffer).unwrap();
        assert_eq!(out.lines().count(), 3);
    }
}
