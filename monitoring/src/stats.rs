use common::{Resolution, SignalRecord};
use serde::{Deserialize, Serialize};

/// Summary of how past signals resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total_signals: usize,
    pub pending: usize,
    pub won_primary: usize,
    pub won_gale1: usize,
    pub won_gale2: usize,
    pub losses: usize,
    pub superseded: usize,
    /// Wins over decided signals (wins + losses), `None` before the first decision
    pub win_rate: Option<f64>,
}

impl ResolutionStats {
    pub fn from_records(records: &[SignalRecord]) -> Self {
        let mut stats = Self {
            total_signals: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.resolution {
                None => stats.pending += 1,
                Some(Resolution::WonPrimary) => stats.won_primary += 1,
                Some(Resolution::WonRetry1) => stats.won_gale1 += 1,
                Some(Resolution::WonRetry2) => stats.won_gale2 += 1,
                Some(Resolution::Loss) => stats.losses += 1,
                Some(Resolution::Superseded) => stats.superseded += 1,
            }
        }

        let wins = stats.wins();
        let decided = wins + stats.losses;
        if decided > 0 {
            stats.win_rate = Some(wins as f64 / decided as f64);
        }

        stats
    }

    pub fn wins(&self) -> usize {
        self.won_primary + self.won_gale1 + self.won_gale2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Direction, GaleSchedule, Signal};
    use rust_decimal_macros::dec;

    fn record(resolution: Option<Resolution>) -> SignalRecord {
        let signal = Signal::new("BTCUSDT", Direction::Call, dec!(50000), Utc::now(), &GaleSchedule::default());
        let mut record = SignalRecord::open(signal);
        if let Some(resolution) = resolution {
            record.close(resolution, None, Utc::now());
        }
        record
    }

    #[test]
    fn test_empty_history() {
        let stats = ResolutionStats::from_records(&[]);
        assert_eq!(stats.total_signals, 0);
        assert_eq!(stats.win_rate, None);
    }

    #[test]
    fn test_counts_and_win_rate() {
        let records = vec![
            record(Some(Resolution::WonPrimary)),
            record(Some(Resolution::WonRetry1)),
            record(Some(Resolution::WonRetry2)),
            record(Some(Resolution::Loss)),
            record(Some(Resolution::Superseded)),
            record(None),
        ];

        let stats = ResolutionStats::from_records(&records);

        assert_eq!(stats.total_signals, 6);
        assert_eq!(stats.wins(), 3);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.superseded, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.win_rate, Some(0.75));
    }
}
