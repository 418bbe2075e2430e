use crate::schedule::{gale_threshold, GaleSchedule, GALE1_OFFSET, GALE2_OFFSET};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expected price move of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Price expected to fall
    Put,
    /// Price expected to rise
    Call,
}

impl Direction {
    /// Whether `price` sits on the winning side of `threshold`
    pub fn is_favorable(&self, price: Decimal, threshold: Decimal) -> bool {
        match self {
            Direction::Put => price < threshold,
            Direction::Call => price > threshold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Put => "PUT",
            Direction::Call => "CALL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gale retry level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaleLevel {
    pub threshold: Decimal,
    pub expires_at: DateTime<Utc>,
}

impl GaleLevel {
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// A published trading signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub symbol: String,
    pub direction: Direction,
    pub reference_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub gale1: Option<GaleLevel>,
    pub gale2: Option<GaleLevel>,
}

impl Signal {
    /// Build a signal with both gale levels derived from the schedule
    pub fn new(
        symbol: impl Into<String>,
        direction: Direction,
        reference_price: Decimal,
        now: DateTime<Utc>,
        schedule: &GaleSchedule,
    ) -> Self {
        let times = schedule.expirations(now);

        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            direction,
            reference_price,
            created_at: now,
            expires_at: times.primary,
            gale1: Some(GaleLevel {
                threshold: gale_threshold(reference_price, direction, GALE1_OFFSET),
                expires_at: times.gale1,
            }),
            gale2: Some(GaleLevel {
                threshold: gale_threshold(reference_price, direction, GALE2_OFFSET),
                expires_at: times.gale2,
            }),
        }
    }

    pub fn primary_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    /// Latest expiration among the primary window and the gale levels present
    pub fn final_expiry(&self) -> DateTime<Utc> {
        [&self.gale1, &self.gale2]
            .into_iter()
            .flatten()
            .map(|level| level.expires_at)
            .fold(self.expires_at, |latest, at| latest.max(at))
    }

    pub fn all_windows_closed(&self, now: DateTime<Utc>) -> bool {
        now > self.final_expiry()
    }
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    NoPendingSignal,
    StillPending,
    WonPrimary,
    WonRetry1,
    WonRetry2,
    Loss,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        self.resolution().is_some()
    }

    /// History entry recorded for a terminal outcome
    pub fn resolution(&self) -> Option<Resolution> {
        match self {
            Outcome::WonPrimary => Some(Resolution::WonPrimary),
            Outcome::WonRetry1 => Some(Resolution::WonRetry1),
            Outcome::WonRetry2 => Some(Resolution::WonRetry2),
            Outcome::Loss => Some(Resolution::Loss),
            Outcome::NoPendingSignal | Outcome::StillPending => None,
        }
    }
}

/// How a history record left the pending state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    WonPrimary,
    WonRetry1,
    WonRetry2,
    Loss,
    /// Replaced by a newer signal before it was evaluated
    Superseded,
}

impl Resolution {
    pub fn is_win(&self) -> bool {
        matches!(
            self,
            Resolution::WonPrimary | Resolution::WonRetry1 | Resolution::WonRetry2
        )
    }
}

/// Signal history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub signal: Signal,
    #[serde(default)]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
}

impl SignalRecord {
    pub fn open(signal: Signal) -> Self {
        Self {
            signal,
            resolution: None,
            resolved_at: None,
            exit_price: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.resolution.is_none()
    }

    pub fn close(&mut self, resolution: Resolution, exit_price: Option<Decimal>, at: DateTime<Utc>) {
        self.resolution = Some(resolution);
        self.exit_price = exit_price;
        self.resolved_at = Some(at);
    }
}
