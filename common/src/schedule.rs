//! Gale schedule: expiration windows and threshold offsets

use crate::signal::Direction;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Minutes from creation until the primary window closes
pub const PRIMARY_WINDOW_MINUTES: i64 = 5;

/// Minutes between consecutive gale expirations
pub const GALE_STEP_MINUTES: i64 = 5;

/// Longest accepted window, one week
pub const MAX_WINDOW_MINUTES: i64 = 7 * 24 * 60;

/// Relative offset of the first gale threshold from the reference price
pub const GALE1_OFFSET: Decimal = dec!(0.002);

/// Relative offset of the second gale threshold from the reference price
pub const GALE2_OFFSET: Decimal = dec!(0.004);

/// Window lengths used to derive the three expirations of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaleSchedule {
    pub primary_window_minutes: i64,
    pub gale_step_minutes: i64,
}

impl Default for GaleSchedule {
    fn default() -> Self {
        Self {
            primary_window_minutes: PRIMARY_WINDOW_MINUTES,
            gale_step_minutes: GALE_STEP_MINUTES,
        }
    }
}

/// The three expirations of a signal, strictly increasing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expirations {
    pub primary: DateTime<Utc>,
    pub gale1: DateTime<Utc>,
    pub gale2: DateTime<Utc>,
}

impl GaleSchedule {
    /// Windows are clamped to `1..=MAX_WINDOW_MINUTES` so the expirations
    /// stay strictly increasing and representable.
    pub fn from_minutes(primary_window_minutes: i64, gale_step_minutes: i64) -> Self {
        Self {
            primary_window_minutes: clamp_window(primary_window_minutes),
            gale_step_minutes: clamp_window(gale_step_minutes),
        }
    }

    /// True when both windows already lie in `1..=MAX_WINDOW_MINUTES`
    pub fn is_within_bounds(&self) -> bool {
        (1..=MAX_WINDOW_MINUTES).contains(&self.primary_window_minutes)
            && (1..=MAX_WINDOW_MINUTES).contains(&self.gale_step_minutes)
    }

    pub fn expirations(&self, now: DateTime<Utc>) -> Expirations {
        let step = Duration::minutes(clamp_window(self.gale_step_minutes));
        let primary = now + Duration::minutes(clamp_window(self.primary_window_minutes));
        let gale1 = primary + step;
        let gale2 = gale1 + step;

        Expirations {
            primary,
            gale1,
            gale2,
        }
    }
}

fn clamp_window(minutes: i64) -> i64 {
    minutes.clamp(1, MAX_WINDOW_MINUTES)
}

/// Threshold price of a gale level.
///
/// PUT thresholds sit above the reference and CALL thresholds below it, so
/// a later favorable move past the threshold still counts as a win.
pub fn gale_threshold(reference: Decimal, direction: Direction, offset: Decimal) -> Decimal {
    match direction {
        Direction::Put => reference * (Decimal::ONE + offset),
        Direction::Call => reference * (Decimal::ONE - offset),
    }
}

/// `HH:MM` in the display offset
pub fn format_time_of_day(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}
