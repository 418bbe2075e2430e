// Collaborator interfaces
// Market data, notification delivery and signal persistence

use crate::error::{SignalError, SignalResult};
use crate::signal::{Resolution, Signal, SignalRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Source of tradable instruments and spot prices.
///
/// Implementations fail soft: an unreachable source yields an empty list or
/// `None` and logs the cause.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Instruments currently open for trading
    async fn list_tradable_instruments(&self) -> Vec<String>;

    /// Latest price for `symbol`, if it could be fetched
    async fn get_price(&self, symbol: &str) -> Option<Decimal>;
}

/// Destination for outbound signal and result messages
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, text: &str) -> Result<(), SignalError>;
}

/// Persistence for the pending signal and its history
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// The single signal awaiting resolution, if any
    async fn pending(&self) -> SignalResult<Option<Signal>>;

    /// Make `signal` the pending one. A previous pending signal is marked
    /// superseded and returned.
    async fn replace_pending(&self, signal: &Signal, at: DateTime<Utc>) -> SignalResult<Option<Signal>>;

    /// Record a terminal resolution for the pending signal and clear it.
    /// Returns the closed record, or `None` if nothing was pending.
    async fn resolve_pending(
        &self,
        resolution: Resolution,
        exit_price: Option<Decimal>,
        at: DateTime<Utc>,
    ) -> SignalResult<Option<SignalRecord>>;

    /// Every record kept by the store, oldest first
    async fn history(&self) -> SignalResult<Vec<SignalRecord>>;
}
