use crate::messages::format_outcome_message;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::{Clock, MarketDataSource, NotificationSink, Outcome, PendingSlot, Signal, SystemClock};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome Evaluator - Resolves the pending signal against the latest price
pub struct OutcomeEvaluator {
    market: Arc<dyn MarketDataSource>,
    sink: Arc<dyn NotificationSink>,
    slot: Arc<PendingSlot>,
    clock: Arc<dyn Clock>,
}

impl OutcomeEvaluator {
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        sink: Arc<dyn NotificationSink>,
        slot: Arc<PendingSlot>,
    ) -> Self {
        Self {
            market,
            sink,
            slot,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Evaluate the pending signal once.
    ///
    /// The slot stays locked from reading the signal until a terminal
    /// resolution is committed. Terminal outcomes clear the slot before the
    /// result message goes out, and a failed publish does not undo that.
    pub async fn evaluate(&self) -> Result<Outcome> {
        let store = self.slot.lock().await;

        let signal = match store.pending().await.context("Failed to read pending signal")? {
            Some(signal) => signal,
            None => {
                debug!("No pending signal to evaluate");
                return Ok(Outcome::NoPendingSignal);
            }
        };

        let price = match self.market.get_price(&signal.symbol).await {
            Some(price) => price,
            None => {
                warn!("No price available for {}, leaving signal {} pending", signal.symbol, signal.id);
                return Ok(Outcome::StillPending);
            }
        };

        let now = self.clock.now();
        let outcome = classify(&signal, price, now);

        let resolution = match outcome.resolution() {
            Some(resolution) => resolution,
            None => {
                debug!(
                    "Signal {} on {} still pending at {} (reference {})",
                    signal.id, signal.symbol, price, signal.reference_price
                );
                return Ok(outcome);
            }
        };

        store
            .resolve_pending(resolution, Some(price), now)
            .await
            .context("Failed to record signal resolution")?;
        drop(store);

        info!(
            "Signal {} {} on {} resolved as {:?} at {} (reference {})",
            signal.id, signal.direction, signal.symbol, outcome, price, signal.reference_price
        );

        if let Some(message) = format_outcome_message(&signal, outcome, price) {
            if let Err(e) = self.sink.publish(&message).await {
                warn!("Failed to publish result for signal {}: {}", signal.id, e);
            }
        }

        Ok(outcome)
    }
}

/// Decide the outcome of `signal` given `price` observed at `now`.
///
/// Checks run in a fixed order: primary window, gale 1, gale 2, then loss once
/// every window has closed. A window is open up to and including its
/// expiration instant.
pub fn classify(signal: &Signal, price: Decimal, now: DateTime<Utc>) -> Outcome {
    let direction = signal.direction;

    if signal.primary_open(now) && direction.is_favorable(price, signal.reference_price) {
        return Outcome::WonPrimary;
    }

    let gales = [
        (&signal.gale1, Outcome::WonRetry1),
        (&signal.gale2, Outcome::WonRetry2),
    ];
    for (level, outcome) in gales {
        if let Some(level) = level {
            if level.is_open(now) && direction.is_favorable(price, level.threshold) {
                return outcome;
            }
        }
    }

    if signal.all_windows_closed(now) {
        Outcome::Loss
    } else {
        Outcome::StillPending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use common::testing::{RecordingSink, ScriptedMarket};
    use common::{Direction, GaleSchedule, ManualClock, Resolution};
    use rust_decimal_macros::dec;
    use signal_generation::InMemoryStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    struct Harness {
        market: Arc<ScriptedMarket>,
        sink: Arc<RecordingSink>,
        slot: Arc<PendingSlot>,
        clock: Arc<ManualClock>,
        evaluator: OutcomeEvaluator,
    }

    async fn harness(pending: Option<&Signal>, sink: RecordingSink) -> Harness {
        let market = Arc::new(ScriptedMarket::new(&["BTCUSDT"]));
        let sink = Arc::new(sink);
        let slot = Arc::new(PendingSlot::new(Box::new(InMemoryStore::new())));
        let clock = Arc::new(ManualClock::new(t0()));

        if let Some(signal) = pending {
            slot.lock().await.replace_pending(signal, t0()).await.unwrap();
        }

        let evaluator = OutcomeEvaluator::new(market.clone(), sink.clone(), slot.clone()).with_clock(clock.clone());

        Harness {
            market,
            sink,
            slot,
            clock,
            evaluator,
        }
    }

    fn signal(direction: Direction) -> Signal {
        Signal::new("BTCUSDT", direction, dec!(100), t0(), &GaleSchedule::default())
    }

    async fn pending_id(h: &Harness) -> Option<uuid::Uuid> {
        h.slot.lock().await.pending().await.unwrap().map(|s| s.id)
    }

    #[tokio::test]
    async fn test_no_pending_signal_is_idempotent() {
        let h = harness(None, RecordingSink::new()).await;
        h.market.set_price("BTCUSDT", dec!(100));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::NoPendingSignal);
        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::NoPendingSignal);
        assert!(h.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_put_wins_primary_before_expiration() {
        let put = signal(Direction::Put);
        let h = harness(Some(&put), RecordingSink::new()).await;
        h.market.set_price("BTCUSDT", dec!(95));
        h.clock.advance(Duration::minutes(3));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::WonPrimary);
        assert!(pending_id(&h).await.is_none());

        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("WIN direto"));

        // Cleared signal stays cleared on the next pass
        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::NoPendingSignal);
        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::NoPendingSignal);
    }

    #[tokio::test]
    async fn test_call_wins_first_gale_after_primary_expires() {
        let call = signal(Direction::Call);
        let h = harness(Some(&call), RecordingSink::new()).await;
        h.market.set_price("BTCUSDT", dec!(100.5));
        h.clock.advance(Duration::minutes(7));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::WonRetry1);
        assert!(pending_id(&h).await.is_none());
        assert!(h.sink.messages()[0].contains("1º GALE"));
    }

    #[tokio::test]
    async fn test_call_wins_second_gale() {
        let call = signal(Direction::Call);
        let h = harness(Some(&call), RecordingSink::new()).await;
        h.market.set_price("BTCUSDT", dec!(99.7));
        h.clock.advance(Duration::minutes(12));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::WonRetry2);

        let history = h.slot.lock().await.history().await.unwrap();
        assert_eq!(history[0].resolution, Some(Resolution::WonRetry2));
        assert_eq!(history[0].exit_price, Some(dec!(99.7)));
    }

    #[tokio::test]
    async fn test_loss_after_all_windows_expire() {
        let put = signal(Direction::Put);
        let h = harness(Some(&put), RecordingSink::new()).await;
        h.market.set_price("BTCUSDT", dec!(100.5));
        h.clock.advance(Duration::minutes(16));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::Loss);
        assert!(pending_id(&h).await.is_none());
        assert!(h.sink.messages()[0].contains("LOSS"));
    }

    #[tokio::test]
    async fn test_mid_window_without_crossing_stays_pending() {
        let put = signal(Direction::Put);
        let h = harness(Some(&put), RecordingSink::new()).await;
        h.market.set_price("BTCUSDT", dec!(100.5));
        h.clock.advance(Duration::minutes(8));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::StillPending);
        assert_eq!(pending_id(&h).await, Some(put.id));
        assert!(h.sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_missing_price_stays_pending_even_after_expiry() {
        let put = signal(Direction::Put);
        let h = harness(Some(&put), RecordingSink::new()).await;
        h.clock.advance(Duration::minutes(30));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::StillPending);
        assert_eq!(pending_id(&h).await, Some(put.id));

        h.market.set_price("BTCUSDT", dec!(101));
        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::Loss);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_restore_signal() {
        let call = signal(Direction::Call);
        let h = harness(Some(&call), RecordingSink::failing()).await;
        h.market.set_price("BTCUSDT", dec!(101));

        assert_eq!(h.evaluator.evaluate().await.unwrap(), Outcome::WonPrimary);
        assert!(pending_id(&h).await.is_none());
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let put = signal(Direction::Put);
        let at_primary = put.expires_at;
        let after_primary = at_primary + Duration::seconds(1);

        assert_eq!(classify(&put, dec!(99), at_primary), Outcome::WonPrimary);
        // 99 is below every PUT threshold, so the first open gale wins
        assert_eq!(classify(&put, dec!(99), after_primary), Outcome::WonRetry1);

        let final_expiry = put.final_expiry();
        assert_eq!(classify(&put, dec!(100.5), final_expiry), Outcome::StillPending);
        assert_eq!(classify(&put, dec!(100.5), final_expiry + Duration::seconds(1)), Outcome::Loss);
    }

    #[test]
    fn test_gale_checks_apply_inside_primary_window() {
        let call = signal(Direction::Call);
        let now = t0() + Duration::minutes(1);

        assert_eq!(classify(&call, dec!(99.9), now), Outcome::WonRetry1);
        assert_eq!(classify(&call, dec!(99.7), now), Outcome::WonRetry2);
        assert_eq!(classify(&call, dec!(99.5), now), Outcome::StillPending);
    }

    #[test]
    fn test_signal_without_gales_loses_after_primary() {
        let mut call = signal(Direction::Call);
        call.gale1 = None;
        call.gale2 = None;

        assert_eq!(classify(&call, dec!(99.9), t0() + Duration::minutes(6)), Outcome::Loss);
    }
}
