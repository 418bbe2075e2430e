// Signal Generator
// Picks an instrument and a direction at random and replaces the pending signal

use crate::messages::{format_signal_message, MessageStyle};
use crate::random::{FastRandSource, RandomSource};
use anyhow::{Context, Result};
use common::{
    Clock, Direction, GaleSchedule, MarketDataSource, NotificationSink, PendingSlot, Signal,
    SystemClock,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Generates and publishes new pending signals
pub struct SignalGenerator {
    market: Arc<dyn MarketDataSource>,
    sink: Arc<dyn NotificationSink>,
    slot: Arc<PendingSlot>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    schedule: GaleSchedule,
    style: MessageStyle,
}

impl SignalGenerator {
    /// Create a generator with system time, `fastrand` draws and the default schedule
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        sink: Arc<dyn NotificationSink>,
        slot: Arc<PendingSlot>,
    ) -> Self {
        Self {
            market,
            sink,
            slot,
            random: Arc::new(FastRandSource::new()),
            clock: Arc::new(SystemClock),
            schedule: GaleSchedule::default(),
            style: MessageStyle::default(),
        }
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_schedule(mut self, schedule: GaleSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_style(mut self, style: MessageStyle) -> Self {
        self.style = style;
        self
    }

    /// Generate a signal, make it the pending one and announce it.
    ///
    /// Returns `Ok(None)` without touching the slot when market data is
    /// unavailable. A failed announcement is logged; the stored signal stays.
    pub async fn generate(&self) -> Result<Option<Signal>> {
        let instruments = self.market.list_tradable_instruments().await;
        if instruments.is_empty() {
            warn!("No tradable instruments available, skipping signal generation");
            return Ok(None);
        }

        let symbol = &instruments[self.random.index(instruments.len())];
        let direction = if self.random.coin_flip() {
            Direction::Put
        } else {
            Direction::Call
        };
        debug!("Selected {} {} out of {} instruments", symbol, direction, instruments.len());

        let price = match self.market.get_price(symbol).await {
            Some(price) if price > Decimal::ZERO => price,
            Some(price) => {
                warn!("Ignoring non-positive price {} for {}, skipping signal generation", price, symbol);
                return Ok(None);
            }
            None => {
                warn!("No price available for {}, skipping signal generation", symbol);
                return Ok(None);
            }
        };

        let signal = Signal::new(symbol.clone(), direction, price, self.clock.now(), &self.schedule);

        {
            let store = self.slot.lock().await;
            let superseded = store
                .replace_pending(&signal, signal.created_at)
                .await
                .context("Failed to store new signal")?;
            if let Some(previous) = superseded {
                info!("Signal {} on {} superseded before evaluation", previous.id, previous.symbol);
            }
        }

        let message = format_signal_message(&signal, &self.style);
        if let Err(e) = self.sink.publish(&message).await {
            warn!("Failed to publish signal {}: {}", signal.id, e);
        }

        info!(
            "Generated {} signal on {} at {} (expires {})",
            signal.direction, signal.symbol, signal.reference_price, signal.expires_at
        );
        Ok(Some(signal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::storage::InMemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use common::testing::{RecordingSink, ScriptedMarket};
    use common::{ManualClock, Resolution};
    use rust_decimal_macros::dec;

    struct Harness {
        sink: Arc<RecordingSink>,
        slot: Arc<PendingSlot>,
        generator: SignalGenerator,
    }

    fn harness(market: ScriptedMarket, sink: RecordingSink, random: ScriptedRandom) -> Harness {
        let market = Arc::new(market);
        let sink = Arc::new(sink);
        let slot = Arc::new(PendingSlot::new(Box::new(InMemoryStore::new())));
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));

        let generator = SignalGenerator::new(market.clone(), sink.clone(), slot.clone())
            .with_random(Arc::new(random))
            .with_clock(clock);

        Harness {
            sink,
            slot,
            generator,
        }
    }

    #[tokio::test]
    async fn test_empty_instrument_list_is_noop() {
        let h = harness(ScriptedMarket::new(&[]), RecordingSink::new(), ScriptedRandom::default());

        assert!(h.generator.generate().await.unwrap().is_none());
        assert!(h.sink.messages().is_empty());
        assert!(h.slot.lock().await.pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_price_is_noop() {
        let h = harness(
            ScriptedMarket::new(&["BTCUSDT"]),
            RecordingSink::new(),
            ScriptedRandom::default(),
        );

        assert!(h.generator.generate().await.unwrap().is_none());
        assert!(h.sink.messages().is_empty());
        assert!(h.slot.lock().await.pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generates_put_with_scripted_draws() {
        let market = ScriptedMarket::new(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]).with_price("ETHUSDT", dec!(100));
        let h = harness(market, RecordingSink::new(), ScriptedRandom::new(&[1], &[true]));

        let signal = h.generator.generate().await.unwrap().unwrap();

        assert_eq!(signal.symbol, "ETHUSDT");
        assert_eq!(signal.direction, Direction::Put);
        assert_eq!(signal.reference_price, dec!(100));

        let gale1 = signal.gale1.clone().unwrap();
        let gale2 = signal.gale2.clone().unwrap();
        assert_eq!(gale1.threshold, dec!(100.2));
        assert_eq!(gale2.threshold, dec!(100.4));
        assert_eq!(signal.expires_at - signal.created_at, Duration::minutes(5));
        assert_eq!(gale1.expires_at - signal.expires_at, Duration::minutes(5));
        assert_eq!(gale2.expires_at - gale1.expires_at, Duration::minutes(5));

        let pending = h.slot.lock().await.pending().await.unwrap().unwrap();
        assert_eq!(pending.id, signal.id);

        let messages = h.sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("ETHUSDT;09:05;PUT"));
    }

    #[tokio::test]
    async fn test_call_thresholds_mirror_put() {
        let market = ScriptedMarket::new(&["BNBUSDT"]).with_price("BNBUSDT", dec!(100));
        let h = harness(market, RecordingSink::new(), ScriptedRandom::new(&[0], &[false]));

        let signal = h.generator.generate().await.unwrap().unwrap();
        let gale1 = signal.gale1.unwrap();
        let gale2 = signal.gale2.unwrap();

        assert_eq!(signal.direction, Direction::Call);
        assert!(gale1.threshold < signal.reference_price);
        assert!(gale2.threshold < gale1.threshold);
    }

    #[tokio::test]
    async fn test_new_signal_replaces_pending() {
        let market = ScriptedMarket::new(&["BTCUSDT", "ETHUSDT"])
            .with_price("BTCUSDT", dec!(64000))
            .with_price("ETHUSDT", dec!(3100));
        let h = harness(market, RecordingSink::new(), ScriptedRandom::new(&[0, 1], &[true, false]));

        let first = h.generator.generate().await.unwrap().unwrap();
        let second = h.generator.generate().await.unwrap().unwrap();

        let store = h.slot.lock().await;
        assert_eq!(store.pending().await.unwrap().map(|s| s.id), Some(second.id));

        let history = store.history().await.unwrap();
        assert_eq!(history[0].signal.id, first.id);
        assert_eq!(history[0].resolution, Some(Resolution::Superseded));
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_signal() {
        let market = ScriptedMarket::new(&["BTCUSDT"]).with_price("BTCUSDT", dec!(64000));
        let h = harness(market, RecordingSink::failing(), ScriptedRandom::default());

        let signal = h.generator.generate().await.unwrap().unwrap();

        assert_eq!(h.sink.messages().len(), 1);
        let pending = h.slot.lock().await.pending().await.unwrap();
        assert_eq!(pending.map(|s| s.id), Some(signal.id));

        let history = h.slot.lock().await.history().await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_pending());
    }
}
