// Signal Desk
// The three trigger operations composed over one shared pending slot

use crate::config::{BotConfig, StorageBackend};
use anyhow::{Context, Result};
use common::{
    Clock, GaleSchedule, MarketDataSource, NotificationSink, Outcome, PendingSlot, Signal, SignalStore,
    SystemClock,
};
use data_ingestion::{BinanceConnector, DryRunNotifier, TelegramNotifier};
use monitoring::{OutcomeEvaluator, ResolutionStats};
use serde::Serialize;
use signal_generation::{FastRandSource, FileStore, InMemoryStore, RandomSource, SignalGenerator};
use std::sync::Arc;
use tracing::{info, warn};

/// What a combined evaluate-then-generate pass did
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub outcome: Outcome,
    pub signal: Option<Signal>,
}

pub struct SignalDesk {
    generator: SignalGenerator,
    evaluator: OutcomeEvaluator,
    slot: Arc<PendingSlot>,
}

impl SignalDesk {
    /// Wire a generator and an evaluator around the same slot and collaborators
    pub fn new(
        market: Arc<dyn MarketDataSource>,
        sink: Arc<dyn NotificationSink>,
        store: Box<dyn SignalStore>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let slot = Arc::new(PendingSlot::new(store));

        let generator = SignalGenerator::new(market.clone(), sink.clone(), slot.clone())
            .with_random(random)
            .with_clock(clock.clone());
        let evaluator = OutcomeEvaluator::new(market, sink, slot.clone()).with_clock(clock);

        Self {
            generator,
            evaluator,
            slot,
        }
    }

    /// Build the production desk: Binance prices, Telegram delivery
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let market = BinanceConnector::with_api_url(&config.market_data.api_url, config.market_data.timeout())
            .context("Failed to build Binance client")?;

        let sink: Arc<dyn NotificationSink> = match (&config.telegram.bot_token, &config.telegram.chat_id) {
            (Some(token), Some(chat_id)) => Arc::new(
                TelegramNotifier::new(&config.telegram.api_url, token, chat_id, config.telegram.timeout())
                    .context("Failed to build Telegram client")?,
            ),
            _ => {
                warn!("Telegram bot token or chat id not configured, messages will only be logged");
                Arc::new(DryRunNotifier)
            }
        };

        let store: Box<dyn SignalStore> = match config.storage.backend {
            StorageBackend::Memory => {
                info!("Keeping signals in memory");
                Box::new(InMemoryStore::new())
            }
            StorageBackend::File => {
                info!("Keeping signals in {}", config.storage.path.display());
                Box::new(FileStore::new(&config.storage.path))
            }
        };

        let schedule = GaleSchedule::from_minutes(
            config.schedule.primary_window_minutes,
            config.schedule.gale_step_minutes,
        );
        let style = config.display.message_style()?;

        let mut desk = Self::new(
            Arc::new(market),
            sink,
            store,
            Arc::new(FastRandSource::new()),
            Arc::new(SystemClock),
        );
        desk.generator = desk.generator.with_schedule(schedule).with_style(style);
        Ok(desk)
    }

    /// Generate and publish a new signal
    pub async fn generate(&self) -> Result<Option<Signal>> {
        self.generator.generate().await
    }

    /// Evaluate the pending signal
    pub async fn evaluate(&self) -> Result<Outcome> {
        self.evaluator.evaluate().await
    }

    /// Settle the previous signal, then issue the next one
    pub async fn cycle(&self) -> Result<CycleReport> {
        let outcome = self.evaluate().await?;
        let signal = self.generate().await?;
        Ok(CycleReport { outcome, signal })
    }

    pub async fn stats(&self) -> Result<ResolutionStats> {
        let store = self.slot.lock().await;
        let records = store.history().await.context("Failed to read signal history")?;
        Ok(ResolutionStats::from_records(&records))
    }
}
