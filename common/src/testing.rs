//! In-process stand-ins for the market data source and the notification sink

use crate::error::SignalError;
use crate::traits::{MarketDataSource, NotificationSink};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Market data served from memory; prices can be changed between calls
#[derive(Debug, Default)]
pub struct ScriptedMarket {
    instruments: Mutex<Vec<String>>,
    prices: Mutex<HashMap<String, Decimal>>,
}

impl ScriptedMarket {
    pub fn new(instruments: &[&str]) -> Self {
        Self {
            instruments: Mutex::new(instruments.iter().map(|s| s.to_string()).collect()),
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        self.set_price(symbol, price);
        self
    }

    pub fn set_price(&self, symbol: &str, price: Decimal) {
        self.prices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(symbol.to_string(), price);
    }

    pub fn clear_price(&self, symbol: &str) {
        self.prices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(symbol);
    }
}

#[async_trait]
impl MarketDataSource for ScriptedMarket {
    async fn list_tradable_instruments(&self) -> Vec<String> {
        self.instruments.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn get_price(&self, symbol: &str) -> Option<Decimal> {
        self.prices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(symbol)
            .copied()
    }
}

/// Sink that keeps every published message, optionally failing each publish
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
    failing: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose publishes all fail after recording the attempt
    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, text: &str) -> Result<(), SignalError> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());

        if self.failing {
            return Err(SignalError::PublishFailure("sink configured to fail".to_string()));
        }
        Ok(())
    }
}
