// Market data and notification connectors

pub mod connectors;
pub mod telegram;

pub use connectors::binance::BinanceConnector;
pub use telegram::{DryRunNotifier, TelegramNotifier};
