use data_ingestion::BinanceConnector;
use tracing::{info, warn};
use tracing_subscriber::fmt;

// Manual check against the live Binance API.
// Run with: cargo run --bin probe_binance [SYMBOL]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_max_level(tracing::Level::INFO).init();

    let connector = BinanceConnector::new();
    info!("Querying {} ...", connector.api_url());

    let symbols = connector.fetch_trading_symbols().await?;
    info!("✅ {} symbols currently trading", symbols.len());
    for symbol in symbols.iter().take(10) {
        info!("  {}", symbol);
    }

    let symbol = std::env::args()
        .nth(1)
        .or_else(|| symbols.first().cloned())
        .unwrap_or_else(|| "BTCUSDT".to_string());

    match connector.fetch_price(&symbol).await {
        Ok(price) => info!("{} last price: {}", symbol, price),
        Err(e) => warn!("Could not fetch price for {}: {}", symbol, e),
    }

    Ok(())
}
