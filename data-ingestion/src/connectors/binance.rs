use async_trait::async_trait;
use common::{MarketDataSource, SignalError};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_API_URL: &str = "https://api.binance.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Binance spot REST connector
pub struct BinanceConnector {
    api_url: String,
    client: Client,
}

/// `/api/v3/exchangeInfo` response, trimmed to what we read
#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    status: String,
}

/// `/api/v3/ticker/price` response
#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
    price: String,
}

impl BinanceConnector {
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_api_url(api_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Symbols whose status is `TRADING`
    pub async fn fetch_trading_symbols(&self) -> Result<Vec<String>, SignalError> {
        let url = format!("{}/api/v3/exchangeInfo", self.api_url);
        let body = self.get_text(&url, &[]).await?;
        let symbols = parse_trading_symbols(&body)?;

        info!("Fetched {} tradable symbols from Binance", symbols.len());
        Ok(symbols)
    }

    pub async fn fetch_price(&self, symbol: &str) -> Result<Decimal, SignalError> {
        let url = format!("{}/api/v3/ticker/price", self.api_url);
        let body = self.get_text(&url, &[("symbol", symbol)]).await?;
        let price = parse_ticker_price(&body)?;

        debug!("Binance price for {}: {}", symbol, price);
        Ok(price)
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, SignalError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SignalError::DataUnavailable(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SignalError::DataUnavailable(format!(
                "Binance API error: {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SignalError::DataUnavailable(format!("failed to read body from {}: {}", url, e)))
    }
}

impl Default for BinanceConnector {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_trading_symbols(body: &str) -> Result<Vec<String>, SignalError> {
    let info: ExchangeInfo = serde_json::from_str(body)
        .map_err(|e| SignalError::DataUnavailable(format!("unexpected exchangeInfo payload: {}", e)))?;

    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING")
        .map(|s| s.symbol)
        .collect())
}

fn parse_ticker_price(body: &str) -> Result<Decimal, SignalError> {
    let ticker: TickerPrice = serde_json::from_str(body)
        .map_err(|e| SignalError::DataUnavailable(format!("unexpected ticker payload: {}", e)))?;

    Decimal::from_str(&ticker.price).map_err(|e| {
        SignalError::DataUnavailable(format!("invalid price {:?} for {}: {}", ticker.price, ticker.symbol, e))
    })
}

#[async_trait]
impl MarketDataSource for BinanceConnector {
    async fn list_tradable_instruments(&self) -> Vec<String> {
        match self.fetch_trading_symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!("Failed to fetch Binance symbols: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_price(&self, symbol: &str) -> Option<Decimal> {
        match self.fetch_price(symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("Failed to fetch Binance price for {}: {}", symbol, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_exchange_info_keeps_trading_only() {
        let json = r#"{
            "timezone": "UTC",
            "serverTime": 1708627200000,
            "symbols": [
                {"symbol": "BTCUSDT", "status": "TRADING", "baseAsset": "BTC"},
                {"symbol": "LUNAUSDT", "status": "BREAK", "baseAsset": "LUNA"},
                {"symbol": "ETHUSDT", "status": "TRADING", "baseAsset": "ETH"}
            ]
        }"#;

        let symbols = parse_trading_symbols(json).unwrap();
        assert_eq!(symbols, vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]);
    }

    #[test]
    fn test_parse_ticker_price_keeps_precision() {
        let json = r#"{"symbol": "ETHBTC", "price": "0.05123400"}"#;
        assert_eq!(parse_ticker_price(json).unwrap(), dec!(0.051234));
    }

    #[test]
    fn test_parse_error_payload_is_unavailable() {
        let json = r#"{"code": -1121, "msg": "Invalid symbol."}"#;
        let err = parse_ticker_price(json).unwrap_err();
        assert!(matches!(err, SignalError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unreachable_api_fails_soft() {
        let connector = BinanceConnector::with_api_url("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        assert_eq!(connector.api_url(), "http://127.0.0.1:9");

        assert!(connector.list_tradable_instruments().await.is_empty());
        assert!(connector.get_price("BTCUSDT").await.is_none());
    }
}
