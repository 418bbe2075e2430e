use common::{Outcome, Signal};
use rust_decimal::Decimal;

/// Telegram Markdown announcing how a signal resolved.
///
/// Returns `None` for outcomes that do not resolve a signal.
pub fn format_outcome_message(signal: &Signal, outcome: Outcome, price: Decimal) -> Option<String> {
    let headline = match outcome {
        Outcome::WonPrimary => "✅ *WIN direto!* 🟢",
        Outcome::WonRetry1 => "✅ *WIN no 1º GALE!* 🔵",
        Outcome::WonRetry2 => "✅ *WIN no 2º GALE!* 🔴",
        Outcome::Loss => "❌ *LOSS* ⚫",
        Outcome::NoPendingSignal | Outcome::StillPending => return None,
    };

    Some(format!(
        "{}\n{} {} - entrada {} / atual {}",
        headline,
        signal.symbol,
        signal.direction,
        signal.reference_price.normalize(),
        price.normalize()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Direction, GaleSchedule};
    use rust_decimal_macros::dec;

    #[test]
    fn test_outcome_headlines() {
        let signal = Signal::new("BTCUSDT", Direction::Put, dec!(100.00), Utc::now(), &GaleSchedule::default());

        let win = format_outcome_message(&signal, Outcome::WonPrimary, dec!(95.50)).unwrap();
        assert!(win.starts_with("✅ *WIN direto!*"));
        assert!(win.contains("BTCUSDT PUT - entrada 100 / atual 95.5"));

        let gale2 = format_outcome_message(&signal, Outcome::WonRetry2, dec!(100.3)).unwrap();
        assert!(gale2.contains("2º GALE"));

        assert!(format_outcome_message(&signal, Outcome::StillPending, dec!(101)).is_none());
        assert!(format_outcome_message(&signal, Outcome::NoPendingSignal, dec!(101)).is_none());
    }
}
