// Outbound signal message
// Telegram Markdown announcing the instrument, direction and the three windows

use chrono::FixedOffset;
use common::{format_time_of_day, Direction, Signal};

/// Presentation settings for published signals
#[derive(Debug, Clone)]
pub struct MessageStyle {
    /// Offset the HH:MM windows are rendered in
    pub display_offset: FixedOffset,
    pub broker_url: String,
    pub help_url: String,
}

impl Default for MessageStyle {
    fn default() -> Self {
        Self {
            display_offset: FixedOffset::west_opt(3 * 3600).unwrap(), // UTC-03:00
            broker_url: "https://www.binance.com".to_string(),
            help_url: "https://t.me/seu_grupo_aqui".to_string(),
        }
    }
}

fn direction_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Put => "PUT 🟥",
        Direction::Call => "CALL 🟩",
    }
}

pub fn format_signal_message(signal: &Signal, style: &MessageStyle) -> String {
    let offset = style.display_offset;
    let expiration = format_time_of_day(signal.expires_at, offset);
    let window_minutes = (signal.expires_at - signal.created_at).num_minutes();

    let mut lines = vec![
        format!("💰 *{} minutos de expiração*", window_minutes),
        format!("{};{};{}", signal.symbol, expiration, direction_marker(signal.direction)),
        String::new(),
        format!("🕐 *TEMPO PARA {}*", expiration),
        String::new(),
    ];

    if let Some(gale1) = &signal.gale1 {
        lines.push(format!("1º GALE - TEMPO PARA {}", format_time_of_day(gale1.expires_at, offset)));
    }
    if let Some(gale2) = &signal.gale2 {
        lines.push(format!("2º GALE - TEMPO PARA {}", format_time_of_day(gale2.expires_at, offset)));
    }

    lines.push(String::new());
    lines.push(format!("📲 [Clique para abrir a corretora]({})", style.broker_url));
    lines.push(format!("🙋‍♂️ [Não sabe operar ainda? Clique aqui]({})", style.help_url));

    lines.join("\n")
}
