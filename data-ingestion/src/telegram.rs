use async_trait::async_trait;
use common::{NotificationSink, SignalError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Publishes messages to one Telegram chat through the Bot API
pub struct TelegramNotifier {
    api_url: String,
    bot_token: String,
    chat_id: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(api_url: &str, bot_token: &str, chat_id: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
            client,
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.bot_token)
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn publish(&self, text: &str) -> Result<(), SignalError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
            disable_web_page_preview: true,
        };

        debug!("Publishing to chat {}: {}", self.chat_id, text);

        // The URL embeds the bot token, keep it out of error messages
        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Failed to reach Telegram: {}", e);
                SignalError::PublishFailure(e.to_string())
            })?;

        let status = response.status();
        let body: Option<BotApiResponse> = response.json().await.ok();

        match body {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => {
                info!("Message delivered to chat {}", self.chat_id);
                Ok(())
            }
            Some(BotApiResponse { description, .. }) => Err(SignalError::PublishFailure(format!(
                "Telegram rejected message ({}): {}",
                status,
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(SignalError::PublishFailure(format!(
                "Telegram returned unreadable response ({})",
                status
            ))),
        }
    }
}

/// Sink that only logs, used when no Telegram credentials are configured
#[derive(Debug, Default)]
pub struct DryRunNotifier;

#[async_trait]
impl NotificationSink for DryRunNotifier {
    async fn publish(&self, text: &str) -> Result<(), SignalError> {
        info!("[dry-run] would publish:\n{}", text);
        Ok(())
    }
}
