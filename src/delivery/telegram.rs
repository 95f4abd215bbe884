//! Telegram Bot API delivery.

use crate::delivery::Delivery;
use crate::error::Result;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

pub struct TelegramDelivery {
    client: Client,
    api_base: String,
    token: String,
}

impl fmt::Debug for TelegramDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramDelivery")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// What came back from one `sendMessage` call.
enum SendOutcome {
    Delivered,
    Rejected { status: u16, body: String },
    Failed,
}

impl TelegramDelivery {
    /// `api_base` is normally `https://api.telegram.org`; a trailing slash is ignored.
    pub fn new(api_base: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    async fn send(&self, recipient_id: &str, text: &str, parse_mode: Option<&str>) -> SendOutcome {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let mut form = vec![("chat_id", recipient_id), ("text", text)];
        if let Some(mode) = parse_mode {
            form.push(("parse_mode", mode));
        }

        match self.client.post(&url).form(&form).send().await {
            Ok(response) if response.status().is_success() => SendOutcome::Delivered,
            Ok(response) => SendOutcome::Rejected {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            },
            Err(e) => {
                // reqwest errors embed the URL, which carries the bot token.
                error!(error = %e.without_url(), "Telegram request failed");
                SendOutcome::Failed
            }
        }
    }
}

/// Telegram answers 400 with this when the Markdown markup does not parse.
fn is_markup_rejection(status: u16, body: &str) -> bool {
    status == 400 && body.contains("can't parse entities")
}

impl Delivery for TelegramDelivery {
    #[instrument(level = "info", skip(self, text))]
    async fn deliver(&self, recipient_id: &str, text: &str) -> bool {
        let mut outcome = self.send(recipient_id, text, Some("Markdown")).await;

        let markup_rejected = matches!(
            &outcome,
            SendOutcome::Rejected { status, body } if is_markup_rejection(*status, body)
        );
        if markup_rejected {
            warn!("Markdown rejected; resending as plain text");
            outcome = self.send(recipient_id, text, None).await;
        }

        match outcome {
            SendOutcome::Delivered => {
                info!("Digest delivered");
                true
            }
            SendOutcome::Rejected { status, body } => {
                warn!(status, body = %truncate_for_log(&body, 300), "Telegram rejected message");
                false
            }
            SendOutcome::Failed => false,
        }
    }
}
