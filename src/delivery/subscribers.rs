//! Subscriber stores: a remote Supabase table or a flat file.

use crate::delivery::{Subscriber, SubscriberSource};
use crate::error::{NewsError, Result};
use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// `subscribers` table exposed through Supabase's REST interface.
pub struct SupabaseSubscribers {
    client: Client,
    base_url: String,
    key: String,
}

impl fmt::Debug for SupabaseSubscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseSubscribers")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SubscriberRow {
    chat_id: Value,
    #[serde(default)]
    nombre: Option<String>,
}

impl SupabaseSubscribers {
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }
}

impl SubscriberSource for SupabaseSubscribers {
    #[instrument(level = "info", skip_all)]
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        let url = format!("{}/rest/v1/subscribers", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("select", "chat_id,nombre")])
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let rows: Vec<SubscriberRow> = response.json().await?;
        let subscribers: Vec<Subscriber> = rows
            .into_iter()
            .filter_map(|row| {
                let recipient_id = match row.chat_id {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                Some(Subscriber {
                    recipient_id,
                    display_name: row.nombre.filter(|n| !n.trim().is_empty()),
                })
            })
            .unique_by(|s| s.recipient_id.clone())
            .collect();

        info!(count = subscribers.len(), "Loaded subscribers from Supabase");
        Ok(subscribers)
    }
}

/// One recipient per line, optionally `id,display name`. Blank lines and
/// `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct FileSubscribers {
    path: PathBuf,
}

impl FileSubscribers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SubscriberSource for FileSubscribers {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let subscribers = parse_subscriber_lines(&raw);
        info!(count = subscribers.len(), "Loaded subscribers from file");
        Ok(subscribers)
    }
}

fn parse_subscriber_lines(raw: &str) -> Vec<Subscriber> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once(',') {
            Some((id, name)) => Subscriber {
                recipient_id: id.trim().to_string(),
                display_name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
            },
            None => Subscriber::new(line),
        })
        .filter(|s| !s.recipient_id.is_empty())
        .unique_by(|s| s.recipient_id.clone())
        .collect()
}
