//! Subscriber lookup and message delivery.
//!
//! The pipeline only needs two narrow capabilities:
//!
//! - [`SubscriberSource::list_subscribers`]: read once per run, before any fetching
//! - [`Delivery::deliver`]: send an already assembled digest to one recipient
//!
//! Concrete backends are selected at startup and wrapped in the [`Audience`]
//! and [`Outbox`] enums so the driver stays generic without trait objects.

pub mod subscribers;
pub mod telegram;

use crate::error::Result;
use subscribers::{FileSubscribers, SupabaseSubscribers};
use telegram::TelegramDelivery;
use tracing::info;

/// One digest recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    pub recipient_id: String,
    pub display_name: Option<String>,
}

impl Subscriber {
    pub fn new(recipient_id: &str) -> Self {
        Self {
            recipient_id: recipient_id.to_string(),
            display_name: None,
        }
    }
}

/// Read side of the externally owned subscriber list.
pub trait SubscriberSource {
    /// Current recipients, in the order the store returns them.
    ///
    /// Called once per run. An error means the store could not be read, not
    /// that it is empty.
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>>;
}

pub trait Delivery {
    /// `true` when the transport accepted the message. Never panics or errors.
    async fn deliver(&self, recipient_id: &str, text: &str) -> bool;
}

/// Where this run's recipients come from.
#[derive(Debug)]
pub enum Audience {
    Supabase(SupabaseSubscribers),
    File(FileSubscribers),
    /// A single stand-in recipient for `--dry-run`.
    DryRun,
}

impl SubscriberSource for Audience {
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        match self {
            Audience::Supabase(s) => s.list_subscribers().await,
            Audience::File(s) => s.list_subscribers().await,
            Audience::DryRun => Ok(vec![Subscriber::new("stdout")]),
        }
    }
}

/// How digests leave the process.
#[derive(Debug)]
pub enum Outbox {
    Telegram(TelegramDelivery),
    Stdout,
}

impl Delivery for Outbox {
    async fn deliver(&self, recipient_id: &str, text: &str) -> bool {
        match self {
            Outbox::Telegram(t) => t.deliver(recipient_id, text).await,
            Outbox::Stdout => {
                info!(recipient_id, "Dry run; printing digest");
                println!("{text}\n");
                true
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory collaborators for driver tests.

    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct MemoryOutbox {
        pub sent: Mutex<Vec<(String, String)>>,
        pub failing: HashSet<String>,
    }

    impl MemoryOutbox {
        pub fn failing_for(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|id| id.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Delivery for &MemoryOutbox {
        async fn deliver(&self, recipient_id: &str, text: &str) -> bool {
            if self.failing.contains(recipient_id) {
                return false;
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient_id.to_string(), text.to_string()));
            true
        }
    }

    pub struct FixedAudience(pub Vec<Subscriber>);

    impl SubscriberSource for FixedAudience {
        async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
            Ok(self.0.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_audience_and_outbox() {
        let subscribers = Audience::DryRun.list_subscribers().await.unwrap();
        assert_eq!(subscribers, vec![Subscriber::new("stdout")]);
        assert!(Outbox::Stdout.deliver("stdout", "hola").await);
    }
}
