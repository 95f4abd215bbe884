//! # Prism News
//!
//! Fetches the latest political articles from a fixed set of Argentine news
//! sites, summarizes each one through several ideological lenses with an
//! OpenAI-compatible completion API, and delivers one digest per article to
//! every Telegram subscriber.
//!
//! ## Usage
//!
//! ```sh
//! OPENROUTER_API_KEY=... TELEGRAM_BOT_TOKEN=... SUPABASE_URL=... SUPABASE_KEY=... prism_news
//! ```
//!
//! ## Architecture
//!
//! One sequential run per invocation; scheduling is left to cron or similar:
//! 1. **Discovery**: find up to three article links per source
//! 2. **Extraction**: pull the article body, with fallback selectors
//! 3. **Summarization**: chunk the body and summarize it once per tone (with retry)
//! 4. **Delivery**: assemble a length-capped digest and send it to each subscriber

use clap::Parser;
use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod chunker;
mod cli;
mod config;
mod delivery;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod summarizer;
mod utils;

use cli::Cli;
use config::{AppConfig, SubscriberStore};
use delivery::subscribers::{FileSubscribers, SupabaseSubscribers};
use delivery::telegram::TelegramDelivery;
use delivery::{Audience, Outbox};
use error::NewsError;
use pipeline::Pipeline;
use scrapers::fetch::PageFetcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("prism_news starting up");

    let args = Cli::parse();
    let credentials = args.credentials();
    info!(?credentials, dry_run = args.dry_run, "Parsed CLI arguments");

    // A partially configured run never starts.
    if let Err(e) = credentials.validate(args.dry_run) {
        error!(error = %e, "Refusing to start");
        return Err(e.into());
    }

    let config = match &args.config {
        Some(path) => AppConfig::load(path).await?,
        None => {
            info!("No config file given; using built-in sources and tones");
            let config = AppConfig::default();
            config.validate()?;
            config
        }
    };
    let settings = config.settings.clone();

    let api_key = credentials
        .openrouter_api_key
        .as_deref()
        .ok_or_else(|| NewsError::Config("missing OPENROUTER_API_KEY".into()))?;
    let completions = api::completion_client(&settings, api_key)?;
    let fetcher = PageFetcher::new(&settings.user_agent, settings.fetch_timeout())?;

    let (audience, outbox) = if args.dry_run {
        (Audience::DryRun, Outbox::Stdout)
    } else {
        let token = credentials
            .telegram_bot_token
            .as_deref()
            .ok_or_else(|| NewsError::Config("missing TELEGRAM_BOT_TOKEN".into()))?;
        let outbox = Outbox::Telegram(TelegramDelivery::new(
            &settings.telegram_api_base,
            token,
            settings.fetch_timeout(),
        )?);
        let audience = match credentials.subscriber_store()? {
            SubscriberStore::Supabase { url, key } => Audience::Supabase(
                SupabaseSubscribers::new(&url, &key, settings.fetch_timeout())?,
            ),
            SubscriberStore::File(path) => Audience::File(FileSubscribers::new(path)),
        };
        (audience, outbox)
    };
    info!(?audience, ?outbox, "Collaborators ready");

    let pipeline = Pipeline::new(config, fetcher, completions, outbox, api::TokioSleeper);
    let report = pipeline.run(&audience).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        subscribers = report.subscribers,
        sources_without_articles = report.sources_without_articles,
        articles_found = report.articles_found,
        articles_skipped = report.articles_skipped,
        digests = report.digests,
        degraded_summaries = report.degraded_summaries,
        truncated_digests = report.truncated_digests,
        deliveries_ok = report.deliveries_ok,
        deliveries_failed = report.deliveries_failed,
        "Execution complete"
    );

    Ok(())
}
