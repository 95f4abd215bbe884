//! The pipeline driver.
//!
//! ```text
//! for source in registry          (discover; no links -> next source)
//!   for article in source         (extract; failure -> next article)
//!     for tone in tones           (chunk -> summarize each chunk)
//!     assemble -> deliver to every subscriber -> pause
//! ```
//!
//! Everything runs sequentially in fixed order. Apart from the subscriber
//! lookup, no failure crosses a source, article, tone or recipient boundary.

use crate::api::{AskAsync, Sleeper};
use crate::chunker::chunk;
use crate::config::AppConfig;
use crate::delivery::{Delivery, Subscriber, SubscriberSource};
use crate::models::{Digest, ExtractedArticle};
use crate::outputs::digest::assemble;
use crate::scrapers::discovery::discover;
use crate::scrapers::extract::extract;
use crate::scrapers::fetch::PageFetcher;
use crate::summarizer::ToneSummarizer;
use tracing::{error, info, instrument, warn};

/// Counters for one run, logged when the driver finishes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub subscribers: usize,
    pub sources_without_articles: usize,
    pub articles_found: usize,
    pub articles_skipped: usize,
    pub digests: usize,
    pub degraded_summaries: usize,
    pub truncated_digests: usize,
    pub deliveries_ok: usize,
    pub deliveries_failed: usize,
}

pub struct Pipeline<A, D, S> {
    config: AppConfig,
    fetcher: PageFetcher,
    summarizer: ToneSummarizer<A>,
    outbox: D,
    sleeper: S,
}

impl<A, D, S> Pipeline<A, D, S>
where
    A: AskAsync<Response = String>,
    D: Delivery,
    S: Sleeper,
{
    pub fn new(config: AppConfig, fetcher: PageFetcher, api: A, outbox: D, sleeper: S) -> Self {
        Self {
            config,
            fetcher,
            summarizer: ToneSummarizer::new(api),
            outbox,
            sleeper,
        }
    }

    /// Process every configured source once.
    #[instrument(level = "info", skip_all)]
    pub async fn run<L: SubscriberSource>(&self, audience: &L) -> RunReport {
        let mut report = RunReport::default();

        let subscribers = match audience.list_subscribers().await {
            Ok(subscribers) => subscribers,
            Err(e) => {
                error!(error = %e, "Failed to load subscribers");
                Vec::new()
            }
        };
        report.subscribers = subscribers.len();
        if subscribers.is_empty() {
            warn!("No subscribers registered; nothing to deliver");
            return report;
        }
        info!(
            subscribers = subscribers.len(),
            sources = self.config.sources.len(),
            tones = self.config.tones.len(),
            "Starting run"
        );

        let settings = &self.config.settings;
        let mut pace = false;

        for source in &self.config.sources {
            info!(source = %source.name, "Processing source");
            let articles = discover(&self.fetcher, source, settings.max_articles_per_source).await;
            if articles.is_empty() {
                warn!(source = %source.name, "No articles found; skipping source");
                report.sources_without_articles += 1;
                continue;
            }
            report.articles_found += articles.len();

            for article in &articles {
                if pace {
                    self.sleeper.sleep(settings.inter_article_pause()).await;
                    pace = false;
                }

                let extracted = match extract(
                    &self.fetcher,
                    article,
                    &source.content,
                    settings.min_article_len,
                )
                .await
                {
                    Ok(extracted) => extracted,
                    Err(e) => {
                        warn!(url = %article.url, error = %e, "Could not extract article; skipping");
                        report.articles_skipped += 1;
                        continue;
                    }
                };

                let digest = self.digest_article(&extracted, &mut report).await;
                self.broadcast(&digest, &subscribers, &mut report).await;
                pace = true;
            }
        }

        info!(?report, "Run finished");
        report
    }

    /// Summarize an article through every tone and assemble its digest.
    #[instrument(level = "info", skip_all, fields(url = %article.article.url))]
    async fn digest_article(&self, article: &ExtractedArticle, report: &mut RunReport) -> Digest {
        let settings = &self.config.settings;
        let chunks = chunk(&article.body, settings.chunk_max_len);
        info!(chunks = chunks.len(), "Article chunked");

        let mut summaries = Vec::with_capacity(self.config.tones.len());
        for tone in &self.config.tones {
            let summary = self.summarizer.summarize_chunks(&chunks, tone).await;
            if summary.degraded {
                warn!(tone = %summary.tone, "Digest carries an unavailable summary");
                report.degraded_summaries += 1;
            }
            summaries.push(summary);
        }

        let digest = assemble(&article.article, &summaries, settings.message_cap);
        report.digests += 1;
        if digest.truncated {
            report.truncated_digests += 1;
        }
        digest
    }

    async fn broadcast(&self, digest: &Digest, subscribers: &[Subscriber], report: &mut RunReport) {
        for subscriber in subscribers {
            if self.outbox.deliver(&subscriber.recipient_id, &digest.text).await {
                report.deliveries_ok += 1;
            } else {
                warn!(
                    recipient = %subscriber.recipient_id,
                    name = ?subscriber.display_name,
                    source = %digest.source,
                    url = %digest.url,
                    "Delivery failed; continuing with next recipient"
                );
                report.deliveries_failed += 1;
            }
        }
    }
}
