//! Completion service client with fixed-delay retry.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait for "send a prompt, get text back"
//! - [`OpenRouterAsk`]: one chat-completions request against an
//!   OpenAI-compatible endpoint (OpenRouter by default)
//! - [`RetryAsk`]: decorator adding bounded attempts with a fixed pause
//! - [`Sleeper`]: the pause itself, injectable so tests never wait
//!
//! # Retry Strategy
//!
//! - At most `attempts` calls (3 by default)
//! - A failed attempt is followed by a fixed delay (2 seconds by default)
//!   before the next one; there is no pause after the last attempt
//! - No exponential growth and no jitter

use crate::config::Settings;
use crate::error::{NewsError, Result};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// A tone-scoped request: system instruction plus user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Trait for async completion calls.
///
/// Implementors send a [`Prompt`] to a text-generation backend and return the
/// generated text. Decorators such as [`RetryAsk`] wrap another implementor.
pub trait AskAsync {
    /// The type of response returned by the backend.
    type Response;

    async fn ask(&self, prompt: &Prompt) -> Result<Self::Response>;
}

/// Pause abstraction used between retries and between articles.
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// Real pauses on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Wrapper that retries any [`AskAsync`] implementation a bounded number of times.
pub struct RetryAsk<T, S> {
    /// The underlying client to wrap.
    inner: T,
    /// Total attempts, including the first one.
    attempts: usize,
    /// Fixed pause after each failed attempt but the last.
    delay: Duration,
    sleeper: S,
}

impl<T, S> RetryAsk<T, S>
where
    T: AskAsync,
    S: Sleeper,
{
    pub fn new(inner: T, attempts: usize, delay: Duration, sleeper: S) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            delay,
            sleeper,
        }
    }
}

impl<T, S> fmt::Debug for RetryAsk<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("attempts", &self.attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

impl<T, S> AskAsync for RetryAsk<T, S>
where
    T: AskAsync,
    S: Sleeper,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &Prompt) -> Result<Self::Response> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let attempt_t0 = Instant::now();
            match self.inner.ask(prompt).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt >= self.attempts => {
                    error!(
                        attempt,
                        max = self.attempts,
                        elapsed_ms_total = total_t0.elapsed().as_millis(),
                        error = %e,
                        "ask() exhausted retries"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max = self.attempts,
                        elapsed_ms_attempt = attempt_t0.elapsed().as_millis(),
                        delay = ?self.delay,
                        error = %e,
                        "ask() attempt failed; retrying"
                    );
                    self.sleeper.sleep(self.delay).await;
                }
            }
        }
    }
}

/// One chat-completions request per [`AskAsync::ask`] call.
#[derive(Clone)]
pub struct OpenRouterAsk {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl fmt::Debug for OpenRouterAsk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterAsk")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenRouterAsk {
    pub fn new(settings: &Settings, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.completion_timeout())
            .build()?;
        Ok(Self {
            client,
            url: settings.completion_url.clone(),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

impl AskAsync for OpenRouterAsk {
    type Response = String;

    #[instrument(level = "debug", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &Prompt) -> Result<String> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis(),
                body = %truncate_for_log(&body, 300),
                "Completion request rejected"
            );
            return Err(NewsError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let payload: ChatResponse = response.json().await?;
        let text = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(NewsError::Completion("no generated text in response".into()));
        }

        debug!(
            elapsed_ms = t0.elapsed().as_millis(),
            chars = text.chars().count(),
            "Completion received"
        );
        Ok(text)
    }
}

/// Build the production completion client: OpenRouter wrapped in the retry policy.
pub fn completion_client(
    settings: &Settings,
    api_key: &str,
) -> Result<RetryAsk<OpenRouterAsk, TokioSleeper>> {
    let client = OpenRouterAsk::new(settings, api_key)?;
    info!(
        model = %settings.model,
        attempts = settings.completion_attempts,
        retry_delay = ?settings.retry_delay(),
        "Completion client ready"
    );
    Ok(RetryAsk::new(
        client,
        settings.completion_attempts,
        settings.retry_delay(),
        TokioSleeper,
    ))
}
