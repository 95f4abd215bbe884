//! Run configuration: the source registry, the tone set and pipeline settings.
//!
//! Everything has a built-in default so the binary runs without a file; a
//! YAML file passed with `--config` replaces any top-level section it names.
//!
//! ```yaml
//! sources:
//!   - name: La Nación
//!     listing_url: https://www.lanacion.com.ar/politica/
//!     link_rule: { kind: substring, pattern: /politica/ }
//!     content:
//!       primary: { tag: div, class: com-paragraph }
//! tones:
//!   - id: neutral informativo
//!     prompt: Resumí esta noticia de forma objetiva y neutral.
//! settings:
//!   inter_article_pause_secs: 10
//! ```

use crate::error::{NewsError, Result};
use crate::models::{ContentSelector, ElementSelector, LinkRule, SourceDescriptor, ToneProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub sources: Vec<SourceDescriptor>,
    pub tones: Vec<ToneProfile>,
    pub settings: Settings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            tones: default_tones(),
            settings: Settings::default(),
        }
    }
}

impl AppConfig {
    /// Load from a YAML file, falling back to defaults for omitted sections.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            sources = config.sources.len(),
            tones = config.tones.len(),
            "Loaded configuration file"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(NewsError::Config("no sources configured".into()));
        }
        if self.tones.is_empty() {
            return Err(NewsError::Config("no tones configured".into()));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                return Err(NewsError::Config(format!(
                    "duplicate source name `{}`",
                    source.name
                )));
            }
            source.link_rule.compile().map_err(|e| {
                NewsError::Config(format!("source `{}`: {}", source.name, e))
            })?;
        }

        let mut tone_ids = HashSet::new();
        for tone in &self.tones {
            if !tone_ids.insert(tone.id.as_str()) {
                return Err(NewsError::Config(format!("duplicate tone `{}`", tone.id)));
            }
        }

        let s = &self.settings;
        if s.max_articles_per_source == 0
            || s.chunk_max_len == 0
            || s.completion_attempts == 0
            || s.message_cap == 0
        {
            return Err(NewsError::Config(
                "max_articles_per_source, chunk_max_len, completion_attempts and message_cap must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Limits, timings and endpoints. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub max_articles_per_source: usize,
    pub min_article_len: usize,
    pub chunk_max_len: usize,
    pub completion_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub completion_timeout_secs: u64,
    pub completion_attempts: usize,
    pub retry_delay_secs: u64,
    pub inter_article_pause_secs: u64,
    pub message_cap: usize,
    pub telegram_api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: 10,
            max_articles_per_source: 3,
            min_article_len: 100,
            chunk_max_len: 3000,
            completion_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "mistralai/mixtral-8x7b-instruct".to_string(),
            max_tokens: 300,
            completion_timeout_secs: 40,
            completion_attempts: 3,
            retry_delay_secs: 2,
            inter_article_pause_secs: 5,
            message_cap: 4000,
            telegram_api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl Settings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn inter_article_pause(&self) -> Duration {
        Duration::from_secs(self.inter_article_pause_secs)
    }
}

/// Secrets and identifiers taken from the CLI / environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openrouter_api_key: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub subscribers_file: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openrouter_api_key", &self.openrouter_api_key.as_ref().map(|_| "***"))
            .field("telegram_bot_token", &self.telegram_bot_token.as_ref().map(|_| "***"))
            .field("supabase_url", &self.supabase_url)
            .field("supabase_key", &self.supabase_key.as_ref().map(|_| "***"))
            .field("subscribers_file", &self.subscribers_file)
            .finish()
    }
}

/// Where subscribers are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberStore {
    Supabase { url: String, key: String },
    File(String),
}

impl Credentials {
    /// Fail fast on anything missing; a partially configured run never starts.
    ///
    /// A dry run renders to stdout, so it needs neither a delivery token nor a
    /// subscriber store.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        if is_blank(&self.openrouter_api_key) {
            return Err(NewsError::Config("missing OPENROUTER_API_KEY".into()));
        }
        if dry_run {
            return Ok(());
        }
        if is_blank(&self.telegram_bot_token) {
            return Err(NewsError::Config("missing TELEGRAM_BOT_TOKEN".into()));
        }
        self.subscriber_store().map(|_| ())
    }

    pub fn subscriber_store(&self) -> Result<SubscriberStore> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Ok(SubscriberStore::Supabase {
                    url: url.trim_end_matches('/').to_string(),
                    key: key.clone(),
                })
            }
            (None, None) => match &self.subscribers_file {
                Some(path) if !path.trim().is_empty() => Ok(SubscriberStore::File(path.clone())),
                _ => Err(NewsError::Config(
                    "no subscriber store: set SUPABASE_URL and SUPABASE_KEY or SUBSCRIBERS_FILE"
                        .into(),
                )),
            },
            _ => Err(NewsError::Config(
                "SUPABASE_URL and SUPABASE_KEY must be set together".into(),
            )),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// The four built-in politics sections, used when no config file overrides them.
pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            name: "Río Negro".to_string(),
            listing_url: "https://www.rionegro.com.ar/politica/".to_string(),
            link_rule: LinkRule::Substring("/politica/".to_string()),
            content: ContentSelector::new(ElementSelector::with_class("div", "newsfull__body")),
        },
        SourceDescriptor {
            name: "Página/12".to_string(),
            listing_url: "https://www.pagina12.com.ar/secciones/el-pais".to_string(),
            link_rule: LinkRule::RegexFullmatch(r"/\d{6,}-.+".to_string()),
            content: ContentSelector::new(ElementSelector::with_class(
                "div",
                "article-main-content",
            )),
        },
        SourceDescriptor {
            name: "La Nación".to_string(),
            listing_url: "https://www.lanacion.com.ar/politica/".to_string(),
            link_rule: LinkRule::Substring("/politica/".to_string()),
            content: ContentSelector::new(ElementSelector::with_class("div", "com-paragraph")),
        },
        SourceDescriptor {
            name: "Infobae".to_string(),
            listing_url: "https://www.infobae.com/politica/".to_string(),
            link_rule: LinkRule::Substring("/politica/".to_string()),
            content: ContentSelector::new(ElementSelector::with_class(
                "figcaption",
                "article-figcaption-img",
            )),
        },
    ]
}

pub fn default_tones() -> Vec<ToneProfile> {
    vec![
        ToneProfile::new(
            "libertario",
            "Analizá esta noticia desde una perspectiva libertaria, enfocándote en la libertad individual, el libre mercado y la limitación del Estado.",
        ),
        ToneProfile::new(
            "crítico al neoliberalismo",
            "Analizá esta noticia con una perspectiva crítica al neoliberalismo, enfocándote en desigualdades sociales y el rol del Estado en la protección social.",
        ),
        ToneProfile::new(
            "neutral informativo",
            "Resumí esta noticia de forma objetiva y neutral, presentando los hechos principales sin sesgo político.",
        ),
    ]
}
