//! Command-line interface definitions for Prism News.
//!
//! Every credential can be given as a flag or through the environment.

use crate::config::Credentials;
use clap::Parser;

/// Command-line arguments for a single digest run.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment, subscribers from Supabase
/// prism_news
///
/// # Flat-file subscribers and a custom source list
/// prism_news --subscribers-file subscribers.txt -c sources.yaml
///
/// # Print digests instead of sending them
/// prism_news --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML file overriding sources, tones and settings
    #[arg(short, long)]
    pub config: Option<String>,

    /// API key for the completion service
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    /// Telegram bot token used to deliver digests
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Supabase project URL holding the `subscribers` table
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Flat file with one recipient id per line (used when Supabase is not configured)
    #[arg(long, env = "SUBSCRIBERS_FILE")]
    pub subscribers_file: Option<String>,

    /// Print digests to stdout instead of delivering them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            openrouter_api_key: self.openrouter_api_key.clone(),
            telegram_bot_token: self.telegram_bot_token.clone(),
            supabase_url: self.supabase_url.clone(),
            supabase_key: self.supabase_key.clone(),
            subscribers_file: self.subscribers_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "prism_news",
            "--config",
            "./sources.yaml",
            "--openrouter-api-key",
            "sk-or",
            "--subscribers-file",
            "subs.txt",
            "--dry-run",
        ]);

        assert_eq!(cli.config.as_deref(), Some("./sources.yaml"));
        assert!(cli.dry_run);

        let creds = cli.credentials();
        assert_eq!(creds.openrouter_api_key.as_deref(), Some("sk-or"));
        assert_eq!(creds.subscribers_file.as_deref(), Some("subs.txt"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["prism_news", "-c", "/etc/prism/config.yaml"]);
        assert_eq!(cli.config.as_deref(), Some("/etc/prism/config.yaml"));
        assert!(!cli.dry_run);
    }
}
