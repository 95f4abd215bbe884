//! Per-tone summarization of an article's chunks.
//!
//! A summary request never fails from the caller's point of view: once the
//! completion client gives up, the chunk's summary is the
//! [`SUMMARY_UNAVAILABLE`] sentinel, and it stays visible in the digest.

use crate::api::{AskAsync, Prompt};
use crate::models::{Chunk, ToneProfile, ToneSummary};
use tracing::{info, instrument, warn};

/// Placeholder for a summary that could not be produced.
pub const SUMMARY_UNAVAILABLE: &str = "[No se pudo generar resumen]";

/// System instruction naming the lens, user message = tone prompt + text.
pub fn build_prompt(tone: &ToneProfile, text: &str) -> Prompt {
    Prompt {
        system: format!("Sos un analista político con enfoque {}.", tone.id),
        user: format!("{}\n\n{}", tone.prompt, text),
    }
}

#[derive(Debug)]
pub struct ToneSummarizer<A> {
    api: A,
}

impl<A> ToneSummarizer<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Summarize one chunk through one tone, degrading to the sentinel.
    #[instrument(level = "info", skip_all, fields(tone = %tone.id))]
    pub async fn summarize(&self, chunk_text: &str, tone: &ToneProfile) -> String {
        match self.api.ask(&build_prompt(tone, chunk_text)).await {
            Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
            Ok(_) => {
                warn!("Completion returned empty text; using sentinel");
                SUMMARY_UNAVAILABLE.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Summary unavailable; using sentinel");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }

    /// Summarize every chunk in order and join them into one [`ToneSummary`].
    ///
    /// A single chunk is used as-is; several are labelled by position.
    pub async fn summarize_chunks(&self, chunks: &[Chunk], tone: &ToneProfile) -> ToneSummary {
        let mut parts = Vec::with_capacity(chunks.len());
        let mut degraded = false;

        for chunk in chunks {
            let summary = self.summarize(&chunk.text, tone).await;
            degraded |= summary == SUMMARY_UNAVAILABLE;
            parts.push((chunk.index, summary));
        }

        let text = match parts.as_slice() {
            [] => SUMMARY_UNAVAILABLE.to_string(),
            [(_, only)] => only.clone(),
            _ => parts
                .iter()
                .map(|(index, summary)| format!("Parte {}: {}", index + 1, summary))
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        if parts.is_empty() {
            degraded = true;
        }

        info!(tone = %tone.id, chunks = chunks.len(), degraded, "Tone summary ready");
        ToneSummary {
            tone: tone.id.clone(),
            label: tone.display_name(),
            text,
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryAsk;
    use crate::api::testing::{RecordingSleeper, ScriptedAsk, service_down};
    use std::time::Duration;

    fn tone() -> ToneProfile {
        ToneProfile::new(
            "libertario",
            "Analizá esta noticia desde una perspectiva libertaria.",
        )
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                index,
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(&tone(), "El Congreso sesionó.");
        assert_eq!(prompt.system, "Sos un analista político con enfoque libertario.");
        assert_eq!(
            prompt.user,
            "Analizá esta noticia desde una perspectiva libertaria.\n\nEl Congreso sesionó."
        );
    }

    #[tokio::test]
    async fn test_sentinel_after_three_failures() {
        let backend = ScriptedAsk::new(vec![
            Err(service_down()),
            Err(service_down()),
            Err(service_down()),
        ]);
        let sleeper = RecordingSleeper::default();
        let summarizer =
            ToneSummarizer::new(RetryAsk::new(&backend, 3, Duration::from_secs(2), &sleeper));

        let summary = summarizer.summarize("texto", &tone()).await;
        assert_eq!(summary, SUMMARY_UNAVAILABLE);
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_completion_becomes_sentinel() {
        let backend = ScriptedAsk::new(vec![Ok("   ".to_string())]);
        let summarizer = ToneSummarizer::new(&backend);
        assert_eq!(summarizer.summarize("texto", &tone()).await, SUMMARY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_single_chunk_is_unlabelled() {
        let backend = ScriptedAsk::new(vec![Ok("Menos Estado.".to_string())]);
        let summarizer = ToneSummarizer::new(&backend);

        let summary = summarizer.summarize_chunks(&chunks(&["uno"]), &tone()).await;
        assert_eq!(summary.text, "Menos Estado.");
        assert_eq!(summary.label, "Libertario");
        assert!(!summary.degraded);
    }

    #[tokio::test]
    async fn test_multi_chunk_keeps_order_and_sentinel() {
        let backend = ScriptedAsk::new(vec![
            Ok("Primera parte.".to_string()),
            Err(service_down()),
            Ok("Tercera parte.".to_string()),
        ]);
        let summarizer = ToneSummarizer::new(&backend);

        let summary = summarizer
            .summarize_chunks(&chunks(&["a", "b", "c"]), &tone())
            .await;
        assert_eq!(
            summary.text,
            format!("Parte 1: Primera parte.\n\nParte 2: {SUMMARY_UNAVAILABLE}\n\nParte 3: Tercera parte.")
        );
        assert!(summary.degraded);

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].user.ends_with("\n\na"));
        assert!(prompts[2].user.ends_with("\n\nc"));
    }
}
