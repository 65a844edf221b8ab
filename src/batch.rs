//! Batch builder and response reconciler.
//!
//! Untranslated entries are sent to the completion endpoint in fixed-size
//! batches, one prompt per batch. The response is expected to contain exactly
//! one line per input string; anything else degrades the whole batch to empty
//! placeholders so the run can continue.

use tracing::{debug, error, warn};

use crate::openai::CompletionClient;

/// Partition `entries` into consecutive, non-overlapping batches of at most
/// `max_size`, preserving order. The last batch may be shorter.
pub fn build_batches<T>(entries: &[T], max_size: usize) -> std::slice::Chunks<'_, T> {
    assert!(max_size > 0, "batch size must be > 0");
    entries.chunks(max_size)
}

/// Outcome of one request/response cycle for a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// One string per input: an accepted translation or, for rejected
    /// candidates, the original source text.
    Translated {
        translations: Vec<String>,
        /// Number of entries that kept their source text and need review.
        fallbacks: usize,
    },
    /// The batch degraded to empty-string placeholders.
    Failed {
        reason: String,
        placeholders: Vec<String>,
    },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn fallback_count(&self) -> usize {
        match self {
            Self::Translated { fallbacks, .. } => *fallbacks,
            Self::Failed { .. } => 0,
        }
    }

    /// The produced strings, always exactly one per input.
    pub fn into_translations(self) -> Vec<String> {
        match self {
            Self::Translated { translations, .. } => translations,
            Self::Failed { placeholders, .. } => placeholders,
        }
    }
}

/// Why a candidate translation was rejected during per-entry validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    UnbalancedQuotes,
    ContainsBackslash,
}

impl RejectReason {
    fn describe(self) -> &'static str {
        match self {
            Self::Empty => "empty candidate",
            Self::UnbalancedQuotes => "odd number of double quotes",
            Self::ContainsBackslash => "contains a backslash",
        }
    }
}

/// Render the prompt for one batch: template, locale directive, then one line
/// per source string with no added quoting.
pub fn render_prompt(template: &str, locale: &str, sources: &[&str]) -> String {
    format!(
        "{template}\n\nTranslate these strings to language code: `{locale}`\n\nStrings to translate:\n{}\n",
        sources.join("\n")
    )
}

/// Strip one leading and one trailing run of double quotes, then trim
/// surrounding whitespace.
pub fn clean_line(line: &str) -> String {
    line.trim_matches('"').trim().to_string()
}

/// Shape check for a single candidate translation.
pub fn validate_candidate(candidate: &str) -> Result<(), RejectReason> {
    if candidate.is_empty() {
        Err(RejectReason::Empty)
    } else if candidate.matches('"').count() % 2 == 1 {
        Err(RejectReason::UnbalancedQuotes)
    } else if candidate.contains('\\') {
        Err(RejectReason::ContainsBackslash)
    } else {
        Ok(())
    }
}

/// Reconcile a raw completion response against the batch that produced it.
///
/// Returns exactly one string per source: the cleaned candidate when it passes
/// validation, the source text when it does not, or empty strings for the
/// whole batch when the response line count does not match.
pub fn reconcile(sources: &[&str], raw_response: &str, prompt: &str) -> BatchOutcome {
    let candidates: Vec<String> = raw_response
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(clean_line)
        .collect();

    if candidates.len() != sources.len() {
        let reason = format!(
            "expected {} translations, got {}",
            sources.len(),
            candidates.len()
        );
        error!(
            "Batch failed ({}).\nPrompt sent:\n{}\nResponse:\n{}",
            reason, prompt, raw_response
        );
        return BatchOutcome::Failed {
            reason,
            placeholders: vec![String::new(); sources.len()],
        };
    }

    let mut fallbacks = 0;
    let translations = sources
        .iter()
        .zip(candidates)
        .map(|(source, candidate)| match validate_candidate(&candidate) {
            Ok(()) => {
                debug!("Accepted translation for {source:?}: {candidate:?}");
                candidate
            }
            Err(reason) => {
                fallbacks += 1;
                warn!(
                    "Rejected candidate for {:?} ({}): {:?} - keeping source text, needs review",
                    source,
                    reason.describe(),
                    candidate
                );
                (*source).to_string()
            }
        })
        .collect();

    BatchOutcome::Translated {
        translations,
        fallbacks,
    }
}

/// Send one batch to the completion endpoint and reconcile the response.
/// Service failures degrade the batch instead of aborting the run.
pub async fn translate_batch(
    client: &CompletionClient,
    sources: &[&str],
    locale: &str,
    template: &str,
    temperature: f32,
) -> BatchOutcome {
    let prompt = render_prompt(template, locale, sources);
    debug!("Translating batch of {} strings to '{locale}'", sources.len());

    match client.complete(&prompt, temperature).await {
        Ok(raw_response) => reconcile(sources, &raw_response, &prompt),
        Err(e) => {
            error!("Completion request failed for batch: {e}\nPrompt sent:\n{prompt}");
            BatchOutcome::Failed {
                reason: e.to_string(),
                placeholders: vec![String::new(); sources.len()],
            }
        }
    }
}
