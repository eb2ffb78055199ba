//! Natural-language answers over ranked results.
//!
//! A [`Summarizer`] may fail for any reason (network, quota, bad payload);
//! [`summarize_or_fallback`] turns every such failure into the deterministic
//! template produced by [`TemplateSummarizer`].

use crate::assemble::RankedResult;
use crate::error::SummaryError;

/// Results handed to a remote summarizer as context.
pub const CONTEXT_RESULTS: usize = 5;
/// Body characters per result included in the context.
pub const CONTEXT_BODY_CHARS: usize = 500;
/// Results enumerated by the template.
pub const TEMPLATE_RESULTS: usize = 3;
/// Title characters kept by the template before truncating.
pub const TEMPLATE_TITLE_CHARS: usize = 100;

pub const NO_RESULTS_MESSAGE: &str = "No results related to your query were found.";

pub trait Summarizer: Send + Sync {
    fn summarize(&self, query: &str, results: &[RankedResult]) -> Result<String, SummaryError>;

    fn name(&self) -> &'static str;
}

/// Offline answer built only from result count and titles.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummarizer;

impl TemplateSummarizer {
    pub fn render(results: &[RankedResult]) -> String {
        if results.is_empty() {
            return NO_RESULTS_MESSAGE.to_string();
        }
        let mut out = format!(
            "Found {} relevant result(s). The main ones are:\n\n",
            results.len()
        );
        for (i, r) in results.iter().take(TEMPLATE_RESULTS).enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, truncate_chars(&r.title, TEMPLATE_TITLE_CHARS, "...")));
        }
        out
    }
}

impl Summarizer for TemplateSummarizer {
    fn summarize(&self, _query: &str, results: &[RankedResult]) -> Result<String, SummaryError> {
        Ok(Self::render(results))
    }

    fn name(&self) -> &'static str { "template" }
}

/// Ask `summarizer`, answering with the template if it fails or returns
/// nothing. Zero results never reach the summarizer.
pub fn summarize_or_fallback(summarizer: &dyn Summarizer, query: &str, results: &[RankedResult]) -> String {
    if results.is_empty() {
        return TemplateSummarizer::render(results);
    }
    match summarizer.summarize(query, results) {
        Ok(answer) if !answer.trim().is_empty() => answer,
        Ok(_) => {
            tracing::warn!(summarizer = summarizer.name(), "empty answer, using template");
            TemplateSummarizer::render(results)
        }
        Err(err) => {
            tracing::warn!(summarizer = summarizer.name(), error = %err, "summarizer failed, using template");
            TemplateSummarizer::render(results)
        }
    }
}

/// Context block for a remote prompt: top results, title plus body excerpt.
pub fn context_block(results: &[RankedResult]) -> String {
    results
        .iter()
        .take(CONTEXT_RESULTS)
        .map(|r| format!("Title: {}\nText: {}", r.title, truncate_chars(&r.body, CONTEXT_BODY_CHARS, "")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn truncate_chars(text: &str, max: usize, ellipsis: &str) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ellipsis),
        None => text.to_string(),
    }
}
