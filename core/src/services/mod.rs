//! Collaborator service contracts
//!
//! Each trait is a single-call contract for an external model (translation,
//! summarization, ...). The HTTP layer only talks to these traits, so a real
//! backend can replace the mock ones in [`mock`] without touching handlers.
//! Handles are created lazily through [`LazyService`] and bundled in a
//! [`ServiceRegistry`].

mod lazy;
pub mod mock;
mod registry;

pub use lazy::LazyService;
pub use registry::ServiceRegistry;

use crate::error::Result;
use image::DynamicImage;
use std::collections::BTreeMap;

/// Sentiment label with confidence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

/// Answer span extracted from a context
///
/// `start` and `end` are byte offsets into the context.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AnswerSpan {
    pub answer: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> Result<String>;
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String>;
}

pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Vec<Sentiment>>;
}

pub trait QuestionAnswerer: Send + Sync {
    fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan>;
}

pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f32>;
}

pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

pub trait ImageLabeler: Send + Sync {
    fn label(&self, image: &DynamicImage) -> Result<String>;
}

/// Named-entity extraction: entity label to the last matching text
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<BTreeMap<String, String>>;
}

/// Lowercase alphanumeric tokens
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Sentences with their byte ranges
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of text,
/// so decimals like "38.5" stay whole.
pub(crate) fn sentences(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = chars
            .peek()
            .map(|&(_, next)| next.is_whitespace())
            .unwrap_or(true);
        if matches!(c, '.' | '!' | '?') && at_boundary {
            let end = i + c.len_utf8();
            push_trimmed(text, start, end, &mut spans);
            start = end;
        }
    }
    push_trimmed(text, start, text.len(), &mut spans);
    spans
}

fn push_trimmed(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if !trimmed.is_empty() {
        spans.push((start + lead, start + lead + trimmed.len()));
    }
}
