//! Deterministic stand-ins for the model-backed services
//!
//! None of these download or run a model. They exist so the service
//! surface can be exercised and tested offline.

use super::{
    sentences, tokenize, AnswerSpan, EntityExtractor, ImageLabeler, QuestionAnswerer,
    Sentiment, SentimentClassifier, SimilarityScorer, Summarizer, TextGenerator, Translator,
};
use crate::error::{MedImageError, Result};
use image::DynamicImage;
use std::collections::{BTreeMap, HashMap, HashSet};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "improved", "improving", "stable", "normal", "healthy",
    "better", "recovered", "clear", "happy", "well",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "poor", "worse", "worsening", "pain", "severe", "abnormal", "sick", "fever",
    "infection", "failure", "unhappy", "critical",
];

/// Function words ignored when matching questions against context
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "do", "does", "for", "from", "how",
    "in", "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "were", "what",
    "when", "where", "which", "who", "why", "with",
];

/// Tags the text with the target language instead of translating it
#[derive(Debug, Clone)]
pub struct EchoTranslator {
    target: String,
}

impl EchoTranslator {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Translator for EchoTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        Ok(format!("[{}] {}", self.target, text.trim()))
    }
}

/// Keeps the leading sentences of the text
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    pub max_sentences: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self { max_sentences: 2 }
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(&self, text: &str) -> Result<String> {
        let parts: Vec<&str> = sentences(text)
            .into_iter()
            .take(self.max_sentences.max(1))
            .map(|(start, end)| &text[start..end])
            .collect();
        Ok(parts.join(" "))
    }
}

/// Counts words from small positive and negative lexicons
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl SentimentClassifier for LexiconSentiment {
    fn classify(&self, text: &str) -> Result<Vec<Sentiment>> {
        let tokens = tokenize(text);
        let pos = tokens
            .iter()
            .filter(|t| POSITIVE_WORDS.contains(&t.as_str()))
            .count();
        let neg = tokens
            .iter()
            .filter(|t| NEGATIVE_WORDS.contains(&t.as_str()))
            .count();

        let total = pos + neg;
        let (label, score) = if total == 0 {
            ("POSITIVE", 0.5)
        } else if pos >= neg {
            ("POSITIVE", 0.5 + 0.5 * (pos - neg) as f32 / total as f32)
        } else {
            ("NEGATIVE", 0.5 + 0.5 * (neg - pos) as f32 / total as f32)
        };
        Ok(vec![Sentiment {
            label: label.to_string(),
            score,
        }])
    }
}

/// Answers with the context sentence sharing the most words with the question
///
/// Stopwords are ignored unless the question consists of nothing else.
/// Ties go to the earliest sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapQuestionAnswerer;

impl OverlapQuestionAnswerer {
    fn content_words(text: &str) -> HashSet<String> {
        let all: HashSet<String> = tokenize(text).into_iter().collect();
        let content: HashSet<String> = all
            .iter()
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .cloned()
            .collect();
        if content.is_empty() {
            all
        } else {
            content
        }
    }
}

impl QuestionAnswerer for OverlapQuestionAnswerer {
    fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan> {
        let question_words = Self::content_words(question);
        if question_words.is_empty() {
            return Err(MedImageError::Service("question has no words".to_string()));
        }

        let mut best: Option<(usize, usize, usize)> = None;
        for (start, end) in sentences(context) {
            let overlap = tokenize(&context[start..end])
                .into_iter()
                .collect::<HashSet<_>>()
                .intersection(&question_words)
                .count();
            if best.map(|(_, _, o)| overlap > o).unwrap_or(true) {
                best = Some((start, end, overlap));
            }
        }

        let (start, end, overlap) =
            best.ok_or_else(|| MedImageError::Service("context has no sentences".to_string()))?;
        Ok(AnswerSpan {
            answer: context[start..end].to_string(),
            score: overlap as f32 / question_words.len() as f32,
            start,
            end,
        })
    }
}

/// Cosine similarity of word-count vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct BagOfWordsSimilarity;

impl BagOfWordsSimilarity {
    fn counts(text: &str) -> HashMap<String, f32> {
        let mut counts = HashMap::new();
        for token in tokenize(text) {
            *counts.entry(token).or_insert(0.0) += 1.0;
        }
        counts
    }
}

impl SimilarityScorer for BagOfWordsSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let (ca, cb) = (Self::counts(a), Self::counts(b));
        let dot: f32 = ca
            .iter()
            .filter_map(|(k, va)| cb.get(k).map(|vb| va * vb))
            .sum();
        let norm = |c: &HashMap<String, f32>| c.values().map(|v| v * v).sum::<f32>().sqrt();
        let denom = norm(&ca) * norm(&cb);
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok((dot / denom).clamp(0.0, 1.0))
    }
}

/// Replies with a fixed acknowledgement of the prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTextGenerator;

impl TextGenerator for MockTextGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        Ok(format!(
            "This is a mock response to your question: '{}'",
            prompt.trim()
        ))
    }
}

/// Labels an image by its mean luminance
#[derive(Debug, Clone, Copy, Default)]
pub struct BrightnessLabeler;

impl ImageLabeler for BrightnessLabeler {
    fn label(&self, image: &DynamicImage) -> Result<String> {
        let gray = image.to_luma8();
        let count = gray.as_raw().len();
        if count == 0 {
            return Err(MedImageError::ImageDecode("image has no pixels".to_string()));
        }
        let mean = gray.as_raw().iter().map(|&v| v as f32).sum::<f32>() / count as f32;
        let label = match mean {
            m if m < 85.0 => "dark",
            m if m < 170.0 => "mid-tone",
            _ => "bright",
        };
        Ok(label.to_string())
    }
}

/// Picks out numbers and capitalized terms that do not start a sentence
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedEntities;

impl EntityExtractor for CapitalizedEntities {
    fn extract(&self, text: &str) -> Result<BTreeMap<String, String>> {
        let mut entities = BTreeMap::new();
        for (start, end) in sentences(text) {
            let words: Vec<&str> = text[start..end]
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
                .filter(|w| !w.is_empty())
                .collect();

            let mut run: Vec<&str> = Vec::new();
            for (i, word) in words.iter().enumerate() {
                if word.chars().all(|c| c.is_ascii_digit() || c == '.') {
                    entities.insert("CARDINAL".to_string(), word.to_string());
                }
                let capitalized = word.chars().next().map(char::is_uppercase).unwrap_or(false);
                if capitalized && i > 0 {
                    run.push(word);
                } else if !run.is_empty() {
                    entities.insert("ENTITY".to_string(), run.join(" "));
                    run.clear();
                }
            }
            if !run.is_empty() {
                entities.insert("ENTITY".to_string(), run.join(" "));
            }
        }
        Ok(entities)
    }
}
