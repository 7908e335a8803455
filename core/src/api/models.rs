//! Request and response bodies

use super::errors::ApiError;
use crate::services::Sentiment;
use crate::types::{AnalysisError, AnalysisOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returns the value if present and not blank, else a 400 with `message`
///
/// Absent, `null` and whitespace-only fields are all treated as missing.
fn required(value: &Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ApiError::BadRequest(message.to_string())),
    }
}

/// Body of `/translate`, `/summarize` and `/sentiment`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl TextRequest {
    pub fn validate(&self) -> Result<String, ApiError> {
        required(&self.text, "Text is required")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl QaRequest {
    pub fn validate(&self) -> Result<(String, String), ApiError> {
        let message = "Question and context are required";
        Ok((
            required(&self.question, message)?,
            required(&self.context, message)?,
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityRequest {
    #[serde(default)]
    pub text1: Option<String>,
    #[serde(default)]
    pub text2: Option<String>,
}

impl SimilarityRequest {
    pub fn validate(&self) -> Result<(String, String), ApiError> {
        let message = "Two texts are required";
        Ok((required(&self.text1, message)?, required(&self.text2, message)?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<String, ApiError> {
        required(&self.prompt, "Prompt is required")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub sentiments: Vec<Sentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLabelResponse {
    pub predicted_class: String,
}

/// Entities found in free text, or the failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextAnalysis {
    Entities(BTreeMap<String, String>),
    Error(AnalysisError),
}

/// Body returned by `/analyze`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub image_analysis: Option<AnalysisOutcome>,
    pub text_analysis: Option<TextAnalysis>,
    pub image_name: Option<String>,
}
