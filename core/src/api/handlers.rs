//! JSON text endpoints

use super::errors::{ApiError, ApiJson};
use super::models::{
    AnswerResponse, GenerateRequest, GenerateResponse, QaRequest, SentimentResponse,
    SimilarityRequest, SimilarityResponse, SummaryResponse, TextRequest, TranslationResponse,
};
use super::AppState;
use axum::extract::State;
use axum::Json;
use log::debug;

/// Runs collaborator work off the async runtime
pub(crate) async fn run_blocking<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {}", e)))?
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn translate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let text = request.validate()?;
    debug!("Translating {} bytes", text.len());
    let services = state.services.clone();
    let translation = run_blocking(move || Ok(services.translator.get()?.translate(&text)?)).await?;
    Ok(Json(TranslationResponse { translation }))
}

pub async fn summarize(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let text = request.validate()?;
    let services = state.services.clone();
    let summary = run_blocking(move || Ok(services.summarizer.get()?.summarize(&text)?)).await?;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn sentiment(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<SentimentResponse>, ApiError> {
    let text = request.validate()?;
    let services = state.services.clone();
    let sentiments = run_blocking(move || Ok(services.sentiment.get()?.classify(&text)?)).await?;
    Ok(Json(SentimentResponse { sentiments }))
}

pub async fn question_answering(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<QaRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let (question, context) = request.validate()?;
    let services = state.services.clone();
    let span = run_blocking(move || {
        Ok(services
            .question_answerer
            .get()?
            .answer(&question, &context)?)
    })
    .await?;
    debug!("Answer span {}..{} (score {:.3})", span.start, span.end, span.score);
    Ok(Json(AnswerResponse {
        answer: span.answer,
    }))
}

pub async fn similarity(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SimilarityRequest>,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let (text1, text2) = request.validate()?;
    let services = state.services.clone();
    let similarity =
        run_blocking(move || Ok(services.similarity.get()?.similarity(&text1, &text2)?)).await?;
    Ok(Json(SimilarityResponse { similarity }))
}

pub async fn generate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let prompt = request.validate()?;
    let services = state.services.clone();
    let generated_text =
        run_blocking(move || Ok(services.generator.get()?.generate(&prompt)?)).await?;
    Ok(Json(GenerateResponse { generated_text }))
}
