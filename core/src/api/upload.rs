//! Multipart image endpoints

use super::errors::ApiError;
use super::handlers::run_blocking;
use super::models::{AnalyzeResponse, ImageLabelResponse, TextAnalysis};
use super::AppState;
use crate::decode::raster;
use crate::types::AnalysisError;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use log::{debug, info, warn};

#[derive(Debug)]
struct UploadedImage {
    file_name: Option<String>,
    bytes: Bytes,
}

#[derive(Debug, Default)]
struct UploadForm {
    image: Option<UploadedImage>,
    text: Option<String>,
}

/// Collects the `image` and `text` fields; other fields are ignored
async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
                // browsers send an empty part when no file is chosen
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage { file_name, bytes });
                }
            }
            Some("text") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read text: {}", e)))?;
                if !text.trim().is_empty() {
                    form.text = Some(text);
                }
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }
    Ok(form)
}

pub async fn analyze_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImageLabelResponse>, ApiError> {
    let image = read_form(&mut multipart)
        .await?
        .image
        .ok_or_else(|| ApiError::BadRequest("Image file is required".to_string()))?;

    let services = state.services.clone();
    let predicted_class = run_blocking(move || {
        let decoded = raster::load_bytes(&image.bytes)
            .map_err(|e| ApiError::BadRequest(format!("Invalid image: {}", e)))?;
        Ok(services.image_labeler.get()?.label(&decoded)?)
    })
    .await?;
    Ok(Json(ImageLabelResponse { predicted_class }))
}

/// Combined analysis of an optional image and optional free text
///
/// Failures of either half are reported inside the body; the request
/// itself still succeeds. When a store is configured the result is
/// recorded before responding, and a store failure is a 500.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let form = read_form(&mut multipart).await?;
    let image_name = form.image.as_ref().and_then(|i| i.file_name.clone());
    info!(
        "Analyze request: image={} text={}",
        form.image.is_some(),
        form.text.is_some()
    );

    let analyzer = state.analyzer.clone();
    let services = state.services.clone();
    let store = state.store.clone();
    let record_name = image_name.clone();
    let (image_analysis, text_analysis) = run_blocking(move || {
        let image_analysis = form.image.map(|image| {
            analyzer.analyze_bytes(&image.bytes, image.file_name.as_deref())
        });
        let text_analysis = form.text.map(|text| {
            match services.entities.get().and_then(|e| e.extract(&text)) {
                Ok(entities) => TextAnalysis::Entities(entities),
                Err(e) => {
                    warn!("Entity extraction failed: {}", e);
                    TextAnalysis::Error(AnalysisError::new(e.to_string()))
                }
            }
        });
        if let Some(store) = store {
            store.save(
                record_name.as_deref(),
                image_analysis.as_ref(),
                text_analysis.as_ref(),
            )?;
        }
        Ok((image_analysis, text_analysis))
    })
    .await?;

    Ok(Json(AnalyzeResponse {
        image_analysis,
        text_analysis,
        image_name,
    }))
}
