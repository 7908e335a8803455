//! HTTP surface over the analyzer and the text services
//!
//! Every endpoint answers JSON. Validation failures are 400 and
//! collaborator failures are 500, both shaped `{"error": "..."}`.

mod errors;
mod handlers;
mod models;
mod upload;

pub use errors::{ApiError, ApiJson};
pub use models::*;

use crate::analysis::Analyzer;
use crate::classifier::{Classifier, MockClassifier};
use crate::normalizer::ImageNormalizer;
use crate::services::ServiceRegistry;
use crate::store::ResultStore;
use crate::types::NormalizerConfig;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

/// Largest accepted request body (uploads included)
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub type SharedClassifier = Arc<dyn Classifier>;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer<SharedClassifier>>,
    pub services: Arc<ServiceRegistry>,
    /// Where `/analyze` results are recorded, if anywhere
    pub store: Option<Arc<ResultStore>>,
}

impl AppState {
    pub fn new(analyzer: Analyzer<SharedClassifier>, services: ServiceRegistry) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            services: Arc::new(services),
            store: None,
        }
    }

    pub fn with_store(mut self, store: ResultStore) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// State wired to the mock classifier and the mock service registry
    pub fn mock(config: NormalizerConfig) -> Self {
        let classifier: SharedClassifier = Arc::new(MockClassifier);
        Self::new(
            Analyzer::new(ImageNormalizer::new(config), classifier),
            ServiceRegistry::mock(),
        )
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/translate", post(handlers::translate))
        .route("/summarize", post(handlers::summarize))
        .route("/sentiment", post(handlers::sentiment))
        .route("/qa", post(handlers::question_answering))
        .route("/similarity", post(handlers::similarity))
        .route("/generate", post(handlers::generate))
        .route("/analyze-image", post(upload::analyze_image))
        .route("/analyze", post(upload::analyze))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await
}
