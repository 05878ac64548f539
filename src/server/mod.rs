//! HTTP server: router, shared state and request handlers
//!
//! ## Endpoints
//!
//! - `GET /` landing page, `GET /static/*` assets
//! - `GET /health` liveness and model status
//! - `POST /chat` free-form questions with optional diagnosis context
//! - `POST /remedy` remedy lists for a named disease
//! - `POST /analyze` classify an uploaded leaf photo and fetch remedies

pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppState, ServerConfig, SharedState};

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        // Static frontend
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))

        // Health check
        .route("/health", get(routes::health::health_check))

        // Advisor endpoints
        .route("/chat", post(routes::chat::chat))
        .route("/remedy", post(routes::remedy::remedy))
        .route("/analyze", post(routes::analyze::analyze))

        // Add state
        .with_state(state)

        // Add middleware
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}


#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Response;
    use serde_json::Value;

    use super::state::{AppState, ServerConfig, SharedState};
    use crate::advisor::upstream::{GenerationConfig, GeminiConfig, LanguageModel, UpstreamError};
    use crate::inference::classifier::{Classifier, ClassifierHandle};
    use crate::inference::predictor::Prediction;
    use crate::model::labels::ClassLabel;
    use crate::utils::error::Result;

    /// Language model returning a canned reply and recording prompts
    pub struct StubModel {
        reply: std::result::Result<String, fn() -> UpstreamError>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
        pub generation: Mutex<Vec<Option<GenerationConfig>>>,
    }

    impl StubModel {
        pub fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                generation: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(err: fn() -> UpstreamError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(err),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                generation: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl LanguageModel for StubModel {
        async fn generate(
            &self,
            prompt: &str,
            generation: Option<&GenerationConfig>,
        ) -> std::result::Result<String, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.generation.lock().unwrap().push(generation.copied());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    /// Classifier that always returns the same label
    pub struct StubClassifier {
        pub label: &'static str,
        pub confidence: f32,
    }

    impl Classifier for StubClassifier {
        fn predict(&self, _image_bytes: &[u8]) -> Result<Prediction> {
            Ok(Prediction {
                label: ClassLabel::from_name(self.label).unwrap(),
                confidence: self.confidence,
            })
        }
    }

    pub fn state_with(classifier: ClassifierHandle, llm: Arc<StubModel>) -> SharedState {
        let config = ServerConfig {
            gemini: GeminiConfig::new("test-key"),
            ..Default::default()
        };
        Arc::new(AppState::new(config, classifier, llm))
    }

    pub async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
