//! Analyze endpoint - classify a leaf photo and fetch remedies for it

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use super::remedy::{fetch_remedy, RemedyResponse};
use crate::server::error::ApiError;
use crate::server::state::SharedState;
use crate::utils::error::ResultExt;

/// Multipart field carrying the photo
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Display name of the predicted class, e.g. "Apple Scab"
    pub disease: String,
    /// Confidence in percent
    pub confidence: f64,
    #[serde(flatten)]
    pub remedy: RemedyResponse,
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Bytes>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::rejected(e.status(), format!("Failed to read image: {}", e)))?;
            return Ok(Some(data));
        }
    }
    Ok(None)
}

/// POST /analyze - Classify an uploaded image and return remedies
pub async fn analyze(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::validation("No image provided"))?;
    let image = read_image_field(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::validation("No image provided"))?;

    // Fail before decoding or calling upstream
    state.classifier.ensure_available()?;

    let size = image.len();
    let classifier = state.classifier.clone();
    let prediction = tokio::task::spawn_blocking(move || classifier.predict(&image))
        .await
        .context("Inference task failed")??;

    let disease = prediction.label.display_name();
    info!(
        "Classified {} byte upload as {} ({:.1}%)",
        size,
        disease,
        prediction.confidence_percent()
    );

    let outcome = fetch_remedy(&state, &disease).await?;

    Ok(Json(AnalyzeResponse {
        disease,
        confidence: prediction.confidence_percent(),
        remedy: RemedyResponse::from_outcome(outcome),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::upstream::GeminiConfig;
    use crate::inference::classifier::ClassifierHandle;
    use crate::server::router;
    use crate::server::state::{AppState, ServerConfig};
    use crate::server::test_support::{json_body, state_with, StubClassifier, StubModel};
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "advisor-test-boundary";

    fn multipart_request(field: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"leaf.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const REPLY: &str = "Immediate Actions 1. Remove infected leaves Future Prevention 1. Rake fallen leaves";

    #[tokio::test]
    async fn test_missing_image_field() {
        let llm = StubModel::replying(REPLY);
        let classifier = ClassifierHandle::from_classifier(Arc::new(StubClassifier {
            label: "Apple_scab",
            confidence: 0.9,
        }));
        let app = router(state_with(classifier, llm.clone()));

        let response = app
            .clone()
            .oneshot(multipart_request("photo", b"bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(json_body(response).await["error"], "No image provided");

        let not_multipart = Request::post("/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(not_multipart).await.unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_model_fails_before_upstream() {
        let llm = StubModel::replying(REPLY);
        let classifier = ClassifierHandle::Unavailable("checkpoint missing".to_string());
        let app = router(state_with(classifier, llm.clone()));

        let response = app
            .oneshot(multipart_request("image", b"not even an image"))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);

        let json = json_body(response).await;
        assert_eq!(json["kind"], "model_unavailable");
        assert_eq!(json["error"], "Model not loaded");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let llm = StubModel::replying(REPLY);
        let classifier = ClassifierHandle::from_classifier(Arc::new(StubClassifier {
            label: "Apple_scab",
            confidence: 0.9,
        }));
        let config = ServerConfig {
            max_upload_bytes: 1024,
            gemini: GeminiConfig::new("test-key"),
            ..Default::default()
        };
        let app = router(Arc::new(AppState::new(config, classifier, llm.clone())));

        let response = app
            .oneshot(multipart_request("image", &vec![0u8; 4096]))
            .await
            .unwrap();
        assert_eq!(response.status(), 413);
        assert_eq!(json_body(response).await["kind"], "payload_too_large");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_classifies_and_fetches_remedy() {
        let llm = StubModel::replying(REPLY);
        let classifier = ClassifierHandle::from_classifier(Arc::new(StubClassifier {
            label: "Corn_gray_leaf_spot",
            confidence: 0.75,
        }));
        let app = router(state_with(classifier, llm.clone()));

        let response = app
            .oneshot(multipart_request("image", b"png bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let json = json_body(response).await;
        assert_eq!(json["disease"], "Corn Gray Leaf Spot");
        assert!((json["confidence"].as_f64().unwrap() - 75.0).abs() < 1e-3);
        assert_eq!(json["immediateActions"][0], "Remove infected leaves");
        assert_eq!(json["futurePrevention"][0], "Rake fallen leaves");
        assert!(json.get("warning").is_none());

        assert_eq!(llm.call_count(), 1);
        assert!(llm
            .last_prompt()
            .unwrap()
            .contains("For the plant disease 'Corn Gray Leaf Spot'"));
    }
}
