//! End-to-end checks of the HTTP surface with stubbed model and language model

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tower::ServiceExt;

use plantvillage_advisor::advisor::upstream::{GenerationConfig, LanguageModel, UpstreamError};
use plantvillage_advisor::inference::{decode_image, Classifier, ClassifierHandle, Prediction};
use plantvillage_advisor::server::{router, AppState, ServerConfig};
use plantvillage_advisor::{AdvisorError, ClassLabel, GeminiConfig};

const BOUNDARY: &str = "leaf-upload-boundary";

const REMEDY_REPLY: &str = "**Immediate Actions:**\n\
1. Remove and destroy infected leaves\n\
2. Apply a *sulfur*-based fungicide\n\
\n\
**Future Prevention:**\n\
1. Plant scab-resistant varieties\n\
2. Rake fallen leaves in autumn";

struct CountingModel {
    calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for CountingModel {
    async fn generate(
        &self,
        prompt: &str,
        _generation: Option<&GenerationConfig>,
    ) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains("'Apple Scab'"));
        Ok(REMEDY_REPLY.to_string())
    }
}

/// Checks the upload really is an image, then reports Apple_scab at 92%
struct ScabClassifier;

impl Classifier for ScabClassifier {
    fn predict(&self, image_bytes: &[u8]) -> Result<Prediction, AdvisorError> {
        decode_image(image_bytes)?;
        Ok(Prediction {
            label: ClassLabel::from_name("Apple_scab").unwrap(),
            confidence: 0.92,
        })
    }
}

fn leaf_png() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 3) as u8, 120, (y * 5) as u8]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn upload(data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"leaf.png\"\r\nContent-Type: image/png\r\n\r\n"
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

fn app(classifier: ClassifierHandle, llm: Arc<CountingModel>) -> axum::Router {
    let config = ServerConfig {
        gemini: GeminiConfig::new("integration-key"),
        ..Default::default()
    };
    router(Arc::new(AppState::new(config, classifier, llm)))
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn analyze_returns_diagnosis_and_parsed_remedy() {
    let llm = Arc::new(CountingModel {
        calls: AtomicUsize::new(0),
    });
    let classifier = ClassifierHandle::from_classifier(Arc::new(ScabClassifier));

    let response = app(classifier, llm.clone())
        .oneshot(upload(&leaf_png()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = json(response).await;
    assert_eq!(body["disease"], "Apple Scab");
    assert!((body["confidence"].as_f64().unwrap() - 92.0).abs() < 1e-3);
    assert_eq!(
        body["immediateActions"],
        serde_json::json!([
            "Remove and destroy infected leaves",
            "Apply a <em>sulfur</em>-based fungicide"
        ])
    );
    assert_eq!(
        body["futurePrevention"],
        serde_json::json!([
            "Plant scab-resistant varieties",
            "Rake fallen leaves in autumn"
        ])
    );
    assert!(body.get("warning").is_none());
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn undecodable_upload_is_a_processing_error() {
    let llm = Arc::new(CountingModel {
        calls: AtomicUsize::new(0),
    });
    let classifier = ClassifierHandle::from_classifier(Arc::new(ScabClassifier));

    let response = app(classifier, llm.clone())
        .oneshot(upload(b"this is not a picture"))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(json(response).await["kind"], "processing");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_checkpoint_keeps_server_up() {
    let llm = Arc::new(CountingModel {
        calls: AtomicUsize::new(0),
    });
    let classifier = ClassifierHandle::load(std::path::Path::new("/nonexistent/alexnet.pkl"));
    let app = app(classifier, llm.clone());

    let health = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(json(health).await["modelAvailable"], false);

    let response = app.oneshot(upload(&leaf_png())).await.unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(json(response).await["kind"], "model_unavailable");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}
