//! Classifier handle shared by request handlers
//!
//! The model is loaded once at startup. If loading fails the server still
//! starts and every classification request reports the model as unavailable.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, error, info};

use super::predictor::{image_to_tensor, Prediction};
use crate::backend::{default_device, InferenceBackend};
use crate::model::alexnet::{AlexNet, AlexNetConfig};
use crate::model::checkpoint::load_alexnet;
use crate::utils::error::{AdvisorError, Result};

/// Anything that can label an encoded leaf image
pub trait Classifier: Send + Sync {
    fn predict(&self, image_bytes: &[u8]) -> Result<Prediction>;
}

/// Burn AlexNet running on the CPU backend
pub struct BurnClassifier {
    model: Mutex<AlexNet<InferenceBackend>>,
    device: <InferenceBackend as burn::tensor::backend::Backend>::Device,
}

impl BurnClassifier {
    pub fn new(model: AlexNet<InferenceBackend>) -> Self {
        Self {
            model: Mutex::new(model),
            device: default_device(),
        }
    }

    /// Load weights from a Burn or PyTorch checkpoint
    pub fn from_checkpoint(path: &Path) -> Result<Self> {
        let device = default_device();
        let model = load_alexnet::<InferenceBackend>(path, &AlexNetConfig::new(), &device)?;
        Ok(Self::new(model))
    }
}

impl Classifier for BurnClassifier {
    fn predict(&self, image_bytes: &[u8]) -> Result<Prediction> {
        let start = Instant::now();
        let input = image_to_tensor::<InferenceBackend>(image_bytes, &self.device)?;

        let probabilities: Vec<f32> = {
            let model = self
                .model
                .lock()
                .map_err(|_| AdvisorError::Inference("model lock poisoned".to_string()))?;
            model
                .forward_softmax(input)
                .into_data()
                .to_vec()
                .map_err(|e| AdvisorError::Inference(format!("{:?}", e)))?
        };

        let prediction = Prediction::from_probabilities(&probabilities)?;
        debug!(
            "Predicted {} ({:.2}%) in {:.1} ms",
            prediction.label,
            prediction.confidence_percent(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(prediction)
    }
}

/// Process-wide classifier slot, fixed after startup
#[derive(Clone)]
pub enum ClassifierHandle {
    Available(Arc<dyn Classifier>),
    /// Holds the reason loading failed
    Unavailable(String),
}

impl ClassifierHandle {
    /// Load the checkpoint at `path`, logging instead of failing
    pub fn load(path: &Path) -> Self {
        let start = Instant::now();
        match BurnClassifier::from_checkpoint(path) {
            Ok(classifier) => {
                info!(
                    "Model loaded from {:?} in {}",
                    path,
                    crate::utils::format_duration(start.elapsed().as_secs_f64())
                );
                ClassifierHandle::Available(Arc::new(classifier))
            }
            Err(e) => {
                error!("Error loading model: {}", e);
                ClassifierHandle::Unavailable(e.to_string())
            }
        }
    }

    pub fn from_classifier(classifier: Arc<dyn Classifier>) -> Self {
        ClassifierHandle::Available(classifier)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ClassifierHandle::Available(_))
    }

    /// Fail with `ModelUnavailable` when no model was loaded
    pub fn ensure_available(&self) -> Result<()> {
        match self {
            ClassifierHandle::Available(_) => Ok(()),
            ClassifierHandle::Unavailable(reason) => {
                Err(AdvisorError::ModelUnavailable(reason.clone()))
            }
        }
    }

    /// Classify an image, or fail with `ModelUnavailable`
    pub fn predict(&self, image_bytes: &[u8]) -> Result<Prediction> {
        match self {
            ClassifierHandle::Available(classifier) => classifier.predict(image_bytes),
            ClassifierHandle::Unavailable(reason) => {
                Err(AdvisorError::ModelUnavailable(reason.clone()))
            }
        }
    }
}

impl std::fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierHandle::Available(_) => f.write_str("ClassifierHandle::Available"),
            ClassifierHandle::Unavailable(reason) => {
                write!(f, "ClassifierHandle::Unavailable({})", reason)
            }
        }
    }
}
