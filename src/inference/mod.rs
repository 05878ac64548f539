//! Inference module for leaf classification
//!
//! This module provides:
//! - Image decoding and ImageNet preprocessing
//! - Top-1 prediction results
//! - The classifier handle shared by the HTTP handlers

pub mod classifier;
pub mod predictor;

// Re-export main types for convenience
pub use classifier::{BurnClassifier, Classifier, ClassifierHandle};
pub use predictor::{decode_image, image_to_tensor, preprocess, Prediction};
