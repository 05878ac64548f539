//! Image preprocessing and prediction results
//!
//! Turns uploaded image bytes into the normalized `[1, 3, 224, 224]` tensor the
//! classifier expects, and turns its probability vector back into a label.

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::{imageops::FilterType, DynamicImage};
use serde::Serialize;

use crate::model::labels::ClassLabel;
use crate::utils::error::{AdvisorError, Result, ResultExt};
use crate::IMAGE_SIZE;

/// ImageNet normalization mean values (RGB)
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet normalization std values (RGB)
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Decode raw upload bytes (any format the `image` crate detects)
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(AdvisorError::ImageDecode("empty upload".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Resize to a square of `size` pixels and normalize with ImageNet statistics
/// Returns CHW layout: [C, H, W] flattened
pub fn preprocess(image: &DynamicImage, size: u32) -> Vec<f32> {
    let rgb = image
        .resize_exact(size, size, FilterType::Triangle)
        .to_rgb8();
    let num_pixels = (size * size) as usize;

    let mut normalized = vec![0.0f32; 3 * num_pixels];
    for (i, pixel) in rgb.pixels().enumerate() {
        for c in 0..3 {
            normalized[c * num_pixels + i] =
                (pixel[c] as f32 / 255.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
        }
    }

    normalized
}

/// Decode and preprocess in one step, producing a batch of one
pub fn image_to_tensor<B: Backend>(bytes: &[u8], device: &B::Device) -> Result<Tensor<B, 4>> {
    let image = decode_image(bytes)?;
    let data = preprocess(&image, IMAGE_SIZE as u32);
    Ok(Tensor::<B, 4>::from_floats(
        TensorData::new(data, [1, 3, IMAGE_SIZE, IMAGE_SIZE]),
        device,
    ))
}

/// Top-1 prediction for one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: ClassLabel,
    /// Probability of `label`, in [0, 1]
    pub confidence: f32,
}

impl Prediction {
    /// Pick the most probable class from a softmax output
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        let (index, &confidence) = probabilities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .context("Classifier returned no probabilities")?;

        let label = ClassLabel::from_index(index)
            .with_context(|| format!("No class for output index {}", index))?;

        Ok(Self { label, confidence })
    }

    /// Confidence as a percentage in [0, 100]
    pub fn confidence_percent(&self) -> f64 {
        f64::from(self.confidence) * 100.0
    }
}
