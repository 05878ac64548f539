//! Backend selection - NdArray (CPU) inference backend
//!
//! The server only runs forward passes, so it uses the plain NdArray backend
//! without the autodiff decorator. No gradients are ever tracked.

use burn::tensor::backend::Backend;

/// Backend used for classifier inference
pub type InferenceBackend = burn_ndarray::NdArray<f32>;

/// Get the default device for the inference backend
pub fn default_device() -> <InferenceBackend as Backend>::Device {
    <InferenceBackend as Backend>::Device::default()
}

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    "NdArray (CPU)"
}
