//! Error Handling Module
//!
//! Defines the error types for the PlantVillage advisor.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::advisor::upstream::UpstreamError;

/// Main error type for advisor operations
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// A required request field is missing or the request body is unusable
    #[error("{0}")]
    Validation(String),

    /// The request body exceeds the configured upload limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The classifier failed to load at startup
    #[error("Model not loaded: {0}")]
    ModelUnavailable(String),

    /// Error while reading a checkpoint into the model
    #[error("Failed to load model checkpoint: {0}")]
    ModelLoad(String),

    /// Uploaded bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Error while running the forward pass
    #[error("Inference error: {0}")]
    Inference(String),

    /// Error talking to the language model API
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for AdvisorError {
    fn from(err: image::ImageError) -> Self {
        AdvisorError::ImageDecode(err.to_string())
    }
}

/// Convenience Result type for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| AdvisorError::Inference(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| AdvisorError::Inference(format!("{}: {}", f(), e)))
    }
}

impl<T> ResultExt<T> for Option<T> {
    fn context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AdvisorError::Inference(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.ok_or_else(|| AdvisorError::Inference(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdvisorError::Validation("No message provided".to_string());
        assert_eq!(format!("{}", err), "No message provided");

        let err = AdvisorError::ModelUnavailable("checkpoint missing".to_string());
        assert_eq!(format!("{}", err), "Model not loaded: checkpoint missing");
    }

    #[test]
    fn test_path_not_found() {
        let err = AdvisorError::PathNotFound(PathBuf::from("/models/alexnet.pkl"));
        assert!(format!("{}", err).contains("alexnet.pkl"));
    }

    #[test]
    fn test_upstream_is_transparent() {
        let err: AdvisorError = UpstreamError::NoCandidates.into();
        assert_eq!(err.to_string(), UpstreamError::NoCandidates.to_string());
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<i32, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "worker panicked"));

        let with_context = result.context("Inference task failed");
        assert!(matches!(with_context, Err(AdvisorError::Inference(msg)) if msg.contains("worker panicked")));
    }

    #[test]
    fn test_option_context() {
        let opt: Option<i32> = None;
        let with_context = opt.with_context(|| "No class for index 42".to_string());
        assert!(with_context.is_err());
    }
}
