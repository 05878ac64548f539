//! Application state for the advisor server
//!
//! Holds the configuration, the classifier loaded at startup and the language
//! model client. Handlers only ever read from it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::advisor::upstream::{GeminiConfig, LanguageModel};
use crate::inference::classifier::ClassifierHandle;
use crate::utils::error::{AdvisorError, Result};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Classifier checkpoint (.mpk, .pt, .pth, .pkl or .tar)
    pub model_path: PathBuf,
    /// Directory holding index.html and other static assets
    pub static_dir: PathBuf,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Language model settings
    pub gemini: GeminiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from("models/alexnet.pkl"),
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 10 * 1024 * 1024,
            gemini: GeminiConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Check settings that must hold before the server starts
    pub fn validate(&self) -> Result<()> {
        self.gemini.validate()?;
        if self.max_upload_bytes == 0 {
            return Err(AdvisorError::Config(
                "Upload limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Classifier, or the reason it could not be loaded
    pub classifier: ClassifierHandle,
    /// Client for remedy and chat replies
    pub llm: Arc<dyn LanguageModel>,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        classifier: ClassifierHandle,
        llm: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            config,
            classifier,
            llm,
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
