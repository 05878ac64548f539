//! # PlantVillage Advisor
//!
//! A small web backend that labels plant leaf photos with a disease category and
//! asks an external language model for remedy advice.
//!
//! ## Features
//!
//! - **AlexNet classifier** built with Burn, loaded once from a Burn or PyTorch checkpoint
//! - **Remedy advice** from the Gemini `generateContent` API, parsed into
//!   "Immediate Actions" and "Future Prevention" lists
//! - **Chat** endpoint with optional diagnosis context
//! - **Markup formatting** of model replies into inline HTML fragments
//!
//! ## Modules
//!
//! - `model`: AlexNet architecture, class labels and checkpoint loading
//! - `inference`: image preprocessing and the classifier handle used by the server
//! - `advisor`: prompt building, upstream client, remedy parsing and markup formatting
//! - `server`: axum router, shared state and request handlers
//! - `utils`: logging and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plantvillage_advisor::advisor::markup::format_response;
//! use plantvillage_advisor::advisor::remedy::parse_remedy_text;
//!
//! let html = format_response("**Prune** infected leaves");
//! let remedy = parse_remedy_text("Immediate Actions 1. do X Future Prevention 1. avoid Z");
//! ```

pub mod advisor;
pub mod backend;
pub mod inference;
pub mod model;
pub mod server;
pub mod utils;

// Re-export commonly used items for convenience
pub use advisor::markup::format_response;
pub use advisor::prompt::{build_chat_prompt, build_remedy_prompt, ChatContext};
pub use advisor::remedy::{parse_remedy_reply, parse_remedy_text, RemedyOutcome, RemedyResult};
pub use advisor::upstream::{GeminiClient, GeminiConfig, LanguageModel, UpstreamError};
pub use inference::classifier::{Classifier, ClassifierHandle};
pub use inference::predictor::Prediction;
pub use model::labels::ClassLabel;
pub use server::state::{AppState, ServerConfig, SharedState};
pub use utils::error::{AdvisorError, Result};

/// Number of disease categories the classifier predicts
pub const NUM_CLASSES: usize = 10;

/// Square input resolution expected by the classifier
pub const IMAGE_SIZE: usize = 224;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
