//! Remedy advice and chat through an external language model
//!
//! This module provides:
//! - Prompt construction for chat and remedy requests
//! - The `LanguageModel` seam and its Gemini implementation
//! - Parsing of two-section remedy replies
//! - Conversion of reply markup into HTML fragments

pub mod markup;
pub mod prompt;
pub mod remedy;
pub mod upstream;

pub use markup::format_response;
pub use prompt::{build_chat_prompt, build_remedy_prompt, ChatContext};
pub use remedy::{parse_remedy_reply, parse_remedy_text, RemedyOutcome, RemedyResult};
pub use upstream::{GeminiClient, GeminiConfig, GenerationConfig, LanguageModel, UpstreamError};
