//! Prompt construction for the language model

use serde::{Deserialize, Deserializer};

const CHAT_PREAMBLE: &str = "You are a plant disease expert assistant. Please provide responses in plain text format. Use **bold** for emphasis, *italics* for scientific terms, and # for headings. Use bullet points (- or •) for lists. Avoid using LaTeX or markdown formatting. ";

/// Diagnosis details a client may attach to a chat message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatContext {
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prevention: Vec<String>,
}

/// Clients send `null` for lists they do not have
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ChatContext {
    pub fn with_disease(disease: impl Into<String>) -> Self {
        Self {
            disease: Some(disease.into()),
            ..Default::default()
        }
    }
}

/// Build the chat prompt for `user_query`, optionally grounded in a diagnosis
pub fn build_chat_prompt(user_query: &str, context: Option<&ChatContext>) -> String {
    let mut prompt = String::from(CHAT_PREAMBLE);

    let diagnosed = context.and_then(|ctx| {
        ctx.disease
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|disease| (ctx, disease))
    });

    if let Some((ctx, disease)) = diagnosed {
        prompt.push_str(&format!("The user's plant has been diagnosed with {} ", disease));

        if let Some(severity) = ctx.severity.as_deref().filter(|s| !s.is_empty()) {
            prompt.push_str(&format!("with {} severity. ", severity));
        }
        if !ctx.recommendations.is_empty() {
            prompt.push_str("\nRecommended actions:\n");
            prompt.push_str(&bullet_lines(&ctx.recommendations));
        }
        if !ctx.prevention.is_empty() {
            prompt.push_str("\nPrevention measures:\n");
            prompt.push_str(&bullet_lines(&ctx.prevention));
        }
        prompt.push_str("\n\nBased on this context, ");
    }

    prompt.push_str(&format!(
        "Answer this user query concisely and professionally: {}",
        user_query
    ));
    prompt
}

/// Build the two-section remedy request for a disease name
pub fn build_remedy_prompt(disease: &str) -> String {
    format!(
        "You are a plant disease expert. For the plant disease '{}', provide eco-friendly remedies in two sections: 1) Immediate Actions as a numbered list of steps to address the active infection, 2) Future Prevention as a numbered list of steps to avoid recurrence. Use the exact headers 'Immediate Actions' and 'Future Prevention' and keep each section concise.",
        disease
    )
}

fn bullet_lines(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
