//! Remedy endpoint - two-section treatment advice for a named disease

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::advisor::prompt::build_remedy_prompt;
use crate::advisor::remedy::{parse_remedy_reply, RemedyOutcome, RemedyResult};
use crate::server::error::ApiError;
use crate::server::state::SharedState;
use crate::utils::error::Result;

/// Warning attached when the model ignored the requested layout
pub const MALFORMED_REPLY_WARNING: &str =
    "The remedy reply did not follow the expected format; no steps could be extracted";

#[derive(Debug, Deserialize)]
pub struct RemedyRequest {
    #[serde(default)]
    pub disease: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RemedyResponse {
    #[serde(flatten)]
    pub remedy: RemedyResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl RemedyResponse {
    pub fn from_outcome(outcome: RemedyOutcome) -> Self {
        let warning = outcome
            .is_malformed()
            .then(|| MALFORMED_REPLY_WARNING.to_string());
        Self {
            remedy: outcome.into_result(),
            warning,
        }
    }
}

/// Ask the language model for remedies and parse its reply
pub async fn fetch_remedy(state: &SharedState, disease: &str) -> Result<RemedyOutcome> {
    let reply = state.llm.generate(&build_remedy_prompt(disease), None).await?;
    let outcome = parse_remedy_reply(&reply);
    if outcome.is_malformed() {
        warn!("Remedy reply for '{}' had no usable sections", disease);
    }
    Ok(outcome)
}

/// POST /remedy - Remedies for a disease name
pub async fn remedy(
    State(state): State<SharedState>,
    payload: std::result::Result<Json<RemedyRequest>, JsonRejection>,
) -> std::result::Result<Json<RemedyResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::rejected(e.status(), e.body_text()))?;

    let disease = request
        .disease
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::validation("No disease provided"))?;

    info!("Remedy request for '{}'", disease);
    let outcome = fetch_remedy(&state, &disease).await?;
    Ok(Json(RemedyResponse::from_outcome(outcome)))
}
