//! Parsing of two-section remedy replies
//!
//! The model is asked for an "Immediate Actions" list followed by a
//! "Future Prevention" list. Replies that do not follow that shape are reported
//! as `RemedyOutcome::Malformed` rather than as errors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::markup::format_response;

const ACTIONS_HEADER: &str = "Immediate Actions";
const PREVENTION_HEADER: &str = "Future Prevention";

static LEADING_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^start\s*").expect("valid start regex"));
static ITEM_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s+").expect("valid item number regex"));

/// Remedy steps as HTML fragments, in the order the model gave them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedyResult {
    pub immediate_actions: Vec<String>,
    pub future_prevention: Vec<String>,
}

impl RemedyResult {
    pub fn is_empty(&self) -> bool {
        self.immediate_actions.is_empty() && self.future_prevention.is_empty()
    }
}

/// Result of parsing a remedy reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemedyOutcome {
    Parsed(RemedyResult),
    /// The reply did not contain exactly one "Future Prevention" marker
    Malformed,
}

impl RemedyOutcome {
    /// Collapse to a result, using empty lists for a malformed reply
    pub fn into_result(self) -> RemedyResult {
        match self {
            RemedyOutcome::Parsed(result) => result,
            RemedyOutcome::Malformed => RemedyResult::default(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RemedyOutcome::Malformed)
    }
}

/// Split a reply into its two sections and format every numbered step
pub fn parse_remedy_reply(text: &str) -> RemedyOutcome {
    let mut halves = text.split(PREVENTION_HEADER);
    let (actions, prevention) = match (halves.next(), halves.next(), halves.next()) {
        (Some(actions), Some(prevention), None) => (actions, prevention),
        _ => return RemedyOutcome::Malformed,
    };

    RemedyOutcome::Parsed(RemedyResult {
        immediate_actions: section_items(&actions.replace(ACTIONS_HEADER, "")),
        future_prevention: section_items(prevention),
    })
}

/// Parse a reply, treating a malformed one as having no steps
pub fn parse_remedy_text(text: &str) -> RemedyResult {
    parse_remedy_reply(text).into_result()
}

fn section_items(section: &str) -> Vec<String> {
    let section = LEADING_START.replace(section.trim(), "");

    ITEM_NUMBER
        .split(section.trim())
        .map(drop_punctuation_lines)
        .filter(|item| !item.is_empty() && !item.to_lowercase().contains("start"))
        .map(|item| format_response(&item))
        .filter(|html| !html.is_empty())
        .collect()
}

/// Remove lines left with nothing but markup, e.g. `**:**` after a bold header
fn drop_punctuation_lines(fragment: &str) -> String {
    fragment
        .lines()
        .filter(|line| line.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
