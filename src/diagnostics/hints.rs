//! Hint rules for failed-response messages.
//!
//! Each rule pattern-matches the error message and, on a match, extracts a
//! quoted token or numeric position and renders one suggestion. Rules are
//! independent; every matching rule fires.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::StatusCode;

use crate::inference::pluralize;

/// A single message-pattern rule.
struct HintRule {
    /// Rule identifier, for tracing.
    name: &'static str,
    pattern: Regex,
    render: fn(&Captures<'_>, StatusCode) -> String,
}

static HINT_RULES: Lazy<Vec<HintRule>> = Lazy::new(|| {
    vec![
        HintRule {
            name: "unknown_property",
            pattern: Regex::new(r"(?i)property named '([^']+)'").unwrap(),
            render: |caps, _| {
                let token = &caps[1];
                format!(
                    "'{token}' is not a column of this entity. Check the logical name used in \
                     $select or $filter; wire names for lookups are decorated (_name_value)."
                )
            },
        },
        HintRule {
            name: "unknown_collection_segment",
            pattern: Regex::new(r"(?i)resource not found for the segment '([^']+)'").unwrap(),
            render: |caps, _| {
                let token = &caps[1];
                format!(
                    "No entity collection named '{token}'. Collection route segments are plural; \
                     try '{}'.",
                    pluralize(token)
                )
            },
        },
        HintRule {
            name: "query_syntax_error",
            pattern: Regex::new(r"(?i)syntax error at position (\d+)").unwrap(),
            render: |caps, _| {
                let position = &caps[1];
                format!(
                    "The query expression has a syntax error at position {position}. Inspect the \
                     generated $filter/$orderby around that offset for unbalanced quotes or \
                     operators."
                )
            },
        },
        HintRule {
            name: "record_not_found",
            pattern: Regex::new(r"(?i)with id(?:entifier)?[ =:]+'?([0-9a-fA-F-]{8,})'?\s+(?:does not exist|could not be found)")
                .unwrap(),
            render: |caps, _| {
                let id = &caps[1];
                format!(
                    "No record with id {id} exists in this entity. The record may have been \
                     deleted, or the id belongs to a different entity type."
                )
            },
        },
    ]
});

/// Run every hint rule against `message`; all matching rules fire.
pub fn synthesize_hints(status: StatusCode, message: &str) -> Vec<String> {
    let mut hints: Vec<String> = HINT_RULES
        .iter()
        .filter_map(|rule| {
            rule.pattern
                .captures(message)
                .map(|caps| (rule.render)(&caps, status))
        })
        .collect();

    // A bare 404 with no recognizable message still deserves a nudge.
    if hints.is_empty() && status == StatusCode::NOT_FOUND {
        hints.push(
            "The requested resource was not found. Verify the collection name (plural) and the \
             record id."
                .to_string(),
        );
    }
    hints
}
