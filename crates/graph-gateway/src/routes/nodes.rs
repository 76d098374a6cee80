//! Read-only node type listings.
//!
//! Neither listing ever fails: an unreachable registry yields an empty map
//! and an unreadable descriptor yields an entry with empty fields.

use crate::domain::types::{NodeDetail, NodeSummary};
use crate::router::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Query string of `GET /node_types`
#[derive(Debug, Default, Deserialize)]
pub struct NodeTypesQuery {
    /// Regex searched for in each category
    pub category: Option<String>,
}

/// Category filter; a pattern that is not a valid regex matches literally
#[derive(Debug)]
pub enum CategoryFilter {
    Pattern(Regex),
    Literal(String),
}

impl CategoryFilter {
    pub fn new(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => Self::Pattern(regex),
            Err(e) => {
                debug!(pattern = pattern, error = %e, "Invalid category regex, matching literally");
                Self::Literal(pattern.to_string())
            }
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::Pattern(regex) => regex.is_match(category),
            Self::Literal(text) => category.contains(text.as_str()),
        }
    }
}

async fn registry_entries(state: &AppState) -> Vec<(String, Value)> {
    match state.registry.entries().await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Node registry unavailable, returning empty listing");
            Vec::new()
        }
    }
}

/// `GET /node_types`: `{name: {input, output, category}}`
pub async fn get_node_types(
    State(state): State<AppState>,
    Query(query): Query<NodeTypesQuery>,
) -> Json<BTreeMap<String, NodeSummary>> {
    let filter = query
        .category
        .as_deref()
        .filter(|pattern| !pattern.is_empty())
        .map(CategoryFilter::new);

    // Filter on the registry's own category so a descriptor that fails to
    // extract is still listed (with empty fields) when its category matches
    let listing = registry_entries(&state)
        .await
        .into_iter()
        .filter(|(_, raw)| match (&filter, NodeSummary::raw_category(raw)) {
            (Some(filter), Some(category)) => filter.matches(category),
            _ => true,
        })
        .map(|(name, raw)| (name, NodeSummary::extract_or_empty(&raw)))
        .collect();

    Json(listing)
}

/// `GET /all_nodes`: `{name: {description, category, inputs, outputs}}`
pub async fn get_all_nodes(State(state): State<AppState>) -> Json<BTreeMap<String, NodeDetail>> {
    let listing = registry_entries(&state)
        .await
        .into_iter()
        .map(|(name, raw)| (name, NodeDetail::extract_or_empty(&raw)))
        .collect();

    Json(listing)
}
