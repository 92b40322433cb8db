use crate::state::SearchState;
use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestRequest {
    /// Partial query typed so far (at least 2 characters)
    pub query: String,
    /// Maximum suggestions (default: 5)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SuggestResponse<'a> {
    query: &'a str,
    suggestions: Vec<String>,
}

pub async fn handle_suggest(state: &SearchState, request: SuggestRequest) -> Result<String, String> {
    let engine = state.require_engine().await?;
    let limit = request.limit.unwrap_or(state.config().suggestion_limit);

    let response = SuggestResponse {
        query: &request.query,
        suggestions: engine.suggest(&request.query, limit),
    };
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to serialize suggestions: {}", e))
}

/// Popular keywords come from configuration and need no catalog.
pub fn handle_popular_keywords(state: &SearchState) -> Result<String, String> {
    serde_json::to_string_pretty(&state.config().popular_keywords)
        .map_err(|e| format!("Failed to serialize keywords: {}", e))
}
