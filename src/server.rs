//! MCP server exposing catalog search as tools.

use crate::state::SearchState;
use crate::tools::reload::{ReloadCatalogRequest, handle_reload_catalog};
use crate::tools::search::{
    SearchBusinessesRequest, SearchReviewsRequest, handle_search_businesses, handle_search_reviews,
};
use crate::tools::suggest::{SuggestRequest, handle_popular_keywords, handle_suggest};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for local business search
#[derive(Clone)]
pub struct SearchServer {
    /// Shared search state (active engine, engine cache, config)
    state: Arc<SearchState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl SearchServer {
    pub fn new(state: Arc<SearchState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<SearchState> {
        &self.state
    }

    #[tool(
        description = "Search local businesses with typo-tolerant matching over names, descriptions, categories, locations and tags. Supports category, rating, location, tag, verification, review and opening-hours filters, distance from a latitude/longitude with an optional radius, sorting by relevance, rating, distance, newest or reviews, and offset/limit pagination.",
        input_schema = inline_schema_for_type::<SearchBusinessesRequest>()
    )]
    async fn search_businesses(
        &self,
        Parameters(request): Parameters<SearchBusinessesRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_businesses(&self.state, request).await
    }

    #[tool(
        description = "Search reviews by title, content and tags with typo-tolerant matching. Optionally restrict to one business or to reviews with given tags.",
        input_schema = inline_schema_for_type::<SearchReviewsRequest>()
    )]
    async fn search_reviews(
        &self,
        Parameters(request): Parameters<SearchReviewsRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_reviews(&self.state, request).await
    }

    #[tool(
        description = "Autocomplete: distinct business names, categories and tags that fuzzy-match a partial query of at least two characters.",
        input_schema = inline_schema_for_type::<SuggestRequest>()
    )]
    async fn suggest(
        &self,
        Parameters(request): Parameters<SuggestRequest>,
    ) -> std::result::Result<String, String> {
        handle_suggest(&self.state, request).await
    }

    #[tool(description = "List the curated popular search keywords.")]
    async fn popular_keywords(&self) -> std::result::Result<String, String> {
        handle_popular_keywords(&self.state)
    }

    #[tool(
        description = "Load a catalog JSON file (businesses and reviews) and make it the searched snapshot. Without a path, re-reads the current catalog file. Unchanged catalogs reuse their existing index.",
        input_schema = inline_schema_for_type::<ReloadCatalogRequest>()
    )]
    async fn reload_catalog(
        &self,
        Parameters(request): Parameters<ReloadCatalogRequest>,
    ) -> std::result::Result<String, String> {
        handle_reload_catalog(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "omise-search: fuzzy search over a catalog of Japanese local businesses and their reviews. \
                 A catalog is loaded at startup from OMISE_CATALOG when set; otherwise use reload_catalog with a path. \
                 Use search_businesses for filtered, ranked, paginated results and suggest for autocomplete. \
                 Pages hold at most max_limit hits; continue from nextOffset.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true`
/// so enums such as the weekday appear inline instead of as `$ref` patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
