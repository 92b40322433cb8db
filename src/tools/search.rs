//! Business and review search handlers.
//!
//! Requests arrive loosely typed: `offset` and `limit` may be numbers or
//! strings, and anything unusable falls back to the defaults. Sort keys are
//! parsed the same way.

use crate::catalog::Weekday;
use crate::geo::Coordinates;
use crate::search::{
    BusinessFilters, GeoQuery, HoursFilter, Pagination, ReviewFilters, ReviewSearchOptions,
    SearchOptions, SortKey,
};
use crate::state::SearchState;
use chrono::NaiveTime;
use rmcp::schemars;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchBusinessesRequest {
    /// Free-text query. Omit or leave empty to match every business.
    #[serde(default)]
    pub query: Option<String>,
    /// Exact category, e.g. "ラーメン"
    #[serde(default)]
    pub category: Option<String>,
    /// Minimum average rating (0-5)
    #[serde(default)]
    pub min_rating: Option<f64>,
    /// Substring of the location label, case-insensitive
    #[serde(default)]
    pub location: Option<String>,
    /// Match businesses having any of these tags (substring, case-insensitive)
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    /// Only businesses with at least one review
    #[serde(default)]
    pub has_reviews: bool,
    /// Only businesses open on this weekday
    #[serde(default)]
    pub open_on: Option<Weekday>,
    /// Time of day (HH:MM) the business must be open at; requires open_on
    #[serde(default)]
    pub open_at: Option<String>,
    /// Requester latitude; distances are reported when both coordinates are given
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Drop businesses farther than this many kilometers from the requester
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    /// One of relevance (default), rating, distance, newest, reviews
    #[serde(default)]
    pub sort: Option<String>,
    /// Number of results to skip (default: 0)
    #[serde(default)]
    pub offset: Option<Value>,
    /// Page size (default: 20, at most 100); continue from the returned nextOffset
    #[serde(default)]
    pub limit: Option<Value>,
}

impl SearchBusinessesRequest {
    /// Translate the request into typed search options.
    ///
    /// Only contradictory or unparseable structural input is rejected;
    /// pagination and sort never fail.
    pub fn into_options(self) -> Result<SearchOptions, String> {
        let hours = match (self.open_on, self.open_at.as_deref()) {
            (None, None) => None,
            (None, Some(_)) => return Err("open_at requires open_on".to_string()),
            (Some(day), None) => Some(HoursFilter::open_on(day)),
            (Some(day), Some(raw)) => {
                let at = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .map_err(|e| format!("Invalid open_at '{}': expected HH:MM ({})", raw, e))?;
                Some(HoursFilter::open_on(day).at(at))
            }
        };

        let near = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoQuery {
                origin: Coordinates::new(lat, lon),
                max_distance_km: self.max_distance_km,
            }),
            (None, None) if self.max_distance_km.is_some() => {
                return Err("max_distance_km requires latitude and longitude".to_string());
            }
            (None, None) => None,
            _ => return Err("latitude and longitude must be given together".to_string()),
        };

        Ok(SearchOptions {
            text: self.query,
            filters: BusinessFilters {
                category: self.category,
                min_rating: self.min_rating,
                location: self.location,
                tags: self.tags,
                verified: self.verified,
                has_reviews: self.has_reviews,
                hours,
            },
            near,
            sort: SortKey::parse_lenient(self.sort.as_deref()),
            page: lenient_page(self.offset.as_ref(), self.limit.as_ref()),
        })
    }
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchReviewsRequest {
    /// Free-text query over review titles, bodies and tags
    #[serde(default)]
    pub query: Option<String>,
    /// Only reviews of this business
    #[serde(default)]
    pub business_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub offset: Option<Value>,
    #[serde(default)]
    pub limit: Option<Value>,
}

impl SearchReviewsRequest {
    pub fn into_options(self) -> ReviewSearchOptions {
        ReviewSearchOptions {
            text: self.query,
            filters: ReviewFilters {
                business_id: self.business_id,
                tags: self.tags,
            },
            page: lenient_page(self.offset.as_ref(), self.limit.as_ref()),
        }
    }
}

fn lenient_page(offset: Option<&Value>, limit: Option<&Value>) -> Pagination {
    Pagination::from_signed(lenient_int(offset), lenient_int(limit))
}

/// Integer from a JSON number or numeric string; anything else is `None`.
fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Execute a business search and render the page as JSON.
pub async fn handle_search_businesses(
    state: &SearchState,
    request: SearchBusinessesRequest,
) -> Result<String, String> {
    let engine = state.require_engine().await?;
    let mut options = request.into_options()?;
    options.page = options.page.capped(state.config().max_limit);

    let page = engine.search(&options);
    serde_json::to_string_pretty(&page).map_err(|e| format!("Failed to serialize results: {}", e))
}

/// Execute a review search and render the page as JSON.
pub async fn handle_search_reviews(
    state: &SearchState,
    request: SearchReviewsRequest,
) -> Result<String, String> {
    let engine = state.require_engine().await?;
    let mut options = request.into_options();
    options.page = options.page.capped(state.config().max_limit);

    let page = engine.search_reviews(&options);
    serde_json::to_string_pretty(&page).map_err(|e| format!("Failed to serialize results: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use serde_json::json;

    fn request(value: Value) -> SearchBusinessesRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_request_is_default_options() {
        let options = request(json!({})).into_options().unwrap();
        check!(options == SearchOptions::default());
    }

    #[rstest]
    #[case(json!({"offset": 10, "limit": 5}), (10, 5))]
    #[case(json!({"offset": "10", "limit": "5"}), (10, 5))]
    #[case(json!({"offset": -1, "limit": -20}), (0, 20))]
    #[case(json!({"offset": "x", "limit": true}), (0, 20))]
    #[case(json!({"offset": 1.5, "limit": null}), (0, 20))]
    fn test_lenient_pagination(#[case] value: Value, #[case] expected: (usize, usize)) {
        let options = request(value).into_options().unwrap();
        check!(options.page.resolve(20) == expected);
    }

    #[rstest]
    #[case(json!({"sort": "rating"}), SortKey::Rating)]
    #[case(json!({"sort": "Newest"}), SortKey::Newest)]
    #[case(json!({"sort": "cheapest"}), SortKey::Relevance)]
    fn test_lenient_sort(#[case] value: Value, #[case] expected: SortKey) {
        check!(request(value).into_options().unwrap().sort == expected);
    }

    #[test]
    fn test_full_request() {
        let options = request(json!({
            "query": "焼き鳥",
            "category": "居酒屋",
            "min_rating": 3.5,
            "tags": ["深夜"],
            "verified": true,
            "has_reviews": true,
            "open_on": "friday",
            "open_at": "21:30",
            "latitude": 35.69,
            "longitude": 139.70,
            "max_distance_km": 2.0,
            "sort": "distance"
        }))
        .into_options()
        .unwrap();

        check!(options.query() == "焼き鳥");
        check!(options.filters.category.as_deref() == Some("居酒屋"));
        check!(options.filters.min_rating == Some(3.5));
        let_assert!(Some(hours) = options.filters.hours);
        check!(hours.day == Weekday::Friday);
        check!(hours.at == NaiveTime::from_hms_opt(21, 30, 0));
        let_assert!(Some(near) = options.near);
        check!(near.max_distance_km == Some(2.0));
        check!(options.sort == SortKey::Distance);
    }

    #[rstest]
    #[case(json!({"open_at": "10:00"}))]
    #[case(json!({"open_on": "monday", "open_at": "late"}))]
    #[case(json!({"latitude": 35.0}))]
    #[case(json!({"max_distance_km": 3.0}))]
    fn test_rejected_requests(#[case] value: Value) {
        check!(request(value).into_options().is_err());
    }

    #[test]
    fn test_review_request() {
        let request: SearchReviewsRequest =
            serde_json::from_value(json!({"business_id": "b1", "limit": "3"})).unwrap();
        let options = request.into_options();
        check!(options.filters.business_id.as_deref() == Some("b1"));
        check!(options.page.resolve(20) == (0, 3));
    }
}
