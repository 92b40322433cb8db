//! Query options, pagination and result types.

use super::filter::{BusinessFilters, ReviewFilters};
use super::index::MatchSpan;
use super::rank::SortKey;
use crate::geo::Coordinates;
use serde::Serialize;

/// Requester location and an optional radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQuery {
    pub origin: Coordinates,
    pub max_distance_km: Option<f64>,
}

impl GeoQuery {
    pub const fn new(origin: Coordinates) -> Self {
        Self {
            origin,
            max_distance_km: None,
        }
    }

    #[must_use]
    pub const fn within_km(mut self, max_distance_km: f64) -> Self {
        self.max_distance_km = Some(max_distance_km);
        self
    }
}

/// Offset/limit window over a ranked result list.
///
/// `None` means "use the default". Raw inputs are parsed leniently: negative
/// numbers, a zero limit and anything non-numeric all fall back to defaults.
/// Any positive limit is honoured as given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Pagination {
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// Build from signed values as they arrive from loosely typed callers.
    pub fn from_signed(offset: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            offset: offset.and_then(|o| usize::try_from(o).ok()),
            limit: limit
                .and_then(|l| usize::try_from(l).ok())
                .filter(|l| *l > 0),
        }
    }

    /// Build from raw strings such as query-string parameters.
    pub fn from_raw(offset: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>| raw.and_then(|s| s.trim().parse::<i64>().ok());
        Self::from_signed(parse(offset), parse(limit))
    }

    /// Concrete `(offset, limit)` given the configured default page size.
    pub fn resolve(self, default_limit: usize) -> (usize, usize) {
        (self.offset.unwrap_or(0), self.limit.unwrap_or(default_limit))
    }

    /// Clamp an explicit limit to `max_limit`. The offset is left alone, so
    /// callers walking pages must advance by the returned page's size.
    #[must_use]
    pub fn capped(self, max_limit: usize) -> Self {
        Self {
            offset: self.offset,
            limit: self.limit.map(|l| l.min(max_limit)),
        }
    }
}

/// Everything a business search needs. Constructed per call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub text: Option<String>,
    pub filters: BusinessFilters,
    pub near: Option<GeoQuery>,
    pub sort: SortKey,
    pub page: Pagination,
}

impl SearchOptions {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            text: Some(query.into()),
            ..Self::default()
        }
    }

    /// The query text, empty when absent.
    pub fn query(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Options for searching reviews; always ranked by relevance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSearchOptions {
    pub text: Option<String>,
    pub filters: ReviewFilters,
    pub page: Pagination,
}

impl ReviewSearchOptions {
    pub fn query(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// A record with its relevance score, matched spans and distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit<'a, T> {
    pub record: &'a T,
    /// Lower is better; 0 is exact (or no text query).
    pub score: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<MatchSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl<'a, T> SearchHit<'a, T> {
    pub const fn new(record: &'a T, score: f64, matches: Vec<MatchSpan>) -> Self {
        Self {
            record,
            score,
            matches,
            distance_km: None,
        }
    }
}

/// One page of ranked hits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<'a, T> {
    pub hits: Vec<SearchHit<'a, T>>,
    /// Number of ranked hits before slicing.
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    /// Offset of the following page, absent on the last one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<usize>,
}

impl<'a, T> SearchPage<'a, T> {
    /// Slice `[offset, offset + limit)` out of a ranked list.
    pub fn slice(ranked: Vec<SearchHit<'a, T>>, offset: usize, limit: usize) -> Self {
        let total = ranked.len();
        let hits: Vec<_> = ranked.into_iter().skip(offset).take(limit).collect();
        let end = offset.saturating_add(hits.len());
        let next_offset = (!hits.is_empty() && end < total).then_some(end);
        Self {
            hits,
            total,
            offset,
            limit,
            next_offset,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.hits.iter().map(|hit| hit.record)
    }

    /// Whether another page follows this one.
    pub const fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }
}
