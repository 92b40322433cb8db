//! Result ordering strategies.

use super::query::SearchHit;
use crate::catalog::Business;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How to order business hits. Every strategy is a stable sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Ascending fuzzy score, ties in corpus order.
    #[default]
    Relevance,
    /// Descending rating; unrated counts as 0.
    Rating,
    /// Ascending distance; hits without a distance count as 0.
    Distance,
    /// Descending creation time; undated counts as the Unix epoch.
    Newest,
    /// Descending review count.
    Reviews,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Relevance,
        Self::Rating,
        Self::Distance,
        Self::Newest,
        Self::Reviews,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Rating => "rating",
            Self::Distance => "distance",
            Self::Newest => "newest",
            Self::Reviews => "reviews",
        }
    }

    /// Parse a sort key, falling back to [`SortKey::Relevance`] for anything unknown.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    /// Sort `hits` in place.
    pub fn sort(self, hits: &mut [SearchHit<'_, Business>]) {
        match self {
            Self::Relevance => sort_by_relevance(hits),
            Self::Rating => hits.sort_by(|a, b| {
                descending_f64(a.record.rating_or_zero(), b.record.rating_or_zero())
            }),
            Self::Distance => hits.sort_by(|a, b| {
                a.distance_km
                    .unwrap_or(0.0)
                    .total_cmp(&b.distance_km.unwrap_or(0.0))
            }),
            Self::Newest => hits.sort_by_key(|hit| {
                std::cmp::Reverse(hit.record.created_at.map_or(0, |t| t.timestamp_millis()))
            }),
            Self::Reviews => hits.sort_by_key(|hit| std::cmp::Reverse(hit.record.review_count)),
        }
    }
}

/// Ascending score; stable, so equal scores keep their input order.
pub fn sort_by_relevance<T>(hits: &mut [SearchHit<'_, T>]) {
    hits.sort_by(|a, b| a.score.total_cmp(&b.score));
}

fn descending_f64(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}' (expected relevance, rating, distance, newest or reviews)")]
pub struct ParseSortKeyError(String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSortKeyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn ids(hits: &[SearchHit<'_, Business>]) -> Vec<String> {
        hits.iter().map(|h| h.record.id.clone()).collect()
    }

    fn shops() -> Vec<Business> {
        let mut a = Business::new("a", "a");
        a.rating = Some(3.0);
        a.review_count = 5;
        a.created_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let mut b = Business::new("b", "b");
        b.rating = Some(4.5);
        b.review_count = 1;

        let mut c = Business::new("c", "c");
        c.rating = Some(4.5);
        c.review_count = 9;
        c.created_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());

        let d = Business::new("d", "d");

        vec![a, b, c, d]
    }

    fn hits(records: &[Business]) -> Vec<SearchHit<'_, Business>> {
        records
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let mut hit = SearchHit::new(b, [0.2, 0.0, 0.2, 0.1][i], vec![]);
                hit.distance_km = [Some(3.0), Some(1.0), None, Some(0.5)][i];
                hit
            })
            .collect()
    }

    #[rstest]
    #[case(SortKey::Relevance, &["b", "d", "a", "c"])]
    #[case(SortKey::Rating, &["b", "c", "a", "d"])]
    #[case(SortKey::Distance, &["c", "d", "b", "a"])]
    #[case(SortKey::Newest, &["c", "a", "b", "d"])]
    #[case(SortKey::Reviews, &["c", "a", "b", "d"])]
    fn test_sort_orders(#[case] key: SortKey, #[case] expected: &[&str]) {
        let records = shops();
        let mut hits = hits(&records);
        key.sort(&mut hits);
        check!(ids(&hits) == expected);
    }

    #[rstest]
    #[case(SortKey::Rating)]
    #[case(SortKey::Newest)]
    #[case(SortKey::Relevance)]
    fn test_sort_is_idempotent(#[case] key: SortKey) {
        let records = shops();
        let mut once = hits(&records);
        key.sort(&mut once);
        let mut twice = once.clone();
        key.sort(&mut twice);
        check!(ids(&once) == ids(&twice));
    }

    #[rstest]
    #[case("relevance", SortKey::Relevance)]
    #[case("Rating", SortKey::Rating)]
    #[case(" distance ", SortKey::Distance)]
    #[case("NEWEST", SortKey::Newest)]
    #[case("reviews", SortKey::Reviews)]
    fn test_parse(#[case] raw: &str, #[case] expected: SortKey) {
        check!(raw.parse::<SortKey>() == Ok(expected));
        check!(expected.as_str().parse::<SortKey>() == Ok(expected));
    }

    #[test]
    fn test_parse_unknown() {
        let_assert!(Err(err) = "popularity".parse::<SortKey>());
        check!(err.to_string().contains("popularity"));
        check!(SortKey::parse_lenient(Some("popularity")) == SortKey::Relevance);
        check!(SortKey::parse_lenient(None) == SortKey::Relevance);
        check!(SortKey::parse_lenient(Some("rating")) == SortKey::Rating);
    }
}
