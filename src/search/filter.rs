//! Structural and geographic filters.
//!
//! Filters only ever remove hits; they never reorder what they keep.

use super::query::{GeoQuery, SearchHit};
use crate::catalog::{Business, Review, Weekday};
use crate::geo::{Geocoder, haversine_km};
use chrono::NaiveTime;

/// Opening-hours constraint for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursFilter {
    pub day: Weekday,
    /// Require a non-closed schedule entry for `day`.
    pub must_be_open: bool,
    /// With `must_be_open`, also require the schedule to cover this time.
    pub at: Option<NaiveTime>,
}

impl HoursFilter {
    pub const fn open_on(day: Weekday) -> Self {
        Self {
            day,
            must_be_open: true,
            at: None,
        }
    }

    #[must_use]
    pub const fn at(mut self, at: NaiveTime) -> Self {
        self.at = Some(at);
        self
    }

    fn matches(&self, business: &Business) -> bool {
        if !self.must_be_open {
            return true;
        }
        let Some(schedule) = business.business_hours.get(&self.day) else {
            return false;
        };
        if schedule.closed {
            return false;
        }
        match self.at {
            None => true,
            Some(at) => {
                schedule.is_open_at(at)
                    || business
                        .business_hours
                        .get(&self.day.previous())
                        .is_some_and(|prev| prev.spills_over_to(at))
            }
        }
    }
}

/// Optional predicates over businesses, combined with AND.
///
/// A `None` (or empty tag list, or `false` flag) field places no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessFilters {
    pub category: Option<String>,
    pub min_rating: Option<f64>,
    /// Case-insensitive substring of the location label.
    pub location: Option<String>,
    /// Any of these must be a case-insensitive substring of any record tag.
    pub tags: Vec<String>,
    pub verified: Option<bool>,
    pub has_reviews: bool,
    pub hours: Option<HoursFilter>,
}

impl BusinessFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, business: &Business) -> bool {
        if let Some(category) = &self.category
            && business.category != *category
        {
            return false;
        }

        if let Some(min) = self.min_rating
            && business.rating_or_zero() < min
        {
            return false;
        }

        if let Some(location) = &self.location
            && !contains_ignore_case(&business.location, location)
        {
            return false;
        }

        if !tags_match(&self.tags, &business.tags) {
            return false;
        }

        if let Some(verified) = self.verified
            && business.verified != verified
        {
            return false;
        }

        if self.has_reviews && business.review_count == 0 {
            return false;
        }

        self.hours.is_none_or(|hours| hours.matches(business))
    }

    /// Keep only hits whose record passes every filter.
    pub fn apply<'a>(&self, mut hits: Vec<SearchHit<'a, Business>>) -> Vec<SearchHit<'a, Business>> {
        if !self.is_empty() {
            hits.retain(|hit| self.matches(hit.record));
        }
        hits
    }
}

/// Optional predicates over reviews, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilters {
    pub business_id: Option<String>,
    pub tags: Vec<String>,
}

impl ReviewFilters {
    pub fn matches(&self, review: &Review) -> bool {
        self.business_id
            .as_ref()
            .is_none_or(|id| review.business_id == *id)
            && tags_match(&self.tags, &review.tags)
    }

    pub fn apply<'a>(&self, mut hits: Vec<SearchHit<'a, Review>>) -> Vec<SearchHit<'a, Review>> {
        hits.retain(|hit| self.matches(hit.record));
        hits
    }
}

impl GeoQuery {
    /// Attach distances from the origin and drop hits beyond the radius.
    ///
    /// Records without stored coordinates are placed by `geocoder`.
    pub fn apply<'a>(
        &self,
        hits: Vec<SearchHit<'a, Business>>,
        geocoder: &dyn Geocoder,
    ) -> Vec<SearchHit<'a, Business>> {
        hits.into_iter()
            .filter_map(|mut hit| {
                let position = hit
                    .record
                    .coordinates
                    .unwrap_or_else(|| geocoder.locate(hit.record.geocode_query()));
                let distance = haversine_km(self.origin, position);
                hit.distance_km = Some(distance);

                self.max_distance_km
                    .is_none_or(|max| distance <= max)
                    .then_some(hit)
            })
            .collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when no tags were requested, or any requested tag occurs in any record tag.
fn tags_match(requested: &[String], record: &[String]) -> bool {
    if requested.is_empty() {
        return true;
    }
    let record: Vec<String> = record.iter().map(|t| t.to_lowercase()).collect();
    requested.iter().any(|wanted| {
        let wanted = wanted.to_lowercase();
        record.iter().any(|tag| tag.contains(&wanted))
    })
}
