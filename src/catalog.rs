//! Catalog records: businesses, their reviews and opening hours.
//!
//! A [`Catalog`] is an immutable snapshot. The search pipeline only ever borrows it.

use crate::error::CatalogError;
use crate::geo::Coordinates;
use ahash::AHashSet;
use chrono::{DateTime, NaiveTime, Utc};
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

/// Day of the week, keyed in lowercase English as the catalog JSON writes it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// The day before this one, used for schedules that run past midnight.
    pub const fn previous(self) -> Self {
        match self {
            Self::Monday => Self::Sunday,
            Self::Tuesday => Self::Monday,
            Self::Wednesday => Self::Tuesday,
            Self::Thursday => Self::Wednesday,
            Self::Friday => Self::Thursday,
            Self::Saturday => Self::Friday,
            Self::Sunday => Self::Saturday,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Opening hours for a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default, with = "clock")]
    pub open: Option<NaiveTime>,
    #[serde(default, with = "clock")]
    pub close: Option<NaiveTime>,
    #[serde(default)]
    pub closed: bool,
}

impl DaySchedule {
    pub const fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            open: Some(open),
            close: Some(close),
            closed: false,
        }
    }

    pub const fn closed() -> Self {
        Self {
            open: None,
            close: None,
            closed: true,
        }
    }

    /// Whether the schedule covers `at` on its own day.
    ///
    /// A schedule without both times is treated as open all day. When `close`
    /// is not after `open` the schedule wraps past midnight, and only the part
    /// from `open` until midnight belongs to this day.
    pub fn is_open_at(&self, at: NaiveTime) -> bool {
        if self.closed {
            return false;
        }
        match (self.open, self.close) {
            (Some(open), Some(close)) if open < close => open <= at && at < close,
            (Some(open), Some(_)) => open <= at,
            _ => true,
        }
    }

    /// Whether this schedule wraps past midnight and still covers `at` the next morning.
    pub fn spills_over_to(&self, at: NaiveTime) -> bool {
        match (self.closed, self.open, self.close) {
            (false, Some(open), Some(close)) if close <= open => at < close,
            _ => false,
        }
    }
}

/// A listed business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub address: String,
    /// Average rating on a 0-5 scale with one decimal.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub business_hours: BTreeMap<Weekday, DaySchedule>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Known coordinates. When absent the geocoder places the address.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Business {
    /// Minimal record, mostly for building fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            description: String::new(),
            location: String::new(),
            address: String::new(),
            rating: None,
            review_count: 0,
            tags: Vec::new(),
            verified: false,
            business_hours: BTreeMap::new(),
            created_at: None,
            coordinates: None,
        }
    }

    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// The string handed to the geocoder: the street address, or the
    /// coarser location label when no address was recorded.
    pub fn geocode_query(&self) -> &str {
        if self.address.trim().is_empty() {
            &self.location
        } else {
            &self.address
        }
    }
}

/// A user review of a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub business_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    businesses: Vec<Business>,
    #[serde(default)]
    reviews: Vec<Review>,
}

/// Immutable snapshot of everything searchable.
#[derive(Debug, Clone)]
pub struct Catalog {
    businesses: Vec<Business>,
    reviews: Vec<Review>,
    fingerprint: u64,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(businesses: Vec<Business>, reviews: Vec<Review>) -> Result<Self, CatalogError> {
        check_unique("business", businesses.iter().map(|b| b.id.as_str()))?;
        check_unique("review", reviews.iter().map(|r| r.id.as_str()))?;

        let fingerprint = fingerprint(&businesses, &reviews);
        Ok(Self {
            businesses,
            reviews,
            fingerprint,
        })
    }

    /// Parse a `{ "businesses": [...], "reviews": [...] }` document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::new(document.businesses, document.reviews)
    }

    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;

        tracing::info!(
            "Loaded catalog from {} ({} businesses, {} reviews, fingerprint {:016x})",
            path.display(),
            catalog.businesses.len(),
            catalog.reviews.len(),
            catalog.fingerprint
        );
        Ok(catalog)
    }

    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn business(&self, id: &str) -> Option<&Business> {
        self.businesses.iter().find(|b| b.id == id)
    }

    /// Content hash; equal catalogs have equal fingerprints.
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = AHashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

/// Length-prefixed xxh3 over every searchable field.
fn fingerprint(businesses: &[Business], reviews: &[Review]) -> u64 {
    fn write_str(hasher: &mut Xxh3, s: &str) {
        hasher.update(&(s.len() as u64).to_le_bytes());
        hasher.update(s.as_bytes());
    }

    fn write_list(hasher: &mut Xxh3, items: &[String]) {
        hasher.update(&(items.len() as u64).to_le_bytes());
        for item in items {
            write_str(hasher, item);
        }
    }

    let mut hasher = Xxh3::new();

    hasher.update(&(businesses.len() as u64).to_le_bytes());
    for b in businesses {
        for field in [
            &b.id,
            &b.name,
            &b.category,
            &b.description,
            &b.location,
            &b.address,
        ] {
            write_str(&mut hasher, field);
        }
        hasher.update(&b.rating.map_or(u64::MAX, f64::to_bits).to_le_bytes());
        hasher.update(&b.review_count.to_le_bytes());
        write_list(&mut hasher, &b.tags);
        hasher.update(&[u8::from(b.verified)]);
        hasher.update(&(b.business_hours.len() as u64).to_le_bytes());
        for (day, schedule) in &b.business_hours {
            hasher.update(&[*day as u8, u8::from(schedule.closed)]);
            for time in [schedule.open, schedule.close] {
                write_str(&mut hasher, &time.map(|t| t.to_string()).unwrap_or_default());
            }
        }
        hasher.update(
            &b.created_at
                .map_or(i64::MIN, |t| t.timestamp_millis())
                .to_le_bytes(),
        );
        match b.coordinates {
            Some(c) => {
                hasher.update(&c.latitude.to_bits().to_le_bytes());
                hasher.update(&c.longitude.to_bits().to_le_bytes());
            }
            None => hasher.update(&[0xff]),
        }
    }

    hasher.update(&(reviews.len() as u64).to_le_bytes());
    for r in reviews {
        for field in [&r.id, &r.business_id, &r.title, &r.content] {
            write_str(&mut hasher, field);
        }
        write_list(&mut hasher, &r.tags);
    }

    hasher.digest()
}

/// `HH:MM` opening times; seconds are accepted on input.
mod clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
