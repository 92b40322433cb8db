pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;

pub use catalog::{Business, Catalog, DaySchedule, Review, Weekday};
pub use config::Config;
pub use error::{CatalogError, ConfigError, Result};
pub use geo::{Coordinates, FixedGeocoder, Geocoder, WardGeocoder, haversine_km};
pub use search::{SearchEngine, SearchOptions, SearchPage, SortKey};
pub use server::SearchServer;
pub use state::{ReloadSummary, SearchState};
