//! Catalog search: fuzzy text index, filters, ranking and the facade tying them together.

// Module declarations
pub(crate) mod engine;
pub(crate) mod filter;
pub(crate) mod index;
pub(crate) mod query;
pub(crate) mod rank;
pub(crate) mod scoring;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use engine::SearchEngine;
pub use filter::{BusinessFilters, HoursFilter, ReviewFilters};
pub use index::{Field, FieldWeights, FuzzyIndex, IndexHit, MatchSpan, Searchable};
pub use query::{GeoQuery, Pagination, ReviewSearchOptions, SearchHit, SearchOptions, SearchPage};
pub use rank::{ParseSortKeyError, SortKey};
pub use tokenize::MIN_TOKEN_LENGTH;
