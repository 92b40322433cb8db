//! The search facade: text match, filter, geo-filter, rank, paginate.

use super::index::{Field, FieldWeights, FuzzyIndex, IndexHit};
use super::query::{ReviewSearchOptions, SearchHit, SearchOptions, SearchPage};
use super::rank::sort_by_relevance;
use super::tokenize::{MIN_TOKEN_LENGTH, is_blank};
use crate::catalog::{Business, Catalog, Review};
use crate::config::Config;
use crate::geo::Geocoder;
use ahash::AHashSet;
use std::fmt;
use std::sync::Arc;

/// Number of top business matches mined for suggestions.
const SUGGESTION_POOL: usize = 10;

/// Indexed, query-ready view over one catalog snapshot.
///
/// Building indexes every record once; each search afterwards is a pure
/// function of `&self` and the options, so one engine can serve concurrent
/// queries.
pub struct SearchEngine {
    catalog: Arc<Catalog>,
    businesses: FuzzyIndex,
    reviews: FuzzyIndex,
    geocoder: Arc<dyn Geocoder>,
    config: Config,
}

impl fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("fingerprint", &format_args!("{:016x}", self.catalog.fingerprint()))
            .field("businesses", &self.businesses.len())
            .field("reviews", &self.reviews.len())
            .field("geocoder", &self.geocoder)
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    pub fn new(catalog: Arc<Catalog>, geocoder: Arc<dyn Geocoder>, config: Config) -> Self {
        let start = std::time::Instant::now();

        let businesses = FuzzyIndex::build(
            catalog.businesses(),
            &FieldWeights::from(&config.business_weights),
            config.threshold,
        );
        let reviews = FuzzyIndex::build(
            catalog.reviews(),
            &FieldWeights::from(&config.review_weights),
            config.threshold,
        );

        tracing::info!(
            "Built search engine for catalog {:016x}: {} businesses, {} reviews in {:?}",
            catalog.fingerprint(),
            businesses.len(),
            reviews.len(),
            start.elapsed()
        );

        Self {
            catalog,
            businesses,
            reviews,
            geocoder,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Search businesses.
    ///
    /// Steps run in a fixed order and only the ranking step reorders:
    /// text match (or the whole corpus with score 0), structural filters,
    /// distance filter, ranking, then the `[offset, offset + limit)` window.
    pub fn search(&self, options: &SearchOptions) -> SearchPage<'_, Business> {
        let records = self.catalog.businesses();

        let candidates = to_hits(records, self.businesses.search(options.query()));
        let matched = candidates.len();

        let mut hits = options.filters.apply(candidates);
        let filtered = hits.len();

        if let Some(near) = &options.near {
            hits = near.apply(hits, self.geocoder.as_ref());
        }

        options.sort.sort(&mut hits);

        let (offset, limit) = options
            .page
            .resolve(self.config.default_limit);

        tracing::debug!(
            query = options.query(),
            sort = %options.sort,
            matched,
            filtered,
            ranked = hits.len(),
            offset,
            limit,
            "business search"
        );

        SearchPage::slice(hits, offset, limit)
    }

    /// Search reviews by text and review filters, ranked by relevance.
    pub fn search_reviews(&self, options: &ReviewSearchOptions) -> SearchPage<'_, Review> {
        let records = self.catalog.reviews();

        let candidates = to_hits(records, self.reviews.search(options.query()));
        let mut hits = options.filters.apply(candidates);
        sort_by_relevance(&mut hits);

        let (offset, limit) = options
            .page
            .resolve(self.config.default_limit);

        tracing::debug!(
            query = options.query(),
            ranked = hits.len(),
            offset,
            limit,
            "review search"
        );

        SearchPage::slice(hits, offset, limit)
    }

    /// Up to `limit` distinct names, categories and tags that matched `query`.
    ///
    /// Candidates come from the matched spans of the best business hits, so
    /// every suggestion itself fuzzy-matches the query. Queries shorter than
    /// two characters yield nothing.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        if is_blank(query) || query.trim().chars().count() < MIN_TOKEN_LENGTH || limit == 0 {
            return Vec::new();
        }

        let records = self.catalog.businesses();
        let mut seen = AHashSet::new();
        let mut suggestions = Vec::new();

        for hit in self.businesses.search(query).into_iter().take(SUGGESTION_POOL) {
            let record = &records[hit.doc];
            for span in &hit.matches {
                let candidate = match span.field {
                    Field::Name => Some(&record.name),
                    Field::Category => Some(&record.category),
                    Field::Tags => record.tags.get(span.value_index),
                    _ => None,
                };
                if let Some(candidate) = candidate
                    && seen.insert(candidate.as_str())
                {
                    suggestions.push(candidate.clone());
                    if suggestions.len() == limit {
                        return suggestions;
                    }
                }
            }
        }

        suggestions
    }

    /// The configured popular keywords; fixed, not derived from traffic.
    pub fn popular_keywords(&self) -> &[String] {
        &self.config.popular_keywords
    }
}

fn to_hits<T>(records: &[T], index_hits: Vec<IndexHit>) -> Vec<SearchHit<'_, T>> {
    index_hits
        .into_iter()
        .map(|hit| SearchHit::new(&records[hit.doc], hit.score, hit.matches))
        .collect()
}
