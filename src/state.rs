//! Shared server state: the active search engine and a cache of built engines.
//!
//! Building an engine indexes the whole catalog, so engines are kept in an
//! LRU cache keyed by catalog fingerprint. Reloading a file whose contents did
//! not change swaps the cached engine back in without re-indexing.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::geo::Geocoder;
use crate::search::SearchEngine;
use anyhow::{Context, anyhow};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Outcome of installing a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub businesses: usize,
    pub reviews: usize,
    pub fingerprint: String,
    /// Whether a previously built engine was reused.
    pub reused: bool,
}

/// State shared by every tool handler.
pub struct SearchState {
    config: Config,
    geocoder: Arc<dyn Geocoder>,

    /// Built engines by catalog fingerprint
    cache: Mutex<LruCache<u64, Arc<SearchEngine>>>,

    /// Engine serving queries right now
    current: RwLock<Option<Arc<SearchEngine>>>,

    /// Catalog file the current engine came from, if any
    catalog_path: RwLock<Option<PathBuf>>,
}

impl std::fmt::Debug for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchState")
            .field("geocoder", &self.geocoder)
            .field("cache_size", &self.cache.try_lock().map(|c| c.len()).ok())
            .field(
                "has_engine",
                &self.current.try_read().map(|c| c.is_some()).ok(),
            )
            .finish_non_exhaustive()
    }
}

impl SearchState {
    pub fn new(config: Config, geocoder: Arc<dyn Geocoder>) -> Self {
        let capacity = NonZeroUsize::new(config.engine_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            geocoder,
            cache: Mutex::new(LruCache::new(capacity)),
            current: RwLock::new(None),
            catalog_path: RwLock::new(None),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The engine serving queries, if a catalog has been installed.
    pub async fn engine(&self) -> Option<Arc<SearchEngine>> {
        self.current.read().await.clone()
    }

    /// Like [`Self::engine`], with a user-facing message when there is none.
    pub async fn require_engine(&self) -> std::result::Result<Arc<SearchEngine>, String> {
        self.engine().await.ok_or_else(|| {
            "No catalog loaded. Use reload_catalog with a path to a catalog JSON file.".to_string()
        })
    }

    pub async fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path.read().await.clone()
    }

    /// Make `catalog` the active snapshot, reusing a cached engine when possible.
    pub async fn install(&self, catalog: Catalog) -> Result<ReloadSummary> {
        let fingerprint = catalog.fingerprint();
        let businesses = catalog.businesses().len();
        let reviews = catalog.reviews().len();

        let cached = self.cache.lock().await.get(&fingerprint).cloned();
        let reused = cached.is_some();

        let engine = match cached {
            Some(engine) => {
                tracing::info!("Reusing search engine for catalog {:016x}", fingerprint);
                engine
            }
            None => {
                let geocoder = Arc::clone(&self.geocoder);
                let config = self.config.clone();
                // Indexing is CPU-bound
                let engine = tokio::task::spawn_blocking(move || {
                    SearchEngine::new(Arc::new(catalog), geocoder, config)
                })
                .await
                .context("Index build task panicked")?;
                let engine = Arc::new(engine);
                self.cache.lock().await.put(fingerprint, Arc::clone(&engine));
                engine
            }
        };

        *self.current.write().await = Some(engine);

        Ok(ReloadSummary {
            path: None,
            businesses,
            reviews,
            fingerprint: format!("{:016x}", fingerprint),
            reused,
        })
    }

    /// Load the catalog at `path` and make it active.
    pub async fn load(&self, path: &Path) -> Result<ReloadSummary> {
        let owned = path.to_path_buf();
        let catalog = tokio::task::spawn_blocking(move || Catalog::load(&owned))
            .await
            .context("Catalog load task panicked")?
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?;

        let mut summary = self.install(catalog).await?;
        *self.catalog_path.write().await = Some(path.to_path_buf());
        summary.path = Some(path.to_path_buf());
        Ok(summary)
    }

    /// Re-read the catalog file the active engine came from.
    pub async fn reload(&self) -> Result<ReloadSummary> {
        let path = self
            .catalog_path()
            .await
            .ok_or_else(|| anyhow!("No catalog path configured"))?;
        self.load(&path).await
    }
}
