//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `catalog`: the sample catalog parsed in memory
//! - `engine`: a [`SearchEngine`] over the sample catalog with the ward geocoder
//! - `catalog_file`: the sample catalog written to a temp directory, for tool
//!   handler tests that go through [`SearchState`] and `reload_catalog`

use omise_search::{Catalog, Config, SearchEngine, SearchState, WardGeocoder};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Five Tokyo/Osaka businesses and four reviews.
///
/// - `1` 銀座すし処 まさる: highest rating, stored coordinates, closed Sunday
/// - `2` 麺屋 新宿: late-night ramen open across midnight on Fri/Sat, geocoded by ward
/// - `3` 渋谷コーヒースタンド: unverified cafe with an English `coffee` tag
/// - `4` 大阪たこ焼き本舗: the only business outside Tokyo
/// - `5` 浅草天ぷら 大黒: unrated, no reviews, undated
pub const SAMPLE_CATALOG: &str = r#"{
  "businesses": [
    {
      "id": "1",
      "name": "銀座すし処 まさる",
      "category": "寿司",
      "description": "江戸前寿司の名店。旬のネタを握ります",
      "location": "銀座",
      "address": "東京都中央区銀座5-1",
      "rating": 4.6,
      "reviewCount": 120,
      "tags": ["寿司", "カウンター", "高級"],
      "verified": true,
      "businessHours": {
        "monday": { "open": "11:30", "close": "22:00" },
        "tuesday": { "open": "11:30", "close": "22:00" },
        "wednesday": { "open": "11:30", "close": "22:00" },
        "thursday": { "open": "11:30", "close": "22:00" },
        "friday": { "open": "11:30", "close": "22:00" },
        "saturday": { "open": "11:30", "close": "22:00" },
        "sunday": { "closed": true }
      },
      "createdAt": "2023-04-01T00:00:00Z",
      "coordinates": { "lat": 35.6717, "lng": 139.7650 }
    },
    {
      "id": "2",
      "name": "麺屋 新宿",
      "category": "ラーメン",
      "description": "濃厚豚骨スープの人気店",
      "location": "新宿",
      "address": "東京都新宿区西新宿1-1",
      "rating": 4.1,
      "reviewCount": 80,
      "tags": ["ラーメン", "深夜営業"],
      "verified": true,
      "businessHours": {
        "friday": { "open": "18:00", "close": "03:00" },
        "saturday": { "open": "18:00", "close": "03:00" }
      },
      "createdAt": "2024-02-10T09:00:00Z"
    },
    {
      "id": "3",
      "name": "渋谷コーヒースタンド",
      "category": "カフェ",
      "description": "自家焙煎のコーヒーとケーキ",
      "location": "渋谷",
      "address": "東京都渋谷区道玄坂2-1",
      "rating": 3.8,
      "reviewCount": 15,
      "tags": ["カフェ", "Wi-Fi", "coffee"],
      "verified": false,
      "createdAt": "2025-01-15T12:00:00Z"
    },
    {
      "id": "4",
      "name": "大阪たこ焼き本舗",
      "category": "たこ焼き",
      "description": "外はカリッと中はとろり",
      "location": "大阪",
      "address": "大阪府大阪市中央区難波1-1",
      "rating": 4.3,
      "reviewCount": 45,
      "tags": ["たこ焼き", "テイクアウト"],
      "verified": true,
      "createdAt": "2022-08-01T00:00:00Z",
      "coordinates": { "latitude": 34.6687, "longitude": 135.5013 }
    },
    {
      "id": "5",
      "name": "浅草天ぷら 大黒",
      "category": "天ぷら",
      "location": "浅草",
      "address": "東京都台東区浅草1-2",
      "tags": ["天ぷら"]
    }
  ],
  "reviews": [
    {
      "id": "r1",
      "businessId": "1",
      "title": "最高の寿司体験",
      "content": "大トロがとろけるようでした",
      "tags": ["寿司", "記念日"]
    },
    {
      "id": "r2",
      "businessId": "1",
      "title": "カウンターが楽しい",
      "content": "大将との会話も楽しめます",
      "tags": ["カウンター"]
    },
    {
      "id": "r3",
      "businessId": "2",
      "title": "深夜のラーメン",
      "content": "濃厚な豚骨スープ",
      "tags": ["ラーメン", "深夜"]
    },
    {
      "id": "r4",
      "businessId": "3",
      "title": "作業に最適",
      "content": "Wi-Fiが速くてコーヒーも美味しい",
      "tags": ["カフェ"]
    }
  ]
}"#;

#[fixture]
pub fn catalog() -> Catalog {
    omise_search::tracing::init();
    Catalog::from_json(SAMPLE_CATALOG).expect("sample catalog should parse")
}

#[fixture]
pub fn engine(catalog: Catalog) -> SearchEngine {
    SearchEngine::new(
        Arc::new(catalog),
        Arc::new(WardGeocoder::default()),
        Config::default(),
    )
}

/// The sample catalog on disk in a temp directory that is removed on drop.
#[allow(dead_code)] // Used by some integration test crates only
pub struct CatalogFile {
    _temp: TempDir,
    path: PathBuf,
}

#[allow(dead_code)] // Used by some integration test crates only
impl CatalogFile {
    pub fn new(contents: &str) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("catalog.json");
        std::fs::write(&path, contents)
            .unwrap_or_else(|e| panic!("Failed to write '{}': {}", path.display(), e));
        Self { _temp: temp, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file contents in place.
    pub fn rewrite(&self, contents: &str) {
        std::fs::write(&self.path, contents)
            .unwrap_or_else(|e| panic!("Failed to rewrite '{}': {}", self.path.display(), e));
    }

    /// A fresh state with this catalog loaded.
    pub async fn load(&self) -> Arc<SearchState> {
        let state = empty_state();
        state
            .load(&self.path)
            .await
            .unwrap_or_else(|e| panic!("Failed to load '{}': {:#}", self.path.display(), e));
        state
    }
}

#[fixture]
pub fn catalog_file() -> CatalogFile {
    omise_search::tracing::init();
    CatalogFile::new(SAMPLE_CATALOG)
}

/// A state with no catalog installed.
#[allow(dead_code)] // Used by some integration test crates only
pub fn empty_state() -> Arc<SearchState> {
    Arc::new(SearchState::new(
        Config::default(),
        Arc::new(WardGeocoder::default()),
    ))
}
