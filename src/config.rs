//! Search configuration loaded from TOML.
//!
//! Every key is optional; a missing file or missing key falls back to the
//! defaults below. Lookup order for the file: `OMISE_CONFIG`, then
//! `<config_dir>/omise-search/config.toml`.

use crate::error::ConfigError;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "OMISE_CONFIG";

/// Environment variable naming the catalog JSON file.
pub const CATALOG_ENV: &str = "OMISE_CATALOG";

/// Keywords surfaced by `popular_keywords` unless the config overrides them.
const DEFAULT_POPULAR_KEYWORDS: &[&str] = &[
    "ラーメン",
    "寿司",
    "焼肉",
    "カフェ",
    "居酒屋",
    "美容室",
    "歯医者",
    "整体",
    "パン屋",
    "ジム",
];

/// Per-field weights for business records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessWeights {
    pub name: f64,
    pub description: f64,
    pub category: f64,
    pub location: f64,
    pub tags: f64,
}

impl Default for BusinessWeights {
    fn default() -> Self {
        Self {
            name: 0.7,
            description: 0.4,
            category: 0.6,
            location: 0.5,
            tags: 0.3,
        }
    }
}

/// Per-field weights for review records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewWeights {
    pub title: f64,
    pub content: f64,
    pub tags: f64,
}

impl Default for ReviewWeights {
    fn default() -> Self {
        Self {
            title: 0.7,
            content: 0.5,
            tags: 0.3,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum per-field fuzzy score that still counts as a match (0 exact, 1 anything).
    pub threshold: f64,
    pub business_weights: BusinessWeights,
    pub review_weights: ReviewWeights,
    /// Page size used when the caller gives none (or an unusable one).
    pub default_limit: usize,
    /// Upper bound on any requested page size.
    pub max_limit: usize,
    /// Suggestion count used when the caller gives none.
    pub suggestion_limit: usize,
    pub popular_keywords: Vec<String>,
    /// Where the geocoder lands when it cannot place an address.
    pub default_location: Coordinates,
    /// Number of built search engines kept across catalog reloads.
    pub engine_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            business_weights: BusinessWeights::default(),
            review_weights: ReviewWeights::default(),
            default_limit: 20,
            max_limit: 100,
            suggestion_limit: 5,
            popular_keywords: DEFAULT_POPULAR_KEYWORDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            default_location: Coordinates::TOKYO_STATION,
            engine_cache_size: 4,
        }
    }
}

impl Config {
    /// Resolve the config file location from the environment.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("omise-search").join("config.toml"))
    }

    /// Load from the default location, or defaults when there is none.
    pub fn discover() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::Invalid {
                key: "threshold",
                reason: format!("must be in (0, 1], got {}", self.threshold),
            });
        }

        let b = &self.business_weights;
        let r = &self.review_weights;
        for (key, weight) in [
            ("business_weights.name", b.name),
            ("business_weights.description", b.description),
            ("business_weights.category", b.category),
            ("business_weights.location", b.location),
            ("business_weights.tags", b.tags),
            ("review_weights.title", r.title),
            ("review_weights.content", r.content),
            ("review_weights.tags", r.tags),
        ] {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("weight must be in [0, 1], got {}", weight),
                });
            }
        }

        if self.default_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "default_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_limit < self.default_limit {
            return Err(ConfigError::Invalid {
                key: "max_limit",
                reason: format!(
                    "must be >= default_limit ({}), got {}",
                    self.default_limit, self.max_limit
                ),
            });
        }
        if self.engine_cache_size == 0 {
            return Err(ConfigError::Invalid {
                key: "engine_cache_size",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        check!(config == Config::default());
    }

    #[test]
    fn test_partial_override() {
        let file = write_config(
            r#"
threshold = 0.2
max_limit = 50

[business_weights]
name = 1.0
"#,
        );
        let config = Config::load(file.path()).unwrap();
        check!(config.threshold == 0.2);
        check!(config.max_limit == 50);
        check!(config.business_weights.name == 1.0);
        // Untouched keys keep their defaults
        check!(config.business_weights.tags == 0.3);
        check!(config.default_limit == 20);
    }

    #[test]
    fn test_default_location_override() {
        let file = write_config(
            r#"
[default_location]
latitude = 34.7025
longitude = 135.4959
"#,
        );
        let config = Config::load(file.path()).unwrap();
        check!(config.default_location.latitude == 34.7025);
    }

    #[rstest]
    #[case("threshold = 0.0", "threshold")]
    #[case("threshold = 1.5", "threshold")]
    #[case("default_limit = 0", "default_limit")]
    #[case("default_limit = 30\nmax_limit = 10", "max_limit")]
    #[case("engine_cache_size = 0", "engine_cache_size")]
    #[case("[review_weights]\ncontent = 2.0", "review_weights.content")]
    fn test_invalid_values(#[case] contents: &str, #[case] expected_key: &str) {
        let file = write_config(contents);
        let_assert!(Err(ConfigError::Invalid { key, .. }) = Config::load(file.path()));
        check!(key == expected_key);
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("threshold = [");
        let_assert!(Err(ConfigError::Parse { .. }) = Config::load(file.path()));
    }
}
