//! Configuration for implace-core
//!
//! Thresholds for every stage of the duplicate-resolution pipeline. The
//! defaults reproduce the behavior the pipeline was tuned with; a TOML file
//! only needs to mention the values it changes.
//!
//! ```toml
//! [loader]
//! coordinate_precision = 7
//! extra_ignored_types = ["lodging"]
//!
//! [cluster]
//! max_plausible_members = 2
//! min_ratings = 3
//!
//! [proximity]
//! max_distance_km = 0.1
//! close_distance_km = 0.025
//! name_similarity = 0.7
//! close_name_similarity = 0.5
//! haversine = "radians"
//! tie_break = "keep_both"
//! name_metric = "indel"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Pipeline-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Raw entry validation settings
    pub loader: LoaderConfig,
    /// Coordinate-bin filter settings
    pub cluster: ClusterConfig,
    /// Distance plus name-similarity resolver settings
    pub proximity: ProximityConfig,
}

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Number of decimal digits kept when truncating coordinates
    pub coordinate_precision: u32,
    /// Category tokens dropped in addition to the built-in denylist
    pub extra_ignored_types: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: 7,
            extra_ignored_types: Vec::new(),
        }
    }
}

/// Coordinate cluster filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Largest bin size treated as genuinely co-located venues
    pub max_plausible_members: usize,
    /// Members of a candidate cluster need at least this many ratings to stay
    pub min_ratings: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_plausible_members: 2,
            min_ratings: 3,
        }
    }
}

/// Which latitude values feed the cosine cross term of the haversine formula
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaversineMode {
    /// Latitudes converted to radians
    #[default]
    Radians,
    /// Latitudes passed to `cos` as raw degrees, for parity with legacy runs
    LegacyDegrees,
}

/// Resolution for duplicate pairs with equal type presence and equal ratings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// Leave the pair unresolved; both records survive
    #[default]
    KeepBoth,
    /// Keep the earlier record and remove the later one
    PreferEarlier,
}

/// String metric used to compare names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMetric {
    /// Indel ratio, `2 * lcs / (len_a + len_b)`; the thresholds are tuned for it
    #[default]
    Indel,
    /// Levenshtein distance normalized by the longer name
    Levenshtein,
}

/// Proximity resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Pairs at or beyond this distance are never duplicates
    pub max_distance_km: f64,
    /// Pairs closer than this accept the lower name threshold
    pub close_distance_km: f64,
    /// Name similarity required within `max_distance_km`
    pub name_similarity: f64,
    /// Name similarity required within `close_distance_km`
    pub close_name_similarity: f64,
    /// Earth mean radius used by the haversine formula
    pub earth_radius_km: f64,
    pub haversine: HaversineMode,
    pub tie_break: TieBreakPolicy,
    pub name_metric: NameMetric,
    /// Fold case, accents and whitespace before comparing names
    pub normalize_names: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 0.1,
            close_distance_km: 0.025,
            name_similarity: 0.7,
            close_name_similarity: 0.5,
            earth_radius_km: 6373.0,
            haversine: HaversineMode::Radians,
            tie_break: TieBreakPolicy::KeepBoth,
            name_metric: NameMetric::Indel,
            normalize_names: false,
        }
    }
}

impl DedupConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Per-user config location (`<config dir>/implace/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("implace").join("config.toml"))
    }

    /// Load the per-user config file if present, defaults otherwise
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loader.coordinate_precision > 10 {
            return Err(ConfigError::OutOfRange(
                "coordinate_precision must be at most 10".to_string(),
            ));
        }

        let p = &self.proximity;
        for (name, value) in [
            ("name_similarity", p.name_similarity),
            ("close_name_similarity", p.close_name_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }

        for (name, value) in [
            ("max_distance_km", p.max_distance_km),
            ("close_distance_km", p.close_distance_km),
            ("earth_radius_km", p.earth_radius_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::OutOfRange(format!("{name} must be positive")));
            }
        }

        if p.close_distance_km > p.max_distance_km {
            return Err(ConfigError::InvalidThresholds(
                "close_distance_km must not exceed max_distance_km".to_string(),
            ));
        }

        if p.close_name_similarity > p.name_similarity {
            return Err(ConfigError::InvalidThresholds(
                "close_name_similarity must not exceed name_similarity".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration load or validation error
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold values are invalid relative to each other
    InvalidThresholds(String),
    /// Value is out of valid range
    OutOfRange(String),
    /// TOML or JSON could not be parsed
    Parse(String),
    /// Config file could not be read
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidThresholds(msg) => write!(f, "Invalid thresholds: {}", msg),
            ConfigError::OutOfRange(msg) => write!(f, "Value out of range: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
