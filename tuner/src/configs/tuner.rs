use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    domain::{KnobKind, ParameterSet},
    error::{Result, TunerError},
    series::DEFAULT_SAMPLES,
};

/// One knob of a custom domain. Missing precision and weight fall back to the built-ins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnobConfig {
    pub kind: KnobKind,
    pub values: Vec<f64>,
    pub precision: Option<usize>,
    pub weight: Option<f64>,
}

/// Which knobs are tunable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DomainConfig {
    #[default]
    Standard,
    Extended,
    Custom {
        knobs: Vec<KnobConfig>,
    },
}

/// Top level configuration, usually read from a JSON file.
///
/// Every field is optional:
///
/// ```json
/// {
///   "samples": 50,
///   "domain": { "kind": "extended" },
///   "best_config": { "n_estimators": 200, "learning_rate": 0.1, "max_depth": 4,
///                    "min_samples_split": 2, "subsample": 1.0 },
///   "charges_fixture": "fixtures/insurance_charges.json",
///   "performance_fixture": "fixtures/model_performance.json"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunerConfig {
    pub samples: usize,
    pub domain: DomainConfig,
    pub best_config: Option<ParameterSet>,
    pub charges_fixture: Option<PathBuf>,
    pub performance_fixture: Option<PathBuf>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            domain: DomainConfig::default(),
            best_config: None,
            charges_fixture: None,
            performance_fixture: None,
        }
    }
}

impl TunerConfig {
    /// Loads a `TunerConfig` from a JSON file.
    ///
    /// Relative fixture paths are taken as relative to the current directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TunerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| TunerError::Json {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
