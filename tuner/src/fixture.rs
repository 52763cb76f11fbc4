//! Read-only data providers backed by small JSON files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    error::{Result, TunerError},
    number,
    series::Baseline,
};

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path).map_err(|source| TunerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| TunerError::Json {
        path: Some(path.to_path_buf()),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct ChargeRecord {
    charges: f64,
}

/// Real insurance charges replayed as the actual series.
///
/// The file is a JSON array of records; only their `charges` field is read.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargesFixture {
    charges: Vec<f64>,
}

impl ChargesFixture {
    pub fn new(charges: Vec<f64>) -> Self {
        Self { charges }
    }

    /// Loads the fixture at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let records: Vec<ChargeRecord> = read_records(path)?;
        info!("loaded {} charge record(s) from {}", records.len(), path.display());
        Ok(Self::new(records.into_iter().map(|r| r.charges).collect()))
    }

    /// Parses a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<ChargeRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records.into_iter().map(|r| r.charges).collect()))
    }

    pub fn charges(&self) -> &[f64] {
        &self.charges
    }
}

impl Baseline for ChargesFixture {
    fn actual(&self, len: usize) -> Result<Vec<f64>> {
        if self.charges.len() < len {
            return Err(TunerError::FixtureTooShort {
                needed: len,
                available: self.charges.len(),
            });
        }

        Ok(self.charges[..len].to_vec())
    }
}

/// One precomputed result of the offline hyperparameter sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    #[serde(serialize_with = "number::serialize")]
    pub n_estimators: f64,
    pub learning_rate: f64,
    #[serde(serialize_with = "number::serialize")]
    pub max_depth: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Optional filters over performance records; each present field must match exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct PerformanceFilter {
    pub n_estimators: Option<f64>,
    pub learning_rate: Option<f64>,
    pub max_depth: Option<f64>,
}

impl PerformanceFilter {
    pub fn matches(&self, record: &PerformanceRecord) -> bool {
        self.n_estimators.is_none_or(|v| v == record.n_estimators)
            && self.learning_rate.is_none_or(|v| v == record.learning_rate)
            && self.max_depth.is_none_or(|v| v == record.max_depth)
    }
}

/// Results of the offline sweep, served as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceFixture {
    source: Option<PathBuf>,
    records: Vec<PerformanceRecord>,
}

impl PerformanceFixture {
    pub fn new(records: Vec<PerformanceRecord>) -> Self {
        Self {
            source: None,
            records,
        }
    }

    /// Loads the fixture at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let records: Vec<PerformanceRecord> = read_records(path)?;
        info!(
            "loaded {} performance record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            source: Some(path.to_path_buf()),
            records,
        })
    }

    /// Parses a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    /// The records matching `filter`, in file order.
    pub fn filter(&self, filter: &PerformanceFilter) -> Vec<PerformanceRecord> {
        self.records
            .iter()
            .filter(|r| filter.matches(r))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERFORMANCE: &str = r#"[
        {"n_estimators": 50, "learning_rate": 0.01, "max_depth": 2, "rmse": 9000.5, "mae": 7000.1, "r2": 0.41},
        {"n_estimators": 50, "learning_rate": 0.1, "max_depth": 3, "rmse": 4500.0, "mae": 2500.0, "r2": 0.87},
        {"n_estimators": 100, "learning_rate": 0.1, "max_depth": 3, "rmse": 4400.0, "mae": 2450.0, "r2": 0.88}
    ]"#;

    #[test]
    fn charges_ignore_other_fields() {
        let fixture = ChargesFixture::from_json(
            r#"[{"age": 19, "bmi": 27.9, "charges": 16884.924}, {"charges": 1725.5523, "smoker": "no"}]"#,
        )
        .unwrap();
        assert_eq!(fixture.charges(), &[16884.924, 1725.5523]);
    }

    #[test]
    fn charges_record_requires_charges() {
        assert!(ChargesFixture::from_json(r#"[{"age": 19}]"#).is_err());
    }

    #[test]
    fn charges_baseline_length() {
        let fixture = ChargesFixture::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(fixture.actual(2).unwrap(), vec![1.0, 2.0]);
        assert!(matches!(
            fixture.actual(5),
            Err(TunerError::FixtureTooShort {
                needed: 5,
                available: 3
            })
        ));
    }

    #[test]
    fn filter_by_every_field() {
        let fixture = PerformanceFixture::from_json(PERFORMANCE).unwrap();
        assert_eq!(fixture.filter(&PerformanceFilter::default()).len(), 3);

        let by_lr = PerformanceFilter {
            learning_rate: Some(0.1),
            ..Default::default()
        };
        assert_eq!(fixture.filter(&by_lr).len(), 2);

        let exact = PerformanceFilter {
            n_estimators: Some(100.0),
            learning_rate: Some(0.1),
            max_depth: Some(3.0),
        };
        let found = fixture.filter(&exact);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].r2, 0.88);

        let none = PerformanceFilter {
            max_depth: Some(7.0),
            ..Default::default()
        };
        assert!(fixture.filter(&none).is_empty());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PerformanceFixture::load("does/not/exist.json").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn records_serialize_with_integer_knobs() {
        let fixture = PerformanceFixture::from_json(PERFORMANCE).unwrap();
        let json = serde_json::to_string(&fixture.records()[0]).unwrap();
        assert!(json.starts_with(r#"{"n_estimators":50,"learning_rate":0.01,"max_depth":2,"#));
    }
}
