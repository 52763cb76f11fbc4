use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TunerError};

/// One tunable hyperparameter of the regressor.
///
/// The declaration order is the order knobs take inside a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnobKind {
    NEstimators,
    LearningRate,
    MaxDepth,
    MinSamplesSplit,
    Subsample,
}

impl KnobKind {
    /// The knobs every domain must declare.
    pub const CORE: [KnobKind; 3] = [Self::NEstimators, Self::LearningRate, Self::MaxDepth];

    /// Every known knob, in key order.
    pub const ALL: [KnobKind; 5] = [
        Self::NEstimators,
        Self::LearningRate,
        Self::MaxDepth,
        Self::MinSamplesSplit,
        Self::Subsample,
    ];

    /// The wire name of this knob.
    pub fn name(self) -> &'static str {
        match self {
            Self::NEstimators => "n_estimators",
            Self::LearningRate => "learning_rate",
            Self::MaxDepth => "max_depth",
            Self::MinSamplesSplit => "min_samples_split",
            Self::Subsample => "subsample",
        }
    }

    pub fn is_core(self) -> bool {
        Self::CORE.contains(&self)
    }

    fn default_values(self) -> &'static [f64] {
        match self {
            Self::NEstimators => &[50.0, 100.0, 150.0, 200.0],
            Self::LearningRate => &[0.01, 0.05, 0.1],
            Self::MaxDepth => &[2.0, 3.0, 4.0, 5.0],
            Self::MinSamplesSplit => &[2.0, 5.0, 10.0],
            Self::Subsample => &[0.8, 0.9, 1.0],
        }
    }

    fn default_precision(self) -> usize {
        match self {
            Self::LearningRate | Self::Subsample => 2,
            Self::NEstimators | Self::MaxDepth | Self::MinSamplesSplit => 0,
        }
    }

    fn default_weight(self) -> f64 {
        match self {
            Self::NEstimators => 0.01,
            Self::LearningRate => 1.0,
            Self::MaxDepth => 0.1,
            Self::MinSamplesSplit => 0.01,
            Self::Subsample => 0.1,
        }
    }
}

impl fmt::Display for KnobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the member of `legal` closest to `value`.
///
/// Ties go to whichever candidate comes first in `legal`.
///
/// # Arguments
/// * `value` - The requested value.
/// * `legal` - The legal values, in declared order.
///
/// # Returns
/// The nearest legal value, or `None` if `legal` is empty.
pub fn nearest(value: f64, legal: &[f64]) -> Option<f64> {
    let (&first, rest) = legal.split_first()?;

    Some(rest.iter().fold(first, |best, &candidate| {
        if (candidate - value).abs() < (best - value).abs() {
            candidate
        } else {
            best
        }
    }))
}

/// A knob together with its legal values and how it takes part in keys and predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct Knob {
    kind: KnobKind,
    values: Vec<f64>,
    precision: usize,
    weight: f64,
}

impl Knob {
    /// Creates a new `Knob`.
    ///
    /// # Arguments
    /// * `kind` - Which hyperparameter this is.
    /// * `values` - The legal values, in declared order.
    /// * `precision` - Decimal places used when encoding a value in a cache key.
    /// * `weight` - Weight of this knob in the combined prediction factor.
    ///
    /// # Returns
    /// A new `Knob` or `InvalidConfig` if `values` is empty, holds a non finite number or
    /// holds two values that encode the same at `precision`.
    pub fn new(kind: KnobKind, values: Vec<f64>, precision: usize, weight: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(TunerError::InvalidConfig(format!(
                "{kind} must have at least one legal value"
            )));
        }

        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(TunerError::InvalidConfig(format!(
                "{kind} has a non finite legal value: {bad}"
            )));
        }

        if !weight.is_finite() {
            return Err(TunerError::InvalidConfig(format!(
                "{kind} has a non finite weight: {weight}"
            )));
        }

        let knob = Self {
            kind,
            values,
            precision,
            weight,
        };

        let mut parts = HashSet::new();
        for &value in &knob.values {
            let part = knob.encode(value);
            if !parts.insert(part.clone()) {
                return Err(TunerError::InvalidConfig(format!(
                    "{kind} value {value} encodes as {part} like another legal value, \
                     raise its precision"
                )));
            }
        }

        Ok(knob)
    }

    /// The built-in definition of `kind`.
    pub fn builtin(kind: KnobKind) -> Self {
        Self {
            kind,
            values: kind.default_values().to_vec(),
            precision: kind.default_precision(),
            weight: kind.default_weight(),
        }
    }

    /// Like [`Knob::new`], falling back to the built-in precision and weight.
    pub fn with_values(kind: KnobKind, values: Vec<f64>) -> Result<Self> {
        Self::new(
            kind,
            values,
            kind.default_precision(),
            kind.default_weight(),
        )
    }

    pub fn kind(&self) -> KnobKind {
        self.kind
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_legal(&self, value: f64) -> bool {
        self.values.contains(&value)
    }

    /// Snaps `value` to the nearest legal value of this knob.
    pub fn snap(&self, value: f64) -> f64 {
        nearest(value, &self.values).unwrap_or(value)
    }

    /// Encodes `value` the way it appears inside a cache key.
    ///
    /// The value is printed with this knob's precision and then stripped of trailing
    /// zeros, so `0.1` at precision 2 encodes as `0.1` and `100` at precision 0 as `100`.
    pub fn encode(&self, value: f64) -> String {
        let text = format!("{value:.prec$}", prec = self.precision);
        if !text.contains('.') {
            return text;
        }

        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
