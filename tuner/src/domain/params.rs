use serde::{Deserialize, Serialize};

use super::KnobKind;
use crate::number;

/// One value per knob, as requested by a client or produced by the cross-product sweep.
///
/// The extended knobs are optional: a three-knob domain ignores them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(serialize_with = "number::serialize")]
    pub n_estimators: f64,
    #[serde(serialize_with = "number::serialize")]
    pub learning_rate: f64,
    #[serde(serialize_with = "number::serialize")]
    pub max_depth: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_option"
    )]
    pub min_samples_split: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_option"
    )]
    pub subsample: Option<f64>,
}

impl ParameterSet {
    /// Creates a three-knob `ParameterSet`.
    pub fn new(n_estimators: f64, learning_rate: f64, max_depth: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth,
            min_samples_split: None,
            subsample: None,
        }
    }

    /// Adds the extended knobs to this set.
    pub fn extended(mut self, min_samples_split: f64, subsample: f64) -> Self {
        self.min_samples_split = Some(min_samples_split);
        self.subsample = Some(subsample);
        self
    }

    /// The value this set carries for `kind`, if any.
    pub fn get(&self, kind: KnobKind) -> Option<f64> {
        match kind {
            KnobKind::NEstimators => Some(self.n_estimators),
            KnobKind::LearningRate => Some(self.learning_rate),
            KnobKind::MaxDepth => Some(self.max_depth),
            KnobKind::MinSamplesSplit => self.min_samples_split,
            KnobKind::Subsample => self.subsample,
        }
    }

    /// Returns a copy of this set with `kind` set to `value`.
    pub fn with(mut self, kind: KnobKind, value: f64) -> Self {
        match kind {
            KnobKind::NEstimators => self.n_estimators = value,
            KnobKind::LearningRate => self.learning_rate = value,
            KnobKind::MaxDepth => self.max_depth = value,
            KnobKind::MinSamplesSplit => self.min_samples_split = Some(value),
            KnobKind::Subsample => self.subsample = Some(value),
        }
        self
    }

    /// Returns a copy of this set without `kind`. Core knobs can't be cleared.
    pub(crate) fn without(mut self, kind: KnobKind) -> Self {
        match kind {
            KnobKind::MinSamplesSplit => self.min_samples_split = None,
            KnobKind::Subsample => self.subsample = None,
            KnobKind::NEstimators | KnobKind::LearningRate | KnobKind::MaxDepth => {}
        }
        self
    }
}
