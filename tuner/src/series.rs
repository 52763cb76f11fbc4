use serde::Serialize;

use crate::{
    domain::{ParamDomain, ParameterSet},
    error::Result,
    metrics::MetricsSummary,
};

/// Default number of points in a series.
pub const DEFAULT_SAMPLES: usize = 50;

/// Provides the "actual" values a predicted curve is compared against.
pub trait Baseline: Send + Sync {
    /// Returns the first `len` actual values.
    ///
    /// # Errors
    /// Fails if the source can't provide `len` values.
    fn actual(&self, len: usize) -> Result<Vec<f64>>;
}

/// A closed-form actual series: a linear trend plus a sine wave.
///
/// `actual(i) = base + amplitude * sin(i * frequency) + i * slope`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesShape {
    pub base: f64,
    pub amplitude: f64,
    pub frequency: f64,
    pub slope: f64,
}

impl SeriesShape {
    /// The shape shared by every parameter tuple.
    pub const SYNTHETIC: Self = Self {
        base: 10_000.0,
        amplitude: 5_000.0,
        frequency: 0.1,
        slope: 1_000.0,
    };

    pub fn value_at(&self, index: usize) -> f64 {
        let i = index as f64;
        self.base + (i * self.frequency).sin() * self.amplitude + i * self.slope
    }
}

impl Default for SeriesShape {
    fn default() -> Self {
        Self::SYNTHETIC
    }
}

impl Baseline for SeriesShape {
    fn actual(&self, len: usize) -> Result<Vec<f64>> {
        Ok((0..len).map(|i| self.value_at(i)).collect())
    }
}

/// The synthetic prediction for the point at `index`.
///
/// # Arguments
/// * `actual` - The actual value at `index`.
/// * `index` - Position of the point in the series.
/// * `factor` - The combined factor of the parameter tuple.
pub fn predicted_value(actual: f64, index: usize, factor: f64) -> f64 {
    actual * (0.8 + ((index as f64 * factor).sin() * 0.2 + 0.2))
}

/// One point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    pub index: usize,
    pub actual: f64,
    pub predicted: f64,
}

/// An ordered sequence of points, serialized as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SampleSeries {
    points: Vec<SamplePoint>,
}

impl SampleSeries {
    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn actual(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.actual).collect()
    }

    pub fn predicted(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    /// Scores the predicted values against the actual ones.
    pub fn metrics(&self) -> Result<MetricsSummary> {
        MetricsSummary::compute(&self.actual(), &self.predicted())
    }
}

impl FromIterator<SamplePoint> for SampleSeries {
    fn from_iter<I: IntoIterator<Item = SamplePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Produces series for parameter tuples of one domain over a fixed actual baseline.
#[derive(Debug, Clone)]
pub struct SeriesGenerator {
    domain: ParamDomain,
    actual: Vec<f64>,
}

impl SeriesGenerator {
    /// Creates a new `SeriesGenerator`.
    ///
    /// # Arguments
    /// * `domain` - The parameter domain, which also defines the knob weights.
    /// * `baseline` - Where the actual values come from.
    /// * `samples` - Number of points in every generated series.
    ///
    /// # Returns
    /// A new `SeriesGenerator` or the baseline's error if it can't provide `samples` values.
    pub fn new(domain: ParamDomain, baseline: &dyn Baseline, samples: usize) -> Result<Self> {
        let actual = baseline.actual(samples)?;
        Ok(Self { domain, actual })
    }

    /// A generator over the synthetic baseline.
    pub fn synthetic(domain: ParamDomain, samples: usize) -> Self {
        Self {
            domain,
            actual: (0..samples)
                .map(|i| SeriesShape::SYNTHETIC.value_at(i))
                .collect(),
        }
    }

    pub fn domain(&self) -> &ParamDomain {
        &self.domain
    }

    pub fn samples(&self) -> usize {
        self.actual.len()
    }

    /// Generates the series of `params`.
    ///
    /// `params` is used as given; snapping is the caller's business.
    ///
    /// # Returns
    /// The series, or an error if `params` lacks a knob of the domain.
    pub fn generate(&self, params: &ParameterSet) -> Result<SampleSeries> {
        let factor = self.domain.combined_factor(params)?;

        Ok(self
            .actual
            .iter()
            .enumerate()
            .map(|(index, &actual)| SamplePoint {
                index,
                actual,
                predicted: predicted_value(actual, index, factor),
            })
            .collect())
    }
}
