use serde::Serialize;

use crate::error::{Result, TunerError};

/// Error metrics of one predicted series against its actual values.
///
/// `r2` is NaN when the actual values have no variance and the prediction misses
/// them; it serializes as JSON `null` in that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl MetricsSummary {
    /// Computes RMSE, MAE and R² over a pair of series.
    ///
    /// When the actual values are constant (this includes single-point series) the
    /// R² denominator is zero: R² is then 1 for an exact prediction and NaN otherwise.
    ///
    /// # Arguments
    /// * `actual` - The observed values.
    /// * `predicted` - The predicted values, paired by position with `actual`.
    ///
    /// # Returns
    /// The metrics, or an error if the series are empty or differ in length.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(TunerError::LengthMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }

        if actual.is_empty() {
            return Err(TunerError::EmptySeries);
        }

        let n = actual.len() as f64;
        let (ss_res, abs_sum) = actual
            .iter()
            .zip(predicted)
            .fold((0.0, 0.0), |(sq, abs), (a, p)| {
                let residual = a - p;
                (sq + residual * residual, abs + residual.abs())
            });

        let mean = actual.iter().sum::<f64>() / n;
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

        // Checked on the values: the mean of a constant series may not round back to them.
        let constant = actual.iter().all(|&a| a == actual[0]);
        let r2 = if constant || ss_tot == 0.0 {
            if ss_res == 0.0 { 1.0 } else { f64::NAN }
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(Self {
            rmse: (ss_res / n).sqrt(),
            mae: abs_sum / n,
            r2,
        })
    }
}
