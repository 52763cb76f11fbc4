//! Synthetic predictions for a gradient-boosting regressor tuned over a small, finite
//! hyperparameter grid.
//!
//! Requested parameters are snapped to the grid, every grid tuple gets a deterministic
//! actual/predicted series scored with RMSE, MAE and R², and the results are kept in a
//! cache keyed by the canonical encoding of the tuple.

pub mod cache;
pub mod configs;
pub mod domain;
pub mod error;
pub mod fixture;
pub mod metrics;
mod number;
pub mod series;
pub mod store;
mod workbench;

use log::info;

pub use cache::{CacheEntry, PredictionCache};
pub use domain::{Knob, KnobKind, ParamDomain, ParameterSet};
pub use error::{Result, TunerError};
pub use metrics::MetricsSummary;
pub use series::{SampleSeries, SeriesGenerator};
pub use store::{DashboardStore, View};
pub use workbench::{BestConfig, Workbench};

use crate::configs::{Adapter, TunerConfig};

/// Loads the fixtures named by `config` and builds the prediction cache.
///
/// # Errors
/// Returns a `TunerError` if the configuration is invalid, a fixture can't be read or
/// a tuple can't be evaluated.
pub fn prepare(config: TunerConfig) -> Result<Workbench> {
    info!("preparing workbench");
    let workbench = Adapter::new().adapt(config)?;
    info!(
        "workbench ready: {} cached tuple(s), best config {}",
        workbench.cache().len(),
        workbench.domain().key(&workbench.best().params)?
    );
    Ok(workbench)
}
