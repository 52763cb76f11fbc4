use std::sync::Arc;

use log::debug;
use serde::Serialize;

use crate::{
    cache::{CacheEntry, PredictionCache},
    domain::{ParamDomain, ParameterSet},
    error::Result,
    fixture::PerformanceFixture,
    metrics::MetricsSummary,
    series::SeriesGenerator,
    store::DashboardStore,
};

/// The supplied best configuration, flattened together with its metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestConfig {
    #[serde(flatten)]
    pub params: ParameterSet,
    pub metrics: MetricsSummary,
}

/// Everything a process serves: the generator, its prebuilt cache and the fixtures.
///
/// Immutable once built, so it can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct Workbench {
    generator: SeriesGenerator,
    cache: Arc<PredictionCache>,
    best: BestConfig,
    performance: Option<PerformanceFixture>,
}

impl Workbench {
    pub fn new(
        generator: SeriesGenerator,
        cache: Arc<PredictionCache>,
        best: BestConfig,
        performance: Option<PerformanceFixture>,
    ) -> Self {
        Self {
            generator,
            cache,
            best,
            performance,
        }
    }

    pub fn domain(&self) -> &ParamDomain {
        self.generator.domain()
    }

    pub fn cache(&self) -> &Arc<PredictionCache> {
        &self.cache
    }

    pub fn best(&self) -> &BestConfig {
        &self.best
    }

    pub fn performance(&self) -> Option<&PerformanceFixture> {
        self.performance.as_ref()
    }

    /// Snaps `requested` and evaluates the resulting tuple.
    ///
    /// # Returns
    /// The series and metrics, or an error if `requested` lacks a knob or holds a
    /// non finite value.
    pub fn predict(&self, requested: &ParameterSet) -> Result<CacheEntry> {
        let snapped = self.domain().snap(requested)?;
        debug!(
            "predicting {} for request {requested:?}",
            self.domain().key(&snapped)?
        );
        CacheEntry::evaluate(&self.generator, &snapped)
    }

    /// A store primed with this workbench's cache and best configuration.
    pub fn store(&self, params: ParameterSet) -> DashboardStore {
        let mut store = DashboardStore::new(params);
        store.set_cache(Arc::clone(&self.cache));
        store.set_best(self.best.params);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::{Adapter, TunerConfig};

    fn workbench() -> Workbench {
        Adapter::new().adapt(TunerConfig::default()).unwrap()
    }

    #[test]
    fn predict_snaps_the_request() {
        let workbench = workbench();
        let off_grid = workbench
            .predict(&ParameterSet::new(73.0, 0.06, 3.2))
            .unwrap();
        let on_grid = workbench.cache().get("50-0.05-3").unwrap();
        assert_eq!(&off_grid, on_grid);
    }

    #[test]
    fn predict_rejects_non_finite() {
        let workbench = workbench();
        assert!(
            workbench
                .predict(&ParameterSet::new(f64::INFINITY, 0.05, 3.0))
                .is_err()
        );
    }

    #[test]
    fn best_config_serializes_flat() {
        let workbench = workbench();
        let json = serde_json::to_value(workbench.best()).unwrap();
        assert_eq!(json["n_estimators"], 200);
        assert_eq!(json["learning_rate"], 0.1);
        assert_eq!(json["max_depth"], 4);
        assert!(json["metrics"]["rmse"].as_f64().unwrap() >= 0.0);
        assert!(json.get("min_samples_split").is_none());
    }
}
