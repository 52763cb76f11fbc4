use std::sync::Arc;

use crate::{
    cache::{CacheEntry, PredictionCache},
    domain::ParameterSet,
    error::Result,
};

/// What the dashboard shows for the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    /// No cache has been fetched yet.
    Loading,
    /// The snapped parameters are in the cache.
    Ready { key: String, entry: &'a CacheEntry },
    /// The snapped parameters are not in the cache. Never falls back to older data.
    NotFound { key: String },
}

/// Client-side state: the last fetched cache and the last chosen parameters.
///
/// Everything displayed is re-derived from these two fields by [`DashboardStore::view`].
#[derive(Debug, Clone)]
pub struct DashboardStore {
    cache: Option<Arc<PredictionCache>>,
    params: ParameterSet,
    best: Option<ParameterSet>,
}

impl DashboardStore {
    /// Creates a new `DashboardStore` without a cache.
    ///
    /// # Arguments
    /// * `params` - The initially chosen parameters.
    pub fn new(params: ParameterSet) -> Self {
        Self {
            cache: None,
            params,
            best: None,
        }
    }

    /// Replaces the cache, e.g. after a successful fetch.
    pub fn set_cache(&mut self, cache: Arc<PredictionCache>) {
        self.cache = Some(cache);
    }

    /// Replaces the chosen parameters. They are kept as given and snapped on view.
    pub fn set_params(&mut self, params: ParameterSet) {
        self.params = params;
    }

    pub fn set_best(&mut self, best: ParameterSet) {
        self.best = Some(best);
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn cache(&self) -> Option<&Arc<PredictionCache>> {
        self.cache.as_ref()
    }

    /// Derives the displayed series and metrics from the cache and the parameters.
    ///
    /// # Returns
    /// The view, or an error if the parameters can't be snapped to the cache's domain.
    pub fn view(&self) -> Result<View<'_>> {
        let Some(cache) = &self.cache else {
            return Ok(View::Loading);
        };

        let domain = cache.domain();
        let key = domain.key(&domain.snap(&self.params)?)?;

        Ok(match cache.get(&key) {
            Some(entry) => View::Ready { key, entry },
            None => View::NotFound { key },
        })
    }

    /// Whether the snapped parameters are the best configuration.
    pub fn is_optimal(&self) -> bool {
        let (Some(cache), Some(best)) = (&self.cache, &self.best) else {
            return false;
        };

        cache
            .domain()
            .snap(&self.params)
            .is_ok_and(|snapped| snapped == *best)
    }
}

impl Default for DashboardStore {
    /// Starts from the dashboard's initial slider positions.
    fn default() -> Self {
        Self::new(ParameterSet::new(100.0, 0.05, 3.0))
    }
}
