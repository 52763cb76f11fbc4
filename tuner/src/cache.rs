use std::collections::{BTreeMap, btree_map};

use log::info;
use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::{
    domain::{ParamDomain, ParameterSet},
    error::{Result, TunerError},
    metrics::MetricsSummary,
    series::{SampleSeries, SeriesGenerator},
};

/// A series together with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub predictions: SampleSeries,
    pub metrics: MetricsSummary,
}

impl CacheEntry {
    /// Generates and scores the series of `params`.
    pub fn evaluate(generator: &SeriesGenerator, params: &ParameterSet) -> Result<Self> {
        let predictions = generator.generate(params)?;
        let metrics = predictions.metrics()?;
        Ok(Self {
            predictions,
            metrics,
        })
    }
}

/// Precomputed entries for every legal tuple of a domain, keyed by canonical key.
///
/// Immutable once built. Serializes as a plain `{ key: entry }` object.
#[derive(Debug, Clone)]
pub struct PredictionCache {
    domain: ParamDomain,
    entries: BTreeMap<String, CacheEntry>,
}

impl PredictionCache {
    /// Builds the cache over the full cross-product of the generator's domain.
    ///
    /// Tuples are evaluated in parallel; the resulting map doesn't depend on scheduling.
    ///
    /// # Arguments
    /// * `generator` - The series generator, which also fixes the domain.
    ///
    /// # Returns
    /// The cache, or the first error met while evaluating a tuple. Two tuples sharing a
    /// key are a `DuplicateKey` error.
    pub fn build(generator: &SeriesGenerator) -> Result<Self> {
        let domain = generator.domain();
        let combos = domain.combinations();

        let evaluated = combos
            .par_iter()
            .map(|params| {
                let key = domain.key(params)?;
                let entry = CacheEntry::evaluate(generator, params)?;
                Ok((key, entry))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut entries = BTreeMap::new();
        for (key, entry) in evaluated {
            insert_unique(&mut entries, key, entry)?;
        }

        info!(
            "built prediction cache with {} entries of {} samples",
            entries.len(),
            generator.samples()
        );

        Ok(Self {
            domain: domain.clone(),
            entries,
        })
    }

    /// Assembles a cache from already computed entries, e.g. ones fetched from a server.
    pub fn from_entries(domain: ParamDomain, entries: BTreeMap<String, CacheEntry>) -> Self {
        Self { domain, entries }
    }

    pub fn domain(&self) -> &ParamDomain {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact key lookup.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Looks up `params` without snapping them.
    ///
    /// # Returns
    /// The entry, or `None` unless every knob holds one of its legal values.
    pub fn lookup(&self, params: &ParameterSet) -> Option<&CacheEntry> {
        if !self.domain.is_legal(params) {
            return None;
        }

        let key = self.domain.key(params).ok()?;
        self.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, CacheEntry> {
        self.entries.iter()
    }
}

fn insert_unique(
    entries: &mut BTreeMap<String, CacheEntry>,
    key: String,
    entry: CacheEntry,
) -> Result<()> {
    match entries.entry(key) {
        btree_map::Entry::Occupied(occupied) => {
            Err(TunerError::DuplicateKey(occupied.key().clone()))
        }
        btree_map::Entry::Vacant(vacant) => {
            vacant.insert(entry);
            Ok(())
        }
    }
}

impl Serialize for PredictionCache {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
