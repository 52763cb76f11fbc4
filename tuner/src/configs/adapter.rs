use std::sync::Arc;

use log::info;

use super::{DomainConfig, KnobConfig, TunerConfig};
use crate::{
    cache::{CacheEntry, PredictionCache},
    domain::{Knob, ParamDomain, ParameterSet},
    error::{Result, TunerError},
    fixture::{ChargesFixture, PerformanceFixture},
    series::{Baseline, SeriesGenerator, SeriesShape},
    workbench::{BestConfig, Workbench},
};

/// Turns a `TunerConfig` into a ready `Workbench`.
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Validates `config`, loads its fixtures and builds the prediction cache.
    ///
    /// # Arguments
    /// * `config` - The tuner configuration.
    ///
    /// # Returns
    /// A new `Workbench` or the first configuration, fixture or evaluation error.
    pub fn adapt(&self, config: TunerConfig) -> Result<Workbench> {
        self.validate(&config)?;

        let domain = self.adapt_domain(&config.domain)?;
        let best_params = self.adapt_best_params(&domain, config.best_config)?;

        let generator = match &config.charges_fixture {
            Some(path) => {
                let fixture = ChargesFixture::load(path)?;
                self.adapt_generator(domain, &fixture, config.samples)?
            }
            None => self.adapt_generator(domain, &SeriesShape::SYNTHETIC, config.samples)?,
        };

        let cache = PredictionCache::build(&generator)?;
        let best = self.adapt_best(&cache, best_params)?;

        let performance = config
            .performance_fixture
            .as_ref()
            .map(PerformanceFixture::load)
            .transpose()?;

        Ok(Workbench::new(generator, Arc::new(cache), best, performance))
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate(&self, config: &TunerConfig) -> Result<()> {
        if config.samples == 0 {
            return Err(TunerError::InvalidConfig(
                "samples must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    fn adapt_domain(&self, domain: &DomainConfig) -> Result<ParamDomain> {
        match domain {
            DomainConfig::Standard => Ok(ParamDomain::standard()),
            DomainConfig::Extended => Ok(ParamDomain::extended()),
            DomainConfig::Custom { knobs } => {
                let knobs = knobs
                    .iter()
                    .map(|k| self.adapt_knob(k))
                    .collect::<Result<Vec<_>>>()?;
                ParamDomain::new(knobs)
            }
        }
    }

    fn adapt_knob(&self, knob: &KnobConfig) -> Result<Knob> {
        let builtin = Knob::builtin(knob.kind);
        Knob::new(
            knob.kind,
            knob.values.clone(),
            knob.precision.unwrap_or(builtin.precision()),
            knob.weight.unwrap_or(builtin.weight()),
        )
    }

    /// The best configuration is supplied, never searched for. Without one, every knob
    /// falls back to the default pick: `200-0.1-4` for the core knobs, and the first
    /// legal value of any other knob.
    fn adapt_best_params(
        &self,
        domain: &ParamDomain,
        supplied: Option<ParameterSet>,
    ) -> Result<ParameterSet> {
        let params = match supplied {
            Some(params) => params,
            None => domain
                .knobs()
                .iter()
                .fold(ParameterSet::new(200.0, 0.1, 4.0), |params, knob| {
                    let value = match params.get(knob.kind()) {
                        Some(value) => knob.snap(value),
                        None => knob.values()[0],
                    };
                    params.with(knob.kind(), value)
                }),
        };

        let snapped = domain.snap(&params).map_err(|e| {
            TunerError::InvalidConfig(format!("best_config: {e}"))
        })?;

        if !domain.is_legal(&params) {
            return Err(TunerError::InvalidConfig(format!(
                "best_config {} is not a legal tuple",
                domain.key(&params)?
            )));
        }

        Ok(snapped)
    }

    fn adapt_generator(
        &self,
        domain: ParamDomain,
        baseline: &dyn Baseline,
        samples: usize,
    ) -> Result<SeriesGenerator> {
        let generator = SeriesGenerator::new(domain, baseline, samples)?;
        info!(
            "series generator ready: {} knob(s), {} sample(s)",
            generator.domain().knobs().len(),
            generator.samples()
        );
        Ok(generator)
    }

    fn adapt_best(&self, cache: &PredictionCache, params: ParameterSet) -> Result<BestConfig> {
        let CacheEntry { metrics, .. } = cache.lookup(&params).ok_or_else(|| {
            TunerError::InvalidConfig("best_config is missing from the prediction cache".into())
        })?;

        Ok(BestConfig {
            params,
            metrics: *metrics,
        })
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_adapts() {
        let workbench = Adapter::new().adapt(TunerConfig::default()).unwrap();
        assert_eq!(workbench.cache().len(), 48);
        assert_eq!(workbench.best().params, ParameterSet::new(200.0, 0.1, 4.0));
        assert!(workbench.performance().is_none());
    }

    #[test]
    fn extended_config_picks_default_best() {
        let config = TunerConfig {
            samples: 5,
            domain: DomainConfig::Extended,
            ..Default::default()
        };
        let workbench = Adapter::new().adapt(config).unwrap();
        assert_eq!(workbench.cache().len(), 432);
        assert_eq!(
            workbench.best().params,
            ParameterSet::new(200.0, 0.1, 4.0).extended(2.0, 0.8)
        );
    }

    #[test]
    fn zero_samples_are_rejected() {
        let config = TunerConfig {
            samples: 0,
            ..Default::default()
        };
        assert!(matches!(
            Adapter::new().adapt(config),
            Err(TunerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn off_grid_best_config_is_rejected() {
        let config = TunerConfig {
            best_config: Some(ParameterSet::new(210.0, 0.1, 4.0)),
            ..Default::default()
        };
        let err = Adapter::new().adapt(config).unwrap_err();
        assert!(err.to_string().contains("210-0.1-4"));
    }

    #[test]
    fn custom_domain_is_validated() {
        let config = TunerConfig::from_json(
            r#"{"domain": {"kind": "custom", "knobs": [
                { "kind": "n_estimators", "values": [10, 20] },
                { "kind": "max_depth", "values": [1] }
            ]}}"#,
        )
        .unwrap();
        assert!(Adapter::new().adapt(config).is_err());
    }

    #[test]
    fn custom_values_must_not_share_a_key() {
        let config = TunerConfig::from_json(
            r#"{"domain": {"kind": "custom", "knobs": [
                { "kind": "n_estimators", "values": [100] },
                { "kind": "learning_rate", "values": [0.011, 0.014] },
                { "kind": "max_depth", "values": [3] }
            ]}}"#,
        )
        .unwrap();
        assert!(matches!(
            Adapter::new().adapt(config),
            Err(TunerError::InvalidConfig(_))
        ));

        let finer = TunerConfig::from_json(
            r#"{"domain": {"kind": "custom", "knobs": [
                { "kind": "n_estimators", "values": [100] },
                { "kind": "learning_rate", "values": [0.011, 0.014], "precision": 3 },
                { "kind": "max_depth", "values": [3] }
            ]}}"#,
        )
        .unwrap();
        let workbench = Adapter::new().adapt(finer).unwrap();
        assert_eq!(workbench.cache().len(), 2);
        assert!(workbench.cache().get("100-0.011-3").is_some());
        assert!(workbench.cache().get("100-0.014-3").is_some());
    }

    #[test]
    fn custom_domain_with_explicit_best() {
        let config = TunerConfig::from_json(
            r#"{
                "samples": 8,
                "domain": {"kind": "custom", "knobs": [
                    { "kind": "n_estimators", "values": [10, 20] },
                    { "kind": "learning_rate", "values": [0.3] },
                    { "kind": "max_depth", "values": [1, 2, 3] }
                ]},
                "best_config": { "n_estimators": 20, "learning_rate": 0.3, "max_depth": 2 }
            }"#,
        )
        .unwrap();
        let workbench = Adapter::new().adapt(config).unwrap();
        assert_eq!(workbench.cache().len(), 6);
        assert!(workbench.cache().get("20-0.3-2").is_some());
        assert_eq!(workbench.best().params, ParameterSet::new(20.0, 0.3, 2.0));
    }

    #[test]
    fn charges_fixture_replaces_synthetic_actual() {
        let path = std::env::temp_dir().join(format!("charges-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"charges": 100.0}}, {{"charges": 250.0}}, {{"charges": 175.0}}]"#
        )
        .unwrap();

        let config = TunerConfig {
            samples: 3,
            charges_fixture: Some(path.clone()),
            ..Default::default()
        };
        let workbench = Adapter::new().adapt(config).unwrap();
        let entry = workbench.cache().get("100-0.05-3").unwrap();
        assert_eq!(entry.predictions.actual(), vec![100.0, 250.0, 175.0]);

        let short = TunerConfig {
            samples: 4,
            charges_fixture: Some(path.clone()),
            ..Default::default()
        };
        assert!(matches!(
            Adapter::new().adapt(short),
            Err(TunerError::FixtureTooShort { .. })
        ));

        std::fs::remove_file(path).unwrap();
    }
}
