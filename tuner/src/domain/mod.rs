mod knob;
mod params;

use log::debug;
use serde::{Serialize, Serializer, ser::SerializeMap};

pub use knob::{Knob, KnobKind, nearest};
pub use params::ParameterSet;

use crate::{
    error::{Result, TunerError},
    number::Natural,
};

/// Separator between knob values inside a cache key.
pub const KEY_SEPARATOR: &str = "-";

/// The finite set of legal parameter tuples: an ordered list of knobs.
///
/// The knob order is fixed (see [`KnobKind`]) and is the order values take in a key.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDomain {
    knobs: Vec<Knob>,
}

impl ParamDomain {
    /// Creates a new `ParamDomain`.
    ///
    /// # Arguments
    /// * `knobs` - The knobs of the domain, in key order.
    ///
    /// # Returns
    /// A new `ParamDomain` or `InvalidConfig` if a core knob is missing, a knob repeats
    /// or the knobs are out of order.
    pub fn new(knobs: Vec<Knob>) -> Result<Self> {
        for kind in KnobKind::CORE {
            if !knobs.iter().any(|k| k.kind() == kind) {
                return Err(TunerError::InvalidConfig(format!(
                    "domain must declare {kind}"
                )));
            }
        }

        // Strictly increasing also rules out duplicates.
        for pair in knobs.windows(2) {
            if pair[0].kind() >= pair[1].kind() {
                return Err(TunerError::InvalidConfig(format!(
                    "knob {} must come after {}",
                    pair[0].kind(),
                    pair[1].kind()
                )));
            }
        }

        Ok(Self { knobs })
    }

    /// The three-knob domain: estimators, learning rate and max depth.
    pub fn standard() -> Self {
        Self {
            knobs: KnobKind::CORE.into_iter().map(Knob::builtin).collect(),
        }
    }

    /// The five-knob domain, adding min samples split and subsample ratio.
    pub fn extended() -> Self {
        Self {
            knobs: KnobKind::ALL.into_iter().map(Knob::builtin).collect(),
        }
    }

    pub fn knobs(&self) -> &[Knob] {
        &self.knobs
    }

    pub fn knob(&self, kind: KnobKind) -> Option<&Knob> {
        self.knobs.iter().find(|k| k.kind() == kind)
    }

    /// Number of tuples in the cross-product of every knob's legal values.
    pub fn combination_count(&self) -> usize {
        self.knobs.iter().map(|k| k.values().len()).product()
    }

    /// Snaps every knob of `params` to its nearest legal value.
    ///
    /// Knobs this domain doesn't declare are dropped from the result.
    ///
    /// # Arguments
    /// * `params` - The requested parameters.
    ///
    /// # Returns
    /// The snapped parameters, or an error if a declared knob is missing or not finite.
    pub fn snap(&self, params: &ParameterSet) -> Result<ParameterSet> {
        let mut snapped = *params;

        for kind in KnobKind::ALL {
            if self.knob(kind).is_none() && params.get(kind).is_some() {
                debug!("dropping {kind}, not part of the domain");
                snapped = snapped.without(kind);
            }
        }

        for knob in &self.knobs {
            let value = self.value_of(knob.kind(), params)?;
            snapped = snapped.with(knob.kind(), knob.snap(value));
        }

        Ok(snapped)
    }

    /// Whether every knob of `params` already holds a legal value.
    pub fn is_legal(&self, params: &ParameterSet) -> bool {
        self.knobs
            .iter()
            .all(|k| params.get(k.kind()).is_some_and(|v| k.is_legal(v)))
    }

    /// Builds the canonical cache key of `params`.
    ///
    /// `params` is encoded as given; snap it first to get a key present in the cache.
    pub fn key(&self, params: &ParameterSet) -> Result<String> {
        let parts = self
            .knobs
            .iter()
            .map(|knob| Ok(knob.encode(self.value_of(knob.kind(), params)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(parts.join(KEY_SEPARATOR))
    }

    /// The weighted sum of the knob values that drives the predicted curve.
    pub fn combined_factor(&self, params: &ParameterSet) -> Result<f64> {
        self.knobs.iter().try_fold(0.0, |acc, knob| {
            Ok(acc + knob.weight() * self.value_of(knob.kind(), params)?)
        })
    }

    /// Enumerates the cross-product of every knob's legal values.
    ///
    /// The first knob varies slowest.
    pub fn combinations(&self) -> Vec<ParameterSet> {
        self.knobs
            .iter()
            .fold(vec![ParameterSet::default()], |combos, knob| {
                combos
                    .into_iter()
                    .flat_map(|base| knob.values().iter().map(move |&v| base.with(knob.kind(), v)))
                    .collect()
            })
    }

    fn value_of(&self, kind: KnobKind, params: &ParameterSet) -> Result<f64> {
        let value = params.get(kind).ok_or(TunerError::MissingKnob(kind))?;
        if !value.is_finite() {
            return Err(TunerError::InvalidParameter { knob: kind, value });
        }

        Ok(value)
    }
}

impl Default for ParamDomain {
    fn default() -> Self {
        Self::standard()
    }
}

/// Serializes as `{ knob name: [legal values] }`, in key order.
impl Serialize for ParamDomain {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.knobs.len()))?;
        for knob in &self.knobs {
            let values: Vec<_> = knob.values().iter().copied().map(Natural).collect();
            map.serialize_entry(knob.kind().name(), &values)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn snap_out_of_domain_estimators() {
        let domain = ParamDomain::standard();
        let snapped = domain.snap(&ParameterSet::new(73.0, 0.05, 3.0)).unwrap();
        assert_eq!(snapped.n_estimators, 50.0);

        let snapped = domain.snap(&ParameterSet::new(77.0, 0.05, 3.0)).unwrap();
        assert_eq!(snapped.n_estimators, 100.0);
    }

    #[test]
    fn snap_is_idempotent() {
        let domain = ParamDomain::extended();
        for params in domain.combinations() {
            assert_eq!(domain.snap(&params).unwrap(), params);
        }

        let once = domain
            .snap(&ParameterSet::new(120.0, 0.07, 9.0).extended(7.0, 0.95))
            .unwrap();
        assert_eq!(domain.snap(&once).unwrap(), once);
    }

    #[test]
    fn snap_drops_undeclared_knobs() {
        let domain = ParamDomain::standard();
        let snapped = domain
            .snap(&ParameterSet::new(100.0, 0.05, 3.0).extended(5.0, 0.9))
            .unwrap();
        assert_eq!(snapped, ParameterSet::new(100.0, 0.05, 3.0));
    }

    #[test]
    fn snap_requires_declared_knobs() {
        let domain = ParamDomain::extended();
        let err = domain.snap(&ParameterSet::new(100.0, 0.05, 3.0)).unwrap_err();
        assert!(matches!(err, TunerError::MissingKnob(KnobKind::MinSamplesSplit)));
    }

    #[test]
    fn snap_rejects_non_finite() {
        let domain = ParamDomain::standard();
        let err = domain
            .snap(&ParameterSet::new(100.0, f64::NAN, 3.0))
            .unwrap_err();
        assert!(matches!(
            err,
            TunerError::InvalidParameter {
                knob: KnobKind::LearningRate,
                ..
            }
        ));
    }

    #[test]
    fn key_matches_natural_formatting() {
        let domain = ParamDomain::standard();
        assert_eq!(domain.key(&ParameterSet::new(100.0, 0.05, 3.0)).unwrap(), "100-0.05-3");
        assert_eq!(domain.key(&ParameterSet::new(200.0, 0.1, 4.0)).unwrap(), "200-0.1-4");

        let domain = ParamDomain::extended();
        let params = ParameterSet::new(50.0, 0.01, 2.0).extended(10.0, 1.0);
        assert_eq!(domain.key(&params).unwrap(), "50-0.01-2-10-1");
    }

    #[test]
    fn keys_are_unique_and_deterministic() {
        for domain in [ParamDomain::standard(), ParamDomain::extended()] {
            let combos = domain.combinations();
            assert_eq!(combos.len(), domain.combination_count());

            let keys: HashSet<_> = combos.iter().map(|p| domain.key(p).unwrap()).collect();
            assert_eq!(keys.len(), combos.len());

            for params in &combos {
                assert_eq!(domain.key(params).unwrap(), domain.key(params).unwrap());
            }
        }
    }

    #[test]
    fn combinations_vary_first_knob_slowest() {
        let domain = ParamDomain::standard();
        let combos = domain.combinations();
        assert_eq!(combos.len(), 48);
        assert_eq!(combos[0], ParameterSet::new(50.0, 0.01, 2.0));
        assert_eq!(combos[1], ParameterSet::new(50.0, 0.01, 3.0));
        assert_eq!(combos[47], ParameterSet::new(200.0, 0.1, 5.0));
    }

    #[test]
    fn combined_factor_of_standard_domain() {
        let domain = ParamDomain::standard();
        let factor = domain
            .combined_factor(&ParameterSet::new(100.0, 0.05, 3.0))
            .unwrap();
        assert!((factor - (100.0 * 0.01 + 0.05 + 3.0 * 0.1)).abs() < 1e-12);
    }

    #[test]
    fn new_validates_knobs() {
        let est = Knob::builtin(KnobKind::NEstimators);
        let lr = Knob::builtin(KnobKind::LearningRate);
        let depth = Knob::builtin(KnobKind::MaxDepth);

        assert!(ParamDomain::new(vec![est.clone(), lr.clone()]).is_err());
        assert!(ParamDomain::new(vec![lr.clone(), est.clone(), depth.clone()]).is_err());
        assert!(
            ParamDomain::new(vec![est.clone(), lr.clone(), lr.clone(), depth.clone()]).is_err()
        );
        assert_eq!(
            ParamDomain::new(vec![est, lr, depth]).unwrap(),
            ParamDomain::standard()
        );
    }

    #[test]
    fn serializes_as_ranges() {
        let json = serde_json::to_string(&ParamDomain::standard()).unwrap();
        assert_eq!(
            json,
            r#"{"n_estimators":[50,100,150,200],"learning_rate":[0.01,0.05,0.1],"max_depth":[2,3,4,5]}"#
        );
    }

    #[test]
    fn is_legal_checks_exact_membership() {
        let domain = ParamDomain::standard();
        assert!(domain.is_legal(&ParameterSet::new(100.0, 0.05, 3.0)));
        assert!(!domain.is_legal(&ParameterSet::new(100.0, 0.051, 3.0)));
    }
}
