//! Weighted-distance nearest-centroid matching.
//!
//! Distance to a centroid is
//!
//! ```text
//! Σ weight[f] · (input[f] − centroid[f])²   over numeric features the centroid defines
//! + Σ penalty[g]                            over declared tags the input does not match
//! ```
//!
//! Features the centroid does not define are skipped. Candidates are scanned
//! in table order with a strict less-than, so the first of several equally
//! distant centroids wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{AgronomyError, Result};

/// Weight applied to a centroid feature that has no entry in the weight map.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A labeled reference point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub label: String,
    pub features: BTreeMap<String, f64>,
    /// Categorical values an input must share to avoid a penalty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Centroid {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            features: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(name.into(), value.into());
        self
    }
}

/// The query point: numeric readings plus optional categorical values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    pub numeric: BTreeMap<String, f64>,
    pub categorical: BTreeMap<String, String>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.numeric.insert(name.into(), value);
        self
    }

    /// Set a categorical value; `None` leaves it unset.
    pub fn with_category(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.categorical.insert(name.into(), v.to_string());
        }
        self
    }

    /// Numeric value of `name`; absent features read as `NaN`.
    pub fn value(&self, name: &str) -> f64 {
        self.numeric.get(name).copied().unwrap_or(f64::NAN)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        self.categorical.get(name).map(String::as_str)
    }

}

/// Per-feature multipliers shared by every comparison of one classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMap {
    weights: BTreeMap<String, f64>,
    default_weight: f64,
}

impl WeightMap {
    pub fn new(weights: BTreeMap<String, f64>) -> Self {
        Self {
            weights,
            default_weight: DEFAULT_WEIGHT,
        }
    }

    pub fn with_default(mut self, default_weight: f64) -> Self {
        self.default_weight = default_weight;
        self
    }

    pub fn weight(&self, feature: &str) -> f64 {
        self.weights
            .get(feature)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

impl<const N: usize> From<[(&str, f64); N]> for WeightMap {
    fn from(pairs: [(&str, f64); N]) -> Self {
        Self::new(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

/// Additive cost per mismatched categorical tag. Tags without an entry cost nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenaltyPolicy {
    penalties: BTreeMap<String, f64>,
}

impl PenaltyPolicy {
    pub fn new(penalties: BTreeMap<String, f64>) -> Self {
        Self { penalties }
    }

    pub fn penalty(&self, tag: &str) -> f64 {
        self.penalties.get(tag).copied().unwrap_or(0.0)
    }
}

impl<const N: usize> From<[(&str, f64); N]> for PenaltyPolicy {
    fn from(pairs: [(&str, f64); N]) -> Self {
        Self::new(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

/// The winning centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    /// May be `NaN` when the input carried `NaN` readings.
    pub distance: f64,
    /// Position of the winner in the table.
    pub index: usize,
}

/// Weighted squared distance from `input` to `centroid`, plus tag penalties.
/// Zero-weight features contribute nothing, whatever the input holds.
pub fn distance(
    input: &FeatureVector,
    centroid: &Centroid,
    weights: &WeightMap,
    penalties: Option<&PenaltyPolicy>,
) -> f64 {
    let numeric: f64 = centroid
        .features
        .iter()
        .filter_map(|(name, &c)| {
            let w = weights.weight(name);
            (w != 0.0).then(|| w * (input.value(name) - c).powi(2))
        })
        .sum();

    let categorical: f64 = match penalties {
        Some(policy) => centroid
            .tags
            .iter()
            .filter(|(_, tag)| !tag.is_empty())
            .filter(|(name, tag)| input.category(name) != Some(tag.as_str()))
            .map(|(name, _)| policy.penalty(name))
            .sum(),
        None => 0.0,
    };

    numeric + categorical
}

/// `NaN` ranks behind every number; otherwise strictly smaller wins.
fn is_closer(candidate: f64, best: f64) -> bool {
    candidate < best || (best.is_nan() && !candidate.is_nan())
}

/// Return the centroid of `table` nearest to `input`.
///
/// Fails with [`AgronomyError::Configuration`] on an empty table and with
/// [`AgronomyError::InvalidInput`] when the input has no value for any
/// feature the table's centroids define.
pub fn classify(
    input: &FeatureVector,
    table: &[Centroid],
    weights: &WeightMap,
    penalties: Option<&PenaltyPolicy>,
) -> Result<Classification> {
    let (first, rest) = table
        .split_first()
        .ok_or_else(|| AgronomyError::configuration("reference table has no centroids"))?;

    let covered = table
        .iter()
        .flat_map(|c| c.features.keys())
        .any(|name| !input.value(name).is_nan());
    if !covered {
        return Err(AgronomyError::invalid_input(
            "every numeric feature is missing or unparseable",
        ));
    }

    let mut best_index = 0;
    let mut best_distance = distance(input, first, weights, penalties);
    trace!(label = %first.label, distance = best_distance, "candidate");

    for (offset, centroid) in rest.iter().enumerate() {
        let d = distance(input, centroid, weights, penalties);
        trace!(label = %centroid.label, distance = d, "candidate");
        if is_closer(d, best_distance) {
            best_index = offset + 1;
            best_distance = d;
        }
    }

    let label = table[best_index].label.clone();
    debug!(%label, distance = best_distance, "nearest centroid");

    Ok(Classification {
        label,
        distance: best_distance,
        index: best_index,
    })
}
