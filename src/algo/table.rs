use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::algo::matcher::{self, Centroid, Classification, FeatureVector, PenaltyPolicy, WeightMap};
use crate::algo::{crop, fertilizer};
use crate::error::{AgronomyError, Result};

/// On-disk shape of a reference table.
///
/// ```json
/// {
///   "name": "crop",
///   "version": "1",
///   "weights": {"n": 1, "ph": 5},
///   "penalties": {"soil": 100},
///   "centroids": [{"label": "rice", "features": {"n": 79.89, "ph": 6.42}}]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TableDoc {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
    #[serde(default = "default_weight")]
    pub default_weight: f64,
    #[serde(default)]
    pub penalties: BTreeMap<String, f64>,
    pub centroids: Vec<Centroid>,
}

fn default_weight() -> f64 {
    matcher::DEFAULT_WEIGHT
}

/// A validated, immutable reference table with its weighting scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    centroids: Vec<Centroid>,
    weights: WeightMap,
    penalties: Option<PenaltyPolicy>,
}

impl ReferenceTable {
    pub fn from_doc(doc: TableDoc) -> Result<Self> {
        validate(&doc)?;
        let penalties = if doc.penalties.is_empty() {
            None
        } else {
            Some(PenaltyPolicy::new(doc.penalties))
        };
        Ok(Self {
            centroids: doc.centroids,
            weights: WeightMap::new(doc.weights).with_default(doc.default_weight),
            penalties,
        })
    }

    pub fn classify(&self, input: &FeatureVector) -> Result<Classification> {
        matcher::classify(
            input,
            &self.centroids,
            &self.weights,
            self.penalties.as_ref(),
        )
    }

    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    pub fn weights(&self) -> &WeightMap {
        &self.weights
    }

    pub fn penalties(&self) -> Option<&PenaltyPolicy> {
        self.penalties.as_ref()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.centroids.iter().map(|c| c.label.as_str()).collect()
    }

    /// Names of every numeric feature any centroid defines.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .centroids
            .iter()
            .flat_map(|c| c.features.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Names of every categorical tag any centroid declares.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .centroids
            .iter()
            .flat_map(|c| c.tags.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

fn validate(doc: &TableDoc) -> Result<()> {
    let name = &doc.name;
    if doc.centroids.is_empty() {
        return Err(AgronomyError::configuration(format!(
            "table '{name}' has no centroids"
        )));
    }

    let mut seen = HashSet::new();
    for centroid in &doc.centroids {
        let label = &centroid.label;
        if label.trim().is_empty() {
            return Err(AgronomyError::configuration(format!(
                "table '{name}' has a centroid with an empty label"
            )));
        }
        if !seen.insert(label.as_str()) {
            return Err(AgronomyError::configuration(format!(
                "table '{name}' has duplicate label '{label}'"
            )));
        }
        if centroid.features.is_empty() {
            return Err(AgronomyError::configuration(format!(
                "centroid '{label}' defines no features"
            )));
        }
        if let Some((feature, _)) = centroid.features.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AgronomyError::configuration(format!(
                "centroid '{label}' has a non-finite value for '{feature}'"
            )));
        }
    }

    let bad_multiplier = |v: f64| !v.is_finite() || v < 0.0;
    if let Some((feature, w)) = doc.weights.iter().find(|(_, v)| bad_multiplier(**v)) {
        return Err(AgronomyError::configuration(format!(
            "weight for '{feature}' must be a non-negative number, got {w}"
        )));
    }
    if bad_multiplier(doc.default_weight) {
        return Err(AgronomyError::configuration(format!(
            "default weight must be a non-negative number, got {}",
            doc.default_weight
        )));
    }
    if let Some((tag, p)) = doc.penalties.iter().find(|(_, v)| bad_multiplier(**v)) {
        return Err(AgronomyError::configuration(format!(
            "penalty for '{tag}' must be a non-negative number, got {p}"
        )));
    }

    Ok(())
}

/// Parse and validate a table from a JSON string.
pub fn parse_table(json: &str) -> Result<ReferenceTable> {
    let doc: TableDoc = serde_json::from_str(json)
        .map_err(|e| AgronomyError::configuration(format!("failed to parse table: {e}")))?;
    ReferenceTable::from_doc(doc)
}

/// Parse and validate a table from an already-decoded JSON value.
pub fn table_from_value(value: &serde_json::Value) -> Result<ReferenceTable> {
    let doc = TableDoc::deserialize(value)
        .map_err(|e| AgronomyError::configuration(format!("failed to parse table: {e}")))?;
    ReferenceTable::from_doc(doc)
}

/// Load a table from a file path.
pub fn load_table(path: &str) -> Result<ReferenceTable> {
    let json =
        std::fs::read_to_string(path).map_err(|e| AgronomyError::table_read(path, e.to_string()))?;
    parse_table(&json)
}

/// Names accepted by [`builtin_table`].
pub fn builtin_names() -> &'static [&'static str] {
    &["crop", "fertilizer"]
}

fn unknown_builtin(name: &str) -> AgronomyError {
    AgronomyError::invalid_input(format!(
        "Unknown table '{name}'. Use: {}",
        builtin_names().join(", ")
    ))
}

/// One of the compiled-in tables by name.
pub fn builtin_table(name: &str) -> Result<&'static ReferenceTable> {
    match name.to_lowercase().as_str() {
        "crop" | "crops" => crop::crop_table(),
        "fertilizer" | "fertilizers" => fertilizer::fertilizer_table(),
        _ => Err(unknown_builtin(name)),
    }
}

/// Source JSON of a compiled-in table. Fails if the table does not validate.
pub fn builtin_json(name: &str) -> Result<&'static str> {
    let json = match name.to_lowercase().as_str() {
        "crop" | "crops" => crop::crop_table_json(),
        "fertilizer" | "fertilizers" => fertilizer::fertilizer_table_json(),
        _ => return Err(unknown_builtin(name)),
    };
    builtin_table(name)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "name": "small",
        "version": "1",
        "weights": {"f": 2},
        "penalties": {"soil": 50},
        "centroids": [
            {"label": "low", "features": {"f": 0}},
            {"label": "high", "features": {"f": 10}, "tags": {"soil": "Red"}}
        ]
    }"#;

    #[test]
    fn parses_and_classifies() {
        let table = parse_table(SMALL).unwrap();
        assert_eq!(table.labels(), vec!["low", "high"]);
        assert_eq!(table.weights().weight("f"), 2.0);
        assert_eq!(table.penalties().unwrap().penalty("soil"), 50.0);

        // low: 2·64 = 128; high: 2·4 + 50 = 58
        let input = FeatureVector::new().with("f", 8.0);
        assert_eq!(table.classify(&input).unwrap().label, "high");
    }

    #[test]
    fn default_weight_is_one_when_omitted() {
        let table =
            parse_table(r#"{"name":"t","centroids":[{"label":"a","features":{"x":1}}]}"#).unwrap();
        assert_eq!(table.weights().weight("x"), 1.0);
        assert!(table.penalties().is_none());
    }

    #[test]
    fn empty_table_rejected() {
        let err = parse_table(r#"{"name":"t","centroids":[]}"#).unwrap_err();
        assert!(matches!(err, AgronomyError::Configuration { .. }));
    }

    #[test]
    fn duplicate_labels_rejected() {
        let json = r#"{"name":"t","centroids":[
            {"label":"a","features":{"x":1}},
            {"label":"a","features":{"x":2}}
        ]}"#;
        let err = parse_table(json).unwrap_err();
        assert!(err.to_string().contains("duplicate label 'a'"));
    }

    #[test]
    fn negative_weight_rejected() {
        let json = r#"{"name":"t","weights":{"x":-1},"centroids":[{"label":"a","features":{"x":1}}]}"#;
        assert!(matches!(
            parse_table(json).unwrap_err(),
            AgronomyError::Configuration { .. }
        ));
    }

    #[test]
    fn featureless_centroid_rejected() {
        let json = r#"{"name":"t","centroids":[{"label":"a","features":{}}]}"#;
        assert!(parse_table(json).is_err());
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        assert!(matches!(
            parse_table("{not json").unwrap_err(),
            AgronomyError::Configuration { .. }
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_table("/nonexistent/agronomy/table.json").unwrap_err();
        assert!(matches!(err, AgronomyError::TableRead { .. }));
    }

    #[test]
    fn builtin_json_reparses_to_builtin_table() {
        for name in builtin_names() {
            let json = builtin_json(name).unwrap();
            assert_eq!(&parse_table(json).unwrap(), builtin_table(name).unwrap());
        }
        assert!(builtin_json("Crops").unwrap().contains("\"rice\""));
        assert!(matches!(
            builtin_json("soil").unwrap_err(),
            AgronomyError::InvalidInput { .. }
        ));
    }

    #[test]
    fn builtin_lookup() {
        assert_eq!(builtin_table("crop").unwrap().centroids().len(), 22);
        assert_eq!(builtin_table("Fertilizer").unwrap().centroids().len(), 7);
        assert!(builtin_table("soil").is_err());
    }

    #[test]
    fn feature_and_tag_names() {
        let table = builtin_table("fertilizer").unwrap();
        assert_eq!(
            table.feature_names(),
            vec!["hum", "k", "moist", "n", "p", "temp"]
        );
        assert_eq!(table.tag_names(), vec!["crop", "soil"]);
    }
}
