//! Crop recommendation over 22 soil/climate centroids.
//!
//! Readings that are absent or unparseable become `NaN`. Every crop centroid
//! defines all seven features, so a single `NaN` reading makes every
//! candidate distance `NaN` and the first table entry wins.

use std::sync::OnceLock;

use serde::Deserialize;
use tracing::warn;

use crate::algo::matcher::{Classification, FeatureVector};
use crate::algo::parse::RawField;
use crate::algo::table::{parse_table, ReferenceTable};
use crate::error::{AgronomyError, Result};

/// Embedded crop table, compiled from `tables/crop.json`.
const EMBEDDED_TABLE: &str = include_str!("../../tables/crop.json");

/// Raw form fields for a crop recommendation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CropInput {
    pub nitrogen: RawField,
    #[serde(alias = "phosphorus")]
    pub phosphorous: RawField,
    pub potassium: RawField,
    pub temperature: RawField,
    pub humidity: RawField,
    pub ph: RawField,
    pub rainfall: RawField,
}

impl CropInput {
    /// Build from any keyed source, e.g. a Nushell record.
    pub fn from_lookup(mut get: impl FnMut(&str) -> RawField) -> Self {
        Self {
            nitrogen: get("nitrogen"),
            phosphorous: get("phosphorous"),
            potassium: get("potassium"),
            temperature: get("temperature"),
            humidity: get("humidity"),
            ph: get("ph"),
            rainfall: get("rainfall"),
        }
    }

    fn readings(&self) -> [(&'static str, &'static str, &RawField); 7] {
        [
            ("n", "nitrogen", &self.nitrogen),
            ("p", "phosphorous", &self.phosphorous),
            ("k", "potassium", &self.potassium),
            ("temp", "temperature", &self.temperature),
            ("hum", "humidity", &self.humidity),
            ("ph", "ph", &self.ph),
            ("rain", "rainfall", &self.rainfall),
        ]
    }

    /// Feature vector with unparseable readings as `NaN`.
    pub fn features(&self) -> FeatureVector {
        self.readings()
            .into_iter()
            .fold(FeatureVector::new(), |fv, (key, _, raw)| {
                fv.with(key, raw.or_nan())
            })
    }

    /// Form field names whose value did not parse.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.readings()
            .into_iter()
            .filter(|(_, _, raw)| raw.parse().is_none())
            .map(|(_, field, _)| field)
            .collect()
    }
}

/// The embedded crop table, validated on first use.
pub fn crop_table() -> Result<&'static ReferenceTable> {
    static TABLE: OnceLock<Result<ReferenceTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| parse_table(EMBEDDED_TABLE))
        .as_ref()
        .map_err(AgronomyError::clone)
}

/// The embedded crop table as JSON, for export.
pub fn crop_table_json() -> &'static str {
    EMBEDDED_TABLE
}

/// Uppercase the first character, lowercase the rest.
pub fn display_label(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Recommend a crop. The label is display-capitalized (`"rice"` → `"Rice"`).
pub fn recommend_crop(input: &CropInput) -> Result<Classification> {
    let table = crop_table()?;

    let missing = input.missing_fields();
    if !missing.is_empty() && missing.len() < 7 {
        warn!(
            fields = ?missing,
            "crop readings missing; every candidate distance is NaN"
        );
    }

    let mut result = table.classify(&input.features())?;
    result.label = display_label(&result.label);
    Ok(result)
}
