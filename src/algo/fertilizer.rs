//! Fertilizer recommendation from NPK, environment readings, soil and crop.
//!
//! Unlike the crop recommender, absent or unparseable readings count as a
//! literal `0`, which pulls the match toward centroids with low values.
//! Four centroids carry soil/crop tags; each mismatch adds 100.

use std::sync::OnceLock;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::algo::matcher::{Classification, FeatureVector};
use crate::algo::parse::RawField;
use crate::algo::string_distance::{closest_match, SUGGESTION_THRESHOLD};
use crate::algo::table::{parse_table, ReferenceTable};
use crate::error::{AgronomyError, Result};

/// Embedded fertilizer table, compiled from `tables/fertilizer.json`.
const EMBEDDED_TABLE: &str = include_str!("../../tables/fertilizer.json");

/// Soil types offered by the fertilizer form.
pub const SOIL_TYPES: &[&str] = &["Sandy", "Loamy", "Black", "Red", "Clayey"];

/// Crop types offered by the fertilizer form.
pub const CROP_TYPES: &[&str] = &[
    "Maize",
    "Sugarcane",
    "Cotton",
    "Tobacco",
    "Paddy",
    "Barley",
    "Wheat",
    "Millets",
    "Oil seeds",
    "Pulses",
    "Ground Nuts",
];

/// Raw form fields for a fertilizer recommendation.
///
/// JSON records are read through [`FertilizerInput::from_lookup`], so a
/// record and a Nushell row with the same keys produce the same input.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct FertilizerInput {
    pub nitrogen: RawField,
    pub phosphorous: RawField,
    pub potassium: RawField,
    pub temperature: RawField,
    pub humidity: RawField,
    pub moisture: RawField,
    pub soil_type: Option<String>,
    pub crop_type: Option<String>,
}

impl FertilizerInput {
    /// Build from any keyed source.
    ///
    /// `phosphorus`, `soil_type` and `crop_type` are read when the preferred
    /// key (`phosphorous`, `soilType`, `cropType`) is missing. A numeric
    /// category becomes its text form.
    pub fn from_lookup(mut get: impl FnMut(&str) -> RawField) -> Self {
        Self {
            nitrogen: get("nitrogen"),
            phosphorous: either(&mut get, "phosphorous", "phosphorus"),
            potassium: get("potassium"),
            temperature: get("temperature"),
            humidity: get("humidity"),
            moisture: get("moisture"),
            soil_type: either(&mut get, "soilType", "soil_type").into_text(),
            crop_type: either(&mut get, "cropType", "crop_type").into_text(),
        }
    }

    /// Feature vector with unparseable readings as `0`.
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new()
            .with("n", self.nitrogen.or_zero())
            .with("p", self.phosphorous.or_zero())
            .with("k", self.potassium.or_zero())
            .with("temp", self.temperature.or_zero())
            .with("hum", self.humidity.or_zero())
            .with("moist", self.moisture.or_zero())
            .with_category("soil", self.soil_type.as_deref())
            .with_category("crop", self.crop_type.as_deref())
    }
}

fn either(get: &mut impl FnMut(&str) -> RawField, preferred: &str, fallback: &str) -> RawField {
    match get(preferred) {
        RawField::Missing => get(fallback),
        found => found,
    }
}

impl TryFrom<Value> for FertilizerInput {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let Value::Object(record) = value else {
            return Err(format!("expected a record, got {value}"));
        };
        Ok(Self::from_lookup(|key| {
            record.get(key).cloned().map(RawField::from).unwrap_or_default()
        }))
    }
}

/// The embedded fertilizer table, validated on first use.
pub fn fertilizer_table() -> Result<&'static ReferenceTable> {
    static TABLE: OnceLock<Result<ReferenceTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| parse_table(EMBEDDED_TABLE))
        .as_ref()
        .map_err(AgronomyError::clone)
}

/// The embedded fertilizer table as JSON, for export.
pub fn fertilizer_table_json() -> &'static str {
    EMBEDDED_TABLE
}

fn warn_if_unknown(kind: &str, value: Option<&str>, known: &[&str]) {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return;
    };
    if known.contains(&value) {
        return;
    }
    match closest_match(value, known, SUGGESTION_THRESHOLD) {
        Some(suggestion) => warn!(%kind, %value, %suggestion, "unknown category, closest known value suggested"),
        None => warn!(%kind, %value, "unknown category"),
    }
}

/// Recommend a fertilizer. The label is returned as stored in the table.
pub fn recommend_fertilizer(input: &FertilizerInput) -> Result<Classification> {
    let table = fertilizer_table()?;
    warn_if_unknown("soil", input.soil_type.as_deref(), SOIL_TYPES);
    warn_if_unknown("crop", input.crop_type.as_deref(), CROP_TYPES);
    table.classify(&input.features())
}
