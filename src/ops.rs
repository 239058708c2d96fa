//! Shared operation wrappers for all interfaces (CLI, MCP, plugin).
//!
//! Each `op_*` function is a pure, synchronous wrapper around one or more
//! `algo` modules. Input and output are `serde_json::Value`, with no
//! dependency on rmcp, clap, or nu-plugin.
//!
//! Batch ops append `_`-prefixed result columns to every input record. A
//! record that cannot be scored gets an `_error` column instead of failing
//! the batch; a broken reference table fails the whole call.

use std::borrow::Cow;

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::algo::matcher::{Classification, FeatureVector};
use crate::algo::parse::RawField;
use crate::algo::table::{self, ReferenceTable};
use crate::algo::{crop, fertilizer, price, soil, weather};
use crate::error::{AgronomyError, Result};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Read one record into a typed input.
pub fn parse_row<T: DeserializeOwned>(row: &Value) -> Result<T> {
    T::deserialize(row)
        .map_err(|e| AgronomyError::invalid_input(format!("malformed record: {e}")))
}

/// Append columns to a record. Non-objects get wrapped as `{value: ...}` first.
pub fn append_columns(row: &Value, cols: Vec<(&str, Value)>) -> Value {
    let mut row = match row {
        Value::Object(_) => row.clone(),
        other => json!({ "value": other }),
    };
    if let Some(obj) = row.as_object_mut() {
        for (name, value) in cols {
            obj.insert(name.into(), value);
        }
    }
    row
}

fn classification_columns(
    column: &'static str,
    result: Result<Classification>,
) -> Vec<(&'static str, Value)> {
    match result {
        Ok(c) => vec![
            (column, Value::String(c.label)),
            ("_distance", json!(c.distance)),
        ],
        Err(e) => vec![
            (column, Value::Null),
            ("_distance", Value::Null),
            ("_error", Value::String(e.to_string())),
        ],
    }
}

fn recommend_rows<T, F>(rows: &[Value], column: &'static str, recommend: F) -> Value
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<Classification> + Sync,
{
    let output: Vec<Value> = rows
        .par_iter()
        .map(|row| {
            let result = parse_row::<T>(row).and_then(|input| recommend(&input));
            append_columns(row, classification_columns(column, result))
        })
        .collect();
    Value::Array(output)
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Append `_crop` and `_distance` to every record.
pub fn op_crop(rows: &[Value]) -> Result<Value> {
    crop::crop_table()?;
    Ok(recommend_rows::<crop::CropInput, _>(
        rows,
        "_crop",
        crop::recommend_crop,
    ))
}

/// Append `_fertilizer` and `_distance` to every record.
pub fn op_fertilizer(rows: &[Value]) -> Result<Value> {
    fertilizer::fertilizer_table()?;
    Ok(recommend_rows::<fertilizer::FertilizerInput, _>(
        rows,
        "_fertilizer",
        fertilizer::recommend_fertilizer,
    ))
}

/// Append `_soil_score`, `_soil_status` and `_suggestions` to every record.
pub fn op_soil(rows: &[Value]) -> Value {
    let output: Vec<Value> = rows
        .par_iter()
        .map(|row| {
            let cols = match parse_row::<soil::SoilInput>(row) {
                Ok(input) => {
                    let report = soil::analyze_soil(&input);
                    vec![
                        ("_soil_score", json!(report.score)),
                        ("_soil_status", json!(report.status.as_str())),
                        ("_suggestions", json!(report.suggestions)),
                    ]
                }
                Err(e) => vec![("_error", Value::String(e.to_string()))],
            };
            append_columns(row, cols)
        })
        .collect();
    Value::Array(output)
}

/// Price outlook for one crop. Unknown crops report `"N/A"`.
pub fn op_price(crop: &str) -> Value {
    match price::price_outlook(crop) {
        Some(outlook) => json!(outlook),
        None => {
            let mut out = json!({
                "crop": crop,
                "current": "N/A",
                "trend": "Unknown",
                "forecast": [],
            });
            if let Some(suggestion) = price::suggest_crop(crop) {
                out["suggestion"] = json!(suggestion);
            }
            out
        }
    }
}

/// Every crop with a price outlook.
pub fn op_price_all() -> Value {
    let all: Vec<Value> = price::known_crops()
        .into_iter()
        .map(op_price)
        .collect();
    Value::Array(all)
}

pub fn op_weather_code(code: i64) -> Value {
    json!({ "code": code, "description": weather::describe_wmo_code(code) })
}

/// Pick a reference table: inline JSON, then a file path, then a builtin name.
pub fn resolve_table(
    inline: Option<&Value>,
    path: Option<&str>,
    builtin: Option<&str>,
) -> Result<Cow<'static, ReferenceTable>> {
    if let Some(value) = inline {
        return table::table_from_value(value).map(Cow::Owned);
    }
    if let Some(path) = path {
        return table::load_table(path).map(Cow::Owned);
    }
    match builtin {
        Some(name) => table::builtin_table(name).map(Cow::Borrowed),
        None => Err(AgronomyError::invalid_input(
            "a table is required: pass an inline table, a table path, or a builtin name",
        )),
    }
}

/// Feature vector for a generic table: every feature the table uses is read
/// from the record by name (unparseable → `NaN`), every tag as a string.
pub fn features_for_table(row: &Value, table: &ReferenceTable) -> FeatureVector {
    let numeric = table.feature_names().into_iter().fold(FeatureVector::new(), |fv, name| {
        let raw = row.get(name).cloned().map(RawField::from).unwrap_or_default();
        fv.with(name, raw.or_nan())
    });
    table.tag_names().into_iter().fold(numeric, |fv, name| {
        fv.with_category(name, row.get(name).and_then(Value::as_str))
    })
}

/// Append `_label` and `_distance` using an arbitrary reference table.
pub fn op_classify(rows: &[Value], table: &ReferenceTable) -> Value {
    let output: Vec<Value> = rows
        .par_iter()
        .map(|row| {
            let result = table.classify(&features_for_table(row, table));
            append_columns(row, classification_columns("_label", result))
        })
        .collect();
    Value::Array(output)
}

/// A builtin table as the JSON document it was compiled from.
pub fn op_table(name: &str) -> Result<Value> {
    let json = table::builtin_json(name)?;
    serde_json::from_str(json)
        .map_err(|e| AgronomyError::configuration(format!("failed to parse table: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_wraps_scalars() {
        let out = append_columns(&json!(5), vec![("_x", json!(1))]);
        assert_eq!(out, json!({"value": 5, "_x": 1}));
    }

    #[test]
    fn nan_distance_serializes_as_null() {
        let cols = classification_columns(
            "_crop",
            Ok(Classification {
                label: "Rice".into(),
                distance: f64::NAN,
                index: 0,
            }),
        );
        assert_eq!(cols[1].1, Value::Null);
    }

    #[test]
    fn resolve_requires_a_source() {
        assert!(resolve_table(None, None, None).is_err());
        assert!(matches!(
            resolve_table(None, None, Some("crop")).unwrap(),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn features_for_table_reads_by_name() {
        let table = table::builtin_table("fertilizer").unwrap();
        let fv = features_for_table(
            &json!({"n": "12", "p": 36, "soil": "Loamy", "crop": 7}),
            table,
        );
        assert_eq!(fv.value("n"), 12.0);
        assert_eq!(fv.value("p"), 36.0);
        assert!(fv.value("k").is_nan());
        assert_eq!(fv.category("soil"), Some("Loamy"));
        assert_eq!(fv.category("crop"), None);
    }
}
