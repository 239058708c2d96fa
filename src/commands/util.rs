use nu_protocol::{LabeledError, PipelineData, Record, Span, Value};

use crate::algo::matcher::Classification;
use crate::algo::parse::RawField;
use crate::error::{AgronomyError, Result};

/// Normalize any PipelineData into a Vec<Value> of records.
///
/// Handles:
///   - Table (list of records) → pass through
///   - Single record → [record]
///   - List of non-records → [{value: v1}, {value: v2}, ...]
///   - Single non-record → [{value: v}]
///   - Empty/Nothing → []
pub fn normalize_input(input: PipelineData, span: Span) -> Vec<Value> {
    match input {
        PipelineData::Value(value, _) => normalize_value(value, span),
        other => {
            let values: Vec<Value> = other.into_iter().collect();
            if matches!(values.first(), Some(Value::Record { .. }) | None) {
                values
            } else {
                values.into_iter().map(|v| wrap_value(v, span)).collect()
            }
        }
    }
}

fn normalize_value(value: Value, span: Span) -> Vec<Value> {
    match value {
        Value::List { vals, .. } => {
            if matches!(vals.first(), Some(Value::Record { .. }) | None) {
                vals
            } else {
                vals.into_iter().map(|v| wrap_value(v, span)).collect()
            }
        }
        Value::Record { .. } => vec![value],
        Value::Nothing { .. } => vec![],
        other => vec![wrap_value(other, span)],
    }
}

fn wrap_value(v: Value, span: Span) -> Value {
    let mut record = Record::new();
    record.push("value", v);
    Value::record(record, span)
}

/// Append multiple columns to a record Value. Non-records get wrapped first.
pub fn append_columns(row: Value, cols: Vec<(&str, Value)>, span: Span) -> Value {
    let mut record = match row {
        Value::Record { val, .. } => val.into_owned(),
        other => {
            let mut record = Record::new();
            record.push("value", other);
            record
        }
    };
    for (name, value) in cols {
        record.push(name, value);
    }
    Value::record(record, span)
}

/// Read one column of a row as a raw form field.
///
/// Ints and floats are numbers, strings stay text for lenient parsing,
/// everything else (including a missing column) is `Missing`.
pub fn raw_field(row: &Value, key: &str) -> RawField {
    match row.get_data_by_key(key) {
        Some(Value::Int { val, .. }) => RawField::Number(val as f64),
        Some(Value::Float { val, .. }) => RawField::Number(val),
        Some(Value::String { val, .. }) => RawField::Text(val),
        _ => RawField::Missing,
    }
}

/// `NaN` distances become `nothing`.
pub fn distance_value(distance: f64, span: Span) -> Value {
    if distance.is_nan() {
        Value::nothing(span)
    } else {
        Value::float(distance, span)
    }
}

/// Result columns for one classified row: `<column>` and `_distance`, plus
/// `_error` when the row could not be scored.
pub fn classification_columns(
    column: &'static str,
    result: Result<Classification>,
    span: Span,
) -> Vec<(&'static str, Value)> {
    match result {
        Ok(c) => vec![
            (column, Value::string(c.label, span)),
            ("_distance", distance_value(c.distance, span)),
        ],
        Err(e) => vec![
            (column, Value::nothing(span)),
            ("_distance", Value::nothing(span)),
            ("_error", Value::string(e.to_string(), span)),
        ],
    }
}

pub fn labeled(e: AgronomyError) -> LabeledError {
    LabeledError::new(e.to_string())
}
