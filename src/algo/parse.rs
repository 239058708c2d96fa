//! Coercion of loosely-typed form values into numbers.
//!
//! Form inputs arrive as JSON numbers, numeric strings, empty strings or
//! not at all. Each call site decides what an unparseable field becomes:
//! the crop recommender uses `NaN`, the fertilizer recommender uses `0`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// A scalar as received from a form or a JSON record.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub enum RawField {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(RawField::Number).unwrap_or_default(),
            Value::String(s) => RawField::Text(s),
            _ => RawField::Missing,
        }
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

impl From<Option<String>> for RawField {
    fn from(value: Option<String>) -> Self {
        value.map(RawField::Text).unwrap_or_default()
    }
}

impl RawField {
    /// The numeric value, or `None` when the field is absent or unparseable.
    pub fn parse(&self) -> Option<f64> {
        match self {
            RawField::Missing => None,
            RawField::Number(n) => Some(*n),
            RawField::Text(s) => parse_lenient(s),
        }
    }

    pub fn or_nan(&self) -> f64 {
        self.parse().unwrap_or(f64::NAN)
    }

    pub fn or_zero(&self) -> f64 {
        self.parse().unwrap_or(0.0)
    }

    /// The field as a category name. Numbers print in their shortest form (`3`, `2.5`).
    pub fn into_text(self) -> Option<String> {
        match self {
            RawField::Missing => None,
            RawField::Number(n) => Some(n.to_string()),
            RawField::Text(s) => Some(s),
        }
    }
}

fn numeric_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("numeric prefix pattern is valid")
    })
}

/// Parse the longest numeric prefix of `s` after leading whitespace.
///
/// `"6.5 pH"` parses as `6.5`; `"abc"` and `""` do not parse.
pub fn parse_lenient(s: &str) -> Option<f64> {
    let m = numeric_prefix().find(s.trim_start())?;
    m.as_str().parse::<f64>().ok()
}
