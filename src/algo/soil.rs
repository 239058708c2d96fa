//! Soil health score and improvement suggestions.
//!
//! Readings that are absent or unparseable are `NaN`; every comparison with
//! `NaN` is false, so a missing reading never costs points.

use serde::{Deserialize, Serialize};

use crate::algo::parse::RawField;

const BASE_SCORE: i32 = 75;

/// Raw form fields for a soil check.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoilInput {
    pub nitrogen: RawField,
    #[serde(alias = "phosphorus")]
    pub phosphorous: RawField,
    pub potassium: RawField,
    pub ph: RawField,
    pub moisture: RawField,
}

impl SoilInput {
    pub fn from_lookup(mut get: impl FnMut(&str) -> RawField) -> Self {
        Self {
            nitrogen: get("nitrogen"),
            phosphorous: get("phosphorous"),
            potassium: get("potassium"),
            ph: get("ph"),
            moisture: get("moisture"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoilStatus {
    Healthy,
    Moderate,
    Poor,
}

impl SoilStatus {
    fn from_score(score: i32) -> Self {
        if score > 80 {
            Self::Healthy
        } else if score > 60 {
            Self::Moderate
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Moderate => "Moderate",
            Self::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoilReport {
    /// 0–100.
    pub score: i32,
    pub status: SoilStatus,
    pub suggestions: Vec<String>,
}

pub fn analyze_soil(input: &SoilInput) -> SoilReport {
    let ph = input.ph.or_nan();
    let nitrogen = input.nitrogen.or_nan();
    let moisture = input.moisture.or_nan();

    let mut score = BASE_SCORE;
    let mut suggestions = Vec::new();

    if ph < 6.0 {
        score -= 10;
        suggestions.push("Apply lime to increase pH level.".to_string());
    } else if ph > 7.5 {
        score -= 10;
        suggestions.push("Apply sulfur to decrease pH level.".to_string());
    }

    if nitrogen < 20.0 {
        score -= 5;
        suggestions.push("Increase nitrogen levels using organic compost or urea.".to_string());
    }

    if moisture < 30.0 {
        score -= 5;
        suggestions.push("Improve irrigation or use mulch to retain moisture.".to_string());
    }

    if score > 90 {
        suggestions.push("Soil quality is excellent! Maintain current practices.".to_string());
    } else {
        suggestions.push("Monitor nutrient levels regularly for optimal growth.".to_string());
    }

    SoilReport {
        score: score.clamp(0, 100),
        status: SoilStatus::from_score(score),
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ph: f64, nitrogen: f64, moisture: f64) -> SoilInput {
        SoilInput {
            nitrogen: RawField::Number(nitrogen),
            ph: RawField::Number(ph),
            moisture: RawField::Number(moisture),
            ..SoilInput::default()
        }
    }

    #[test]
    fn balanced_soil_keeps_base_score() {
        let report = analyze_soil(&reading(6.5, 40.0, 45.0));
        assert_eq!(report.score, 75);
        assert_eq!(report.status, SoilStatus::Moderate);
        assert_eq!(
            report.suggestions,
            vec!["Monitor nutrient levels regularly for optimal growth."]
        );
    }

    #[test]
    fn acidic_soil_needs_lime() {
        let report = analyze_soil(&reading(5.2, 40.0, 45.0));
        assert_eq!(report.score, 65);
        assert!(report.suggestions[0].contains("lime"));
    }

    #[test]
    fn alkaline_soil_needs_sulfur() {
        let report = analyze_soil(&reading(8.1, 40.0, 45.0));
        assert_eq!(report.score, 65);
        assert!(report.suggestions[0].contains("sulfur"));
    }

    #[test]
    fn every_deduction_is_poor() {
        let report = analyze_soil(&reading(5.0, 10.0, 10.0));
        assert_eq!(report.score, 55);
        assert_eq!(report.status, SoilStatus::Poor);
        assert_eq!(report.suggestions.len(), 4);
    }

    #[test]
    fn boundaries_are_exclusive() {
        let report = analyze_soil(&reading(6.0, 20.0, 30.0));
        assert_eq!(report.score, 75);
        let report = analyze_soil(&reading(7.5, 20.0, 30.0));
        assert_eq!(report.score, 75);
    }

    #[test]
    fn missing_readings_cost_nothing() {
        let report = analyze_soil(&SoilInput::default());
        assert_eq!(report.score, 75);
        assert_eq!(report.suggestions.len(), 1);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(SoilStatus::from_score(81), SoilStatus::Healthy);
        assert_eq!(SoilStatus::from_score(80), SoilStatus::Moderate);
        assert_eq!(SoilStatus::from_score(61), SoilStatus::Moderate);
        assert_eq!(SoilStatus::from_score(60), SoilStatus::Poor);
    }
}
