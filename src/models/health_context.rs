use serde::{Deserialize, Serialize};

use super::enums::{AgeGroup, SymptomDuration, SymptomFrequency};
use crate::triage::types::TriageError;

/// Patient-reported intake for one assessment. Read-only to the triage engine.
///
/// Every field except `primary_symptom` may be absent. Missing fields
/// contribute nothing to the urgency score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthContext {
    pub primary_symptom: String,
    pub associated_symptoms: Vec<String>,
    pub additional_notes: Option<String>,
    /// Ordinal 1-10.
    pub severity: Option<u8>,
    pub duration: Option<SymptomDuration>,
    pub frequency: Option<SymptomFrequency>,
    pub chronic_conditions: Vec<String>,
    pub risk_factors: Vec<String>,
    pub age_group: Option<AgeGroup>,
    /// Age in years. Fractional for infants (0.25 = 3 months).
    pub age_in_years: Option<f64>,
    /// Age in months, used only when `age_in_years` is absent.
    pub age_in_months: Option<f64>,
    /// Explicit pregnancy flag. The condition and risk-factor lists are
    /// also scanned for pregnancy keywords.
    pub pregnant: bool,
}

impl HealthContext {
    pub fn new(primary_symptom: impl Into<String>) -> Self {
        Self {
            primary_symptom: primary_symptom.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TriageError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Age normalized to years, whichever unit the caller supplied.
    pub fn age_years(&self) -> Option<f64> {
        self.age_in_years
            .or_else(|| self.age_in_months.map(|m| m / 12.0))
            .filter(|age| age.is_finite() && *age >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let ctx = HealthContext::from_json(r#"{"primary_symptom": "headache"}"#).unwrap();
        assert_eq!(ctx.primary_symptom, "headache");
        assert!(ctx.associated_symptoms.is_empty());
        assert_eq!(ctx.severity, None);
        assert!(!ctx.pregnant);
    }

    #[test]
    fn full_json_parses_wire_enums() {
        let json = r#"{
            "primary_symptom": "cough",
            "associated_symptoms": ["fever"],
            "severity": 6,
            "duration": "1_2_weeks",
            "frequency": "constant",
            "age_group": "senior",
            "age_in_years": 71
        }"#;
        let ctx = HealthContext::from_json(json).unwrap();
        assert_eq!(ctx.duration, Some(SymptomDuration::OneToTwoWeeks));
        assert_eq!(ctx.frequency, Some(SymptomFrequency::Constant));
        assert_eq!(ctx.age_group, Some(AgeGroup::Senior));
        assert_eq!(ctx.age_years(), Some(71.0));
    }

    #[test]
    fn unknown_duration_is_a_decode_error() {
        let err = HealthContext::from_json(r#"{"primary_symptom": "x", "duration": "forever"}"#)
            .unwrap_err();
        assert!(matches!(err, TriageError::Json(_)));
    }

    #[test]
    fn months_convert_to_years() {
        let ctx = HealthContext {
            age_in_months: Some(3.0),
            ..HealthContext::new("fever")
        };
        assert_eq!(ctx.age_years(), Some(0.25));
    }

    #[test]
    fn years_take_precedence_over_months() {
        let ctx = HealthContext {
            age_in_years: Some(2.0),
            age_in_months: Some(3.0),
            ..HealthContext::new("fever")
        };
        assert_eq!(ctx.age_years(), Some(2.0));
    }

    #[test]
    fn negative_age_is_ignored() {
        let ctx = HealthContext {
            age_in_years: Some(-1.0),
            ..HealthContext::new("fever")
        };
        assert_eq!(ctx.age_years(), None);
    }
}
