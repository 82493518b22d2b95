use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregator::assess_urgency_with;
use super::crisis::{classify_crisis_all, crisis_resources};
use super::matcher::SymptomMatcher;
use super::rules::RuleCatalog;
use super::types::SafetyAssessment;
use crate::models::enums::{CrisisType, UrgencyLevel};
use crate::models::health_context::HealthContext;

/// Assess patient-reported symptoms.
///
/// Neither call can fail: malformed or missing fields contribute nothing to
/// the score.
pub trait TriageService {
    /// Urgency only.
    fn assess(&self, ctx: &HealthContext) -> SafetyAssessment;

    /// Urgency plus crisis classification and display gating.
    fn evaluate(&self, ctx: &HealthContext) -> TriageReport;
}

/// What the presentation layer may or must show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceGate {
    pub show_emergency_messaging: bool,
    pub suppress_self_care_guidance: bool,
    /// Set for every detected crisis, whatever the urgency.
    pub show_crisis_resources: bool,
}

impl GuidanceGate {
    pub fn for_outcome(urgency: UrgencyLevel, crisis_type: CrisisType) -> Self {
        let in_crisis = crisis_type != CrisisType::None;
        Self {
            show_emergency_messaging: urgency.shows_emergency_messaging(),
            suppress_self_care_guidance: urgency.suppresses_self_care_guidance() || in_crisis,
            show_crisis_resources: in_crisis,
        }
    }
}

/// Full triage outcome for one `HealthContext`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub assessment: SafetyAssessment,
    /// Patient-facing wording of `assessment.urgency`.
    pub urgency_label: String,
    pub crisis_type: CrisisType,
    /// Fixed resource text, present whenever a crisis was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_resources: Option<String>,
    pub guidance: GuidanceGate,
    pub catalog_version: String,
    pub assessed_at: DateTime<Utc>,
}

/// The production triage engine.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    catalog: Arc<RuleCatalog>,
}

impl TriageEngine {
    pub fn new() -> Self {
        Self::with_catalog(RuleCatalog::standard().clone())
    }

    /// Engine over a custom (usually extended) catalog.
    pub fn with_catalog(catalog: RuleCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    fn matcher(&self) -> SymptomMatcher<'_> {
        SymptomMatcher::new(&self.catalog)
    }
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TriageService for TriageEngine {
    fn assess(&self, ctx: &HealthContext) -> SafetyAssessment {
        assess_urgency_with(&self.matcher(), ctx)
    }

    fn evaluate(&self, ctx: &HealthContext) -> TriageReport {
        let assessment = self.assess(ctx);
        let crisis_type = classify_crisis_all(patient_texts(ctx));
        let guidance = GuidanceGate::for_outcome(assessment.urgency, crisis_type);

        let report = TriageReport {
            urgency_label: assessment.urgency.label().to_string(),
            crisis_resources: crisis_resources(crisis_type).map(str::to_string),
            crisis_type,
            guidance,
            catalog_version: self.catalog.version().to_string(),
            assessed_at: Utc::now(),
            assessment,
        };
        log_outcome(&report);
        report
    }
}

/// Every free-text field the patient supplied.
fn patient_texts(ctx: &HealthContext) -> impl Iterator<Item = &str> {
    std::iter::once(ctx.primary_symptom.as_str())
        .chain(ctx.associated_symptoms.iter().map(String::as_str))
        .chain(ctx.additional_notes.as_deref())
}

/// Log the outcome. Never logs patient text.
fn log_outcome(report: &TriageReport) {
    let assessment = &report.assessment;
    if report.crisis_type != CrisisType::None {
        tracing::warn!(
            crisis_type = %report.crisis_type,
            urgency = %assessment.urgency,
            "Crisis detected, resources attached"
        );
    }
    if assessment.urgency >= UrgencyLevel::Urgent {
        tracing::warn!(
            urgency = %assessment.urgency,
            score = assessment.score,
            red_flag_count = assessment.red_flags_detected.len(),
            "High-urgency triage outcome"
        );
    } else {
        tracing::info!(
            urgency = %assessment.urgency,
            score = assessment.score,
            "Triage completed"
        );
    }
}
