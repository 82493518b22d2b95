//! Urgency aggregator.
//!
//! Combines matcher output from every text field with severity, duration,
//! frequency, chronic-condition risk, age and pregnancy into one score, then
//! maps the score onto an [`UrgencyLevel`]. Any detected red flag floors the
//! result at `Urgent`.
//!
//! Pure and infallible: absent fields contribute zero.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::matcher::SymptomMatcher;
use super::rules::{age_group_from_age, age_modifier};
use super::types::{MatchedRule, PatientContext, RedFlagRule, SafetyAssessment, SymptomMatch};
use crate::models::enums::{AgeGroup, SymptomDuration, SymptomFrequency, UrgencyLevel};
use crate::models::health_context::HealthContext;

/// Score for a primary symptom flagged only by a legacy keyword.
pub const LEGACY_KEYWORD_SCORE: u32 = 50;
pub const ASSOCIATED_SYMPTOM_SCORE: u32 = 30;
pub const NOTES_SCORE: u32 = 20;
pub const PREGNANCY_SCORE: u32 = 15;
pub const CONSTANT_FREQUENCY_SCORE: u32 = 10;
pub const CHRONIC_CONDITION_SCORE: u32 = 10;
/// Score at or above which a professional visit is recommended.
pub const SEE_PROFESSIONAL_THRESHOLD: u32 = 20;

static PREGNANCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(pregnan\w*|expecting\s+a\s+baby|trimester|gestation\w*)")
        .expect("Invalid pregnancy pattern")
});

static NEGATED_PREGNANCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(not|non-?|never\s+been)\s*pregnan").expect("Invalid pregnancy pattern")
});

/// High-risk chronic conditions. One match per condition entry.
static HIGH_RISK_CONDITIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bdiabet\w*",
        r"\bheart\s+(disease|condition|failure)\b|\bcoronary\b|\bcardiac\b",
        r"\bhypertension\b|\bhigh\s+blood\s+pressure\b",
        r"\basthma\w*",
        r"\bcopd\b|\bemphysema\b|\bchronic\s+bronchitis\b",
        r"\bcancer\b|\bleuka?emia\b|\blymphoma\b|\bchemo\w*",
        r"\bimmuno(compromised|suppress\w*|deficien\w*)|\borgan\s+transplant\b",
        r"\bhiv\b|\baids\b",
        r"\b(kidney|renal)\s+(disease|failure)\b|\bckd\b|\bdialysis\b",
        r"\bliver\s+(disease|failure)\b|\bcirrhosis\b|\bhepatitis\b",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("Invalid high-risk condition pattern"))
    .collect()
});

// ── Patient context ─────────────────────────────────────────

/// Age group as given, or derived from the numeric age.
pub fn resolve_age_group(ctx: &HealthContext) -> Option<AgeGroup> {
    ctx.age_group.or_else(|| ctx.age_years().map(age_group_from_age))
}

/// True when the text mentions pregnancy and does not negate it.
pub fn mentions_pregnancy(text: &str) -> bool {
    PREGNANCY_PATTERN.is_match(text) && !NEGATED_PREGNANCY_PATTERN.is_match(text)
}

pub fn is_high_risk_condition(condition: &str) -> bool {
    HIGH_RISK_CONDITIONS.iter().any(|re| re.is_match(condition))
}

/// Derive the rule-gating context for one assessment.
pub fn derive_patient_context(ctx: &HealthContext) -> PatientContext {
    let is_pregnant = ctx.pregnant
        || ctx
            .chronic_conditions
            .iter()
            .chain(ctx.risk_factors.iter())
            .any(|entry| mentions_pregnancy(entry));
    let group = resolve_age_group(ctx);
    PatientContext {
        is_pregnant,
        is_infant: group == Some(AgeGroup::Infant),
        is_child: group == Some(AgeGroup::Child),
        is_senior: group == Some(AgeGroup::Senior),
        age_in_years: ctx.age_years(),
    }
}

// ── Score terms ─────────────────────────────────────────────

pub fn severity_score(severity: Option<u8>) -> u32 {
    match severity {
        Some(s) if s >= 9 => 25,
        Some(s) if s >= 7 => 15,
        Some(s) if s >= 5 => 8,
        _ => 0,
    }
}

/// Duration policy. First matching branch wins.
pub fn duration_modifier(
    duration: Option<SymptomDuration>,
    severity: Option<u8>,
) -> Option<(u32, &'static str)> {
    let severe = severity.is_some_and(|s| s >= 7);
    match duration? {
        SymptomDuration::JustNow if severe => Some((15, "Sudden onset with high severity")),
        SymptomDuration::Chronic if severe => Some((12, "Chronic condition with sudden worsening")),
        SymptomDuration::JustNow | SymptomDuration::FewHours => Some((5, "Recent onset")),
        SymptomDuration::OneToTwoWeeks | SymptomDuration::MoreThanTwoWeeks => {
            Some((8, "Symptoms persisting for an extended period"))
        }
        _ => None,
    }
}

/// Decision policy. Red flags floor the result at `Urgent`.
pub fn urgency_for_score(score: u32, red_flag_count: usize) -> UrgencyLevel {
    if red_flag_count > 0 {
        return if score >= 50 {
            UrgencyLevel::Emergency
        } else {
            UrgencyLevel::Urgent
        };
    }
    match score {
        s if s >= 50 => UrgencyLevel::Emergency,
        s if s >= 40 => UrgencyLevel::Urgent,
        s if s >= 30 => UrgencyLevel::Soon,
        s if s >= 20 => UrgencyLevel::NonUrgent,
        s if s >= 10 => UrgencyLevel::Monitor,
        _ => UrgencyLevel::SelfCare,
    }
}

// ── Aggregation ─────────────────────────────────────────────

/// Running totals for one assessment, deduplicating as it goes.
#[derive(Default)]
struct ScoreSheet<'a> {
    score: u32,
    reasoning: Vec<String>,
    red_flags: Vec<String>,
    seen_flags: HashSet<String>,
    rules: Vec<&'a RedFlagRule>,
    seen_rules: HashSet<&'a str>,
    risk_factors: Vec<String>,
    seen_risks: HashSet<String>,
}

impl<'a> ScoreSheet<'a> {
    fn add(&mut self, points: u32, reason: String) {
        tracing::debug!(points, "Urgency score contribution");
        self.score += points;
        self.reasoning.push(format!("{reason} (+{points})"));
    }

    fn absorb(&mut self, m: &SymptomMatch<'a>) {
        for &rule in &m.matched_rules {
            if self.seen_rules.insert(rule.id.as_str()) {
                self.rules.push(rule);
            }
        }
        for symptom in &m.detected_symptoms {
            if self.seen_flags.insert(symptom.clone()) {
                self.red_flags.push(symptom.clone());
            }
        }
    }

    fn add_risk_factor(&mut self, factor: &str) {
        let factor = factor.trim();
        if self.seen_risks.insert(factor.to_lowercase()) {
            self.risk_factors.push(factor.to_string());
        }
    }
}

/// Assess urgency against the built-in catalog.
pub fn assess_urgency(ctx: &HealthContext) -> SafetyAssessment {
    assess_urgency_with(&SymptomMatcher::standard(), ctx)
}

/// Assess urgency with a specific matcher (and therefore catalog).
pub fn assess_urgency_with(matcher: &SymptomMatcher<'_>, ctx: &HealthContext) -> SafetyAssessment {
    let patient = derive_patient_context(ctx);
    let mut sheet = ScoreSheet::default();

    // Text sources
    let primary = matcher.match_text(&ctx.primary_symptom, &patient);
    if primary.is_emergency {
        let points = primary.max_urgency_boost().unwrap_or(LEGACY_KEYWORD_SCORE);
        sheet.add(
            points,
            format!("Red flag in main symptom: {}", primary.detected_symptoms.join(", ")),
        );
        sheet.absorb(&primary);
    }

    for symptom in &ctx.associated_symptoms {
        let m = matcher.match_text(symptom, &patient);
        if m.is_emergency {
            sheet.add(
                ASSOCIATED_SYMPTOM_SCORE,
                format!("Red flag in associated symptom: {}", m.detected_symptoms.join(", ")),
            );
            sheet.absorb(&m);
        }
    }

    if let Some(notes) = ctx.additional_notes.as_deref() {
        let m = matcher.match_text(notes, &patient);
        if m.is_emergency {
            sheet.add(
                NOTES_SCORE,
                format!("Red flag in additional notes: {}", m.detected_symptoms.join(", ")),
            );
            sheet.absorb(&m);
        }
    }

    // Age
    let mut age_modifier_applied = 0;
    if let Some(group) = resolve_age_group(ctx) {
        let modifier = age_modifier(group);
        if modifier.score > 0 {
            age_modifier_applied = modifier.score;
            sheet.add(
                modifier.score,
                format!("{} patient: {}", group.label(), modifier.rationale),
            );
            sheet.add_risk_factor(group.label());
        }
    }

    // Pregnancy, independent of any pregnancy rule matches above
    if patient.is_pregnant {
        sheet.add(
            PREGNANCY_SCORE,
            "Pregnancy increases the risk of complications".to_string(),
        );
        sheet.add_risk_factor("Pregnancy");
    }

    let severity = severity_score(ctx.severity);
    if severity > 0 {
        let level = ctx.severity.unwrap_or_default();
        sheet.add(severity, format!("Severity rated {level}/10"));
    }

    if let Some((points, reason)) = duration_modifier(ctx.duration, ctx.severity) {
        sheet.add(points, reason.to_string());
    }

    if ctx.frequency == Some(SymptomFrequency::Constant) {
        sheet.add(CONSTANT_FREQUENCY_SCORE, "Symptoms are constant".to_string());
    }

    for condition in &ctx.chronic_conditions {
        if mentions_pregnancy(condition) || !is_high_risk_condition(condition) {
            continue;
        }
        sheet.add(
            CHRONIC_CONDITION_SCORE,
            format!("High-risk condition: {}", condition.trim()),
        );
        sheet.add_risk_factor(condition);
    }

    let red_flag_count = sheet.red_flags.len();
    let urgency = urgency_for_score(sheet.score, red_flag_count);
    if red_flag_count > 0 && sheet.score < 40 {
        sheet
            .reasoning
            .push("Red flags detected: urgency raised to at least urgent".to_string());
    }

    tracing::debug!(
        urgency = %urgency,
        score = sheet.score,
        red_flag_count,
        rule_count = sheet.rules.len(),
        "Urgency assessed"
    );

    SafetyAssessment {
        urgency,
        score: sheet.score,
        reasoning: sheet.reasoning,
        red_flags_detected: sheet.red_flags,
        risk_factors: sheet.risk_factors,
        recommend_see_professional: sheet.score >= SEE_PROFESSIONAL_THRESHOLD,
        age_modifier_applied,
        matched_red_flag_rules: sheet.rules.into_iter().map(MatchedRule::from).collect(),
    }
}
