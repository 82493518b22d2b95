//! Context-aware red-flag matcher.
//!
//! Evaluates every applicable catalog rule against one piece of text. No early
//! exit: the aggregator needs the highest-boost rule, not the first.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::rules::RuleCatalog;
use super::sanitize::normalize_text;
use super::types::{PatientContext, SymptomMatch, MAX_URGENCY_BOOST};

/// A plain phrase that signals an emergency without a structured rule.
struct EmergencyKeyword {
    regex: Regex,
    label: &'static str,
}

/// Consulted only when no catalog rule matched. Whole words only, so
/// "studying" is not "dying".
static EMERGENCY_KEYWORDS: LazyLock<Vec<EmergencyKeyword>> = LazyLock::new(|| {
    ["ambulance", "911", "dying", "no pulse", "medical emergency", "life or death"]
        .into_iter()
        .map(|label| EmergencyKeyword {
            regex: Regex::new(&format!(r"\b{}\b", label.replace(' ', r"\s+")))
                .expect("Invalid emergency keyword pattern"),
            label,
        })
        .collect()
});

/// Matcher bound to one catalog.
#[derive(Debug, Clone, Copy)]
pub struct SymptomMatcher<'a> {
    catalog: &'a RuleCatalog,
}

impl SymptomMatcher<'static> {
    /// Matcher over the built-in catalog.
    pub fn standard() -> Self {
        Self::new(RuleCatalog::standard())
    }
}

impl<'a> SymptomMatcher<'a> {
    pub fn new(catalog: &'a RuleCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a RuleCatalog {
        self.catalog
    }

    /// Match `text` against every rule that applies to `ctx`.
    pub fn match_text(&self, text: &str, ctx: &PatientContext) -> SymptomMatch<'a> {
        let sanitized = normalize_text(text);
        if sanitized.was_modified {
            tracing::debug!("Hidden characters or irregular spacing removed before matching");
        }
        let normalized = sanitized.text;
        if normalized.is_empty() {
            return SymptomMatch::none();
        }

        let mut matched_rules = Vec::new();
        let mut detected_symptoms = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut seen_descriptions = HashSet::new();

        for rule in self.catalog.rules() {
            if !rule.applies_to(ctx) || !rule.matches(&normalized) {
                continue;
            }
            if !seen_ids.insert(rule.id.as_str()) {
                continue;
            }
            tracing::debug!(
                rule_id = %rule.id,
                category = %rule.category,
                urgency_boost = rule.urgency_boost,
                "Red-flag rule matched"
            );
            matched_rules.push(rule);
            if seen_descriptions.insert(rule.description.as_str()) {
                detected_symptoms.push(rule.description.clone());
            }
        }

        let confidence = if let Some(max_boost) = matched_rules.iter().map(|r| r.urgency_boost).max() {
            rule_confidence(matched_rules.len(), max_boost)
        } else {
            let hits = keyword_hits(&normalized);
            detected_symptoms.extend(hits.iter().map(|kw| kw.to_string()));
            keyword_confidence(hits.len())
        };

        SymptomMatch {
            is_emergency: !detected_symptoms.is_empty() || !matched_rules.is_empty(),
            detected_symptoms,
            confidence,
            matched_rules,
        }
    }
}

/// Match against the built-in catalog.
pub fn match_symptoms(text: &str, ctx: &PatientContext) -> SymptomMatch<'static> {
    SymptomMatcher::standard().match_text(text, ctx)
}

/// Match when the caller has no demographics. Every context flag is false,
/// so context-restricted rules (infant, pregnancy, ...) never fire.
pub fn match_symptoms_without_context(text: &str) -> SymptomMatch<'static> {
    match_symptoms(text, &PatientContext::default())
}

fn keyword_hits(normalized: &str) -> Vec<&'static str> {
    EMERGENCY_KEYWORDS
        .iter()
        .filter(|kw| kw.regex.is_match(normalized))
        .map(|kw| kw.label)
        .collect()
}

fn rule_confidence(rule_count: usize, max_boost: u32) -> f32 {
    let c = 0.5 + 0.15 * rule_count as f32 + 0.3 * (max_boost as f32 / MAX_URGENCY_BOOST as f32);
    c.min(1.0)
}

fn keyword_confidence(keyword_count: usize) -> f32 {
    if keyword_count == 0 {
        return 0.0;
    }
    (0.3 * keyword_count as f32 + 0.5).min(1.0)
}
