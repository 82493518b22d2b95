use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::{ContextTag, RuleCategory, UrgencyLevel};

/// Lowest urgency boost a catalog rule may carry.
pub const MIN_URGENCY_BOOST: u32 = 15;
/// Highest urgency boost a catalog rule may carry. Also the confidence normalizer.
pub const MAX_URGENCY_BOOST: u32 = 50;

/// Inclusive age window in years. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeRestriction {
    pub min_years: Option<f64>,
    pub max_years: Option<f64>,
}

impl AgeRestriction {
    pub fn max_years(max: f64) -> Self {
        Self { min_years: None, max_years: Some(max) }
    }

    pub fn min_years(min: f64) -> Self {
        Self { min_years: Some(min), max_years: None }
    }

    /// An unknown age never excludes; the context tags still gate the rule.
    pub fn permits(&self, age_in_years: Option<f64>) -> bool {
        let Some(age) = age_in_years else { return true };
        self.min_years.is_none_or(|min| age >= min) && self.max_years.is_none_or(|max| age <= max)
    }
}

/// A declarative red-flag detection rule.
///
/// Identity is the `id`; two rules with the same id are the same rule.
#[derive(Debug, Clone)]
pub struct RedFlagRule {
    pub id: String,
    /// Case-insensitive text predicate.
    pub pattern: Regex,
    pub category: RuleCategory,
    pub urgency_boost: u32,
    pub age_restriction: Option<AgeRestriction>,
    /// Empty means the rule applies to every patient.
    pub requires_context: Vec<ContextTag>,
    pub immediate_action: String,
    pub description: String,
}

impl PartialEq for RedFlagRule {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RedFlagRule {
    /// Test the pattern against already-normalized text.
    pub fn matches(&self, normalized_text: &str) -> bool {
        self.pattern.is_match(normalized_text)
    }

    /// Whether this rule is allowed to fire for the given patient.
    pub fn applies_to(&self, ctx: &PatientContext) -> bool {
        let context_ok = self.requires_context.is_empty()
            || self.requires_context.iter().any(|tag| ctx.satisfies(*tag));
        let age_ok = self
            .age_restriction
            .is_none_or(|restriction| restriction.permits(ctx.age_in_years));
        context_ok && age_ok
    }
}

/// Serializable form of a rule, used for catalog extension files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub pattern: String,
    pub category: RuleCategory,
    pub urgency_boost: u32,
    #[serde(default)]
    pub age_restriction: Option<AgeRestriction>,
    #[serde(default)]
    pub requires_context: Vec<ContextTag>,
    pub immediate_action: String,
    pub description: String,
}

impl TryFrom<RuleDefinition> for RedFlagRule {
    type Error = TriageError;

    fn try_from(def: RuleDefinition) -> Result<Self, Self::Error> {
        if def.id.trim().is_empty() || def.description.trim().is_empty() {
            return Err(TriageError::InvalidRule(def.id));
        }
        if !(MIN_URGENCY_BOOST..=MAX_URGENCY_BOOST).contains(&def.urgency_boost) {
            return Err(TriageError::BoostOutOfRange {
                rule_id: def.id,
                boost: def.urgency_boost,
            });
        }
        let pattern = RegexBuilder::new(&def.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| TriageError::RegexCompilation {
                rule_id: def.id.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            id: def.id,
            pattern,
            category: def.category,
            urgency_boost: def.urgency_boost,
            age_restriction: def.age_restriction,
            requires_context: def.requires_context,
            immediate_action: def.immediate_action,
            description: def.description,
        })
    }
}

/// Demographic and clinical flags derived once per assessment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PatientContext {
    pub is_pregnant: bool,
    pub is_infant: bool,
    pub is_child: bool,
    pub is_senior: bool,
    pub age_in_years: Option<f64>,
}

impl PatientContext {
    /// Infants are a stricter subset of children, so `Child` also holds for them.
    pub fn satisfies(&self, tag: ContextTag) -> bool {
        match tag {
            ContextTag::Pregnancy => self.is_pregnant,
            ContextTag::Infant => self.is_infant,
            ContextTag::Child => self.is_child || self.is_infant,
            ContextTag::Senior => self.is_senior,
        }
    }
}

/// Matcher output for one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomMatch<'a> {
    pub is_emergency: bool,
    /// Rule descriptions and legacy keyword labels, deduplicated.
    pub detected_symptoms: Vec<String>,
    pub confidence: f32,
    /// Deduplicated by rule id, in catalog order.
    pub matched_rules: Vec<&'a RedFlagRule>,
}

impl SymptomMatch<'_> {
    pub fn none() -> Self {
        Self {
            is_emergency: false,
            detected_symptoms: Vec::new(),
            confidence: 0.0,
            matched_rules: Vec::new(),
        }
    }

    pub fn max_urgency_boost(&self) -> Option<u32> {
        self.matched_rules.iter().map(|r| r.urgency_boost).max()
    }
}

/// A matched rule as reported downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub id: String,
    pub category: RuleCategory,
    pub urgency_boost: u32,
    pub immediate_action: String,
    pub description: String,
}

impl From<&RedFlagRule> for MatchedRule {
    fn from(rule: &RedFlagRule) -> Self {
        Self {
            id: rule.id.clone(),
            category: rule.category,
            urgency_boost: rule.urgency_boost,
            immediate_action: rule.immediate_action.clone(),
            description: rule.description.clone(),
        }
    }
}

/// Outcome of one urgency assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    pub urgency: UrgencyLevel,
    /// Total numeric score before level mapping.
    pub score: u32,
    /// One line per score contribution, in evaluation order.
    pub reasoning: Vec<String>,
    /// Deduplicated red-flag descriptions.
    pub red_flags_detected: Vec<String>,
    pub risk_factors: Vec<String>,
    pub recommend_see_professional: bool,
    pub age_modifier_applied: u32,
    /// Deduplicated by rule id.
    pub matched_red_flag_rules: Vec<MatchedRule>,
}

impl SafetyAssessment {
    /// Immediate actions of the matched rules, highest boost first, without repeats.
    pub fn immediate_actions(&self) -> Vec<&str> {
        let mut rules: Vec<&MatchedRule> = self.matched_red_flag_rules.iter().collect();
        rules.sort_by(|a, b| b.urgency_boost.cmp(&a.urgency_boost));
        let mut actions: Vec<&str> = Vec::new();
        for rule in rules {
            if !actions.contains(&rule.immediate_action.as_str()) {
                actions.push(&rule.immediate_action);
            }
        }
        actions
    }

    pub fn has_red_flags(&self) -> bool {
        !self.red_flags_detected.is_empty()
    }
}

/// Triage engine errors. The assessment path itself never fails; these
/// cover catalog loading and input decoding.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Regex compilation failed for rule {rule_id}: {reason}")]
    RegexCompilation { rule_id: String, reason: String },

    #[error("Urgency boost {boost} for rule {rule_id} is outside 15..=50")]
    BoostOutOfRange { rule_id: String, boost: u32 },

    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    #[error("Rule is missing an id or description: {0:?}")]
    InvalidRule(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(id: &str, pattern: &str, boost: u32) -> RuleDefinition {
        RuleDefinition {
            id: id.into(),
            pattern: pattern.into(),
            category: RuleCategory::Cardiac,
            urgency_boost: boost,
            age_restriction: None,
            requires_context: vec![],
            immediate_action: "Call 911".into(),
            description: "Test rule".into(),
        }
    }

    #[test]
    fn definition_compiles_case_insensitive() {
        let rule = RedFlagRule::try_from(definition("t1", r"chest\s+pain", 40)).unwrap();
        assert!(rule.matches("CHEST PAIN since noon"));
        assert!(!rule.matches("back pain"));
    }

    #[test]
    fn invalid_regex_is_reported_with_rule_id() {
        let err = RedFlagRule::try_from(definition("broken", r"(unclosed", 40)).unwrap_err();
        match err {
            TriageError::RegexCompilation { rule_id, .. } => assert_eq!(rule_id, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn boost_outside_range_is_rejected() {
        assert!(matches!(
            RedFlagRule::try_from(definition("low", "x", 5)),
            Err(TriageError::BoostOutOfRange { boost: 5, .. })
        ));
        assert!(matches!(
            RedFlagRule::try_from(definition("high", "x", 80)),
            Err(TriageError::BoostOutOfRange { boost: 80, .. })
        ));
    }

    #[test]
    fn empty_id_is_rejected() {
        assert!(matches!(
            RedFlagRule::try_from(definition("  ", "x", 20)),
            Err(TriageError::InvalidRule(_))
        ));
    }

    #[test]
    fn age_restriction_bounds_are_inclusive() {
        let r = AgeRestriction::max_years(0.25);
        assert!(r.permits(Some(0.25)));
        assert!(r.permits(Some(0.1)));
        assert!(!r.permits(Some(0.26)));
        assert!(r.permits(None));

        let senior = AgeRestriction::min_years(65.0);
        assert!(senior.permits(Some(65.0)));
        assert!(!senior.permits(Some(64.9)));
    }

    #[test]
    fn child_context_includes_infants() {
        let infant = PatientContext { is_infant: true, ..Default::default() };
        assert!(infant.satisfies(ContextTag::Child));
        assert!(infant.satisfies(ContextTag::Infant));

        let child = PatientContext { is_child: true, ..Default::default() };
        assert!(child.satisfies(ContextTag::Child));
        assert!(!child.satisfies(ContextTag::Infant));
    }

    #[test]
    fn default_context_satisfies_nothing() {
        let ctx = PatientContext::default();
        for tag in ContextTag::all() {
            assert!(!ctx.satisfies(*tag), "{tag} should not hold by default");
        }
    }

    #[test]
    fn context_gating_is_or_semantics() {
        let mut def = definition("either", "dizzy", 20);
        def.requires_context = vec![ContextTag::Pregnancy, ContextTag::Senior];
        let rule = RedFlagRule::try_from(def).unwrap();

        let senior = PatientContext { is_senior: true, ..Default::default() };
        let pregnant = PatientContext { is_pregnant: true, ..Default::default() };
        assert!(rule.applies_to(&senior));
        assert!(rule.applies_to(&pregnant));
        assert!(!rule.applies_to(&PatientContext::default()));
    }

    #[test]
    fn immediate_actions_are_ordered_and_unique() {
        let assessment = SafetyAssessment {
            urgency: UrgencyLevel::Emergency,
            score: 80,
            reasoning: vec![],
            red_flags_detected: vec!["a".into(), "b".into(), "c".into()],
            risk_factors: vec![],
            recommend_see_professional: true,
            age_modifier_applied: 0,
            matched_red_flag_rules: vec![
                MatchedRule {
                    id: "low".into(),
                    category: RuleCategory::Infection,
                    urgency_boost: 20,
                    immediate_action: "See a doctor today".into(),
                    description: "a".into(),
                },
                MatchedRule {
                    id: "high".into(),
                    category: RuleCategory::Cardiac,
                    urgency_boost: 50,
                    immediate_action: "Call 911".into(),
                    description: "b".into(),
                },
                MatchedRule {
                    id: "high2".into(),
                    category: RuleCategory::Respiratory,
                    urgency_boost: 45,
                    immediate_action: "Call 911".into(),
                    description: "c".into(),
                },
            ],
        };
        assert_eq!(assessment.immediate_actions(), vec!["Call 911", "See a doctor today"]);
    }
}
