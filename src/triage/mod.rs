pub mod types;
pub mod rules;
pub mod sanitize;
pub mod matcher;
pub mod aggregator;
pub mod crisis;
pub mod orchestrator;

pub use aggregator::{assess_urgency, assess_urgency_with};
pub use crisis::{classify_crisis, crisis_resources, format_crisis_response};
pub use matcher::{match_symptoms, match_symptoms_without_context, SymptomMatcher};
pub use orchestrator::{GuidanceGate, TriageEngine, TriageReport, TriageService};
pub use rules::RuleCatalog;
pub use types::{
    MatchedRule, PatientContext, RedFlagRule, RuleDefinition, SafetyAssessment, SymptomMatch,
    TriageError,
};
