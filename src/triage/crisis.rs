//! Crisis-type classifier.
//!
//! Detects suicidal ideation, self-harm and overdose with its own patterns,
//! separate from the scored catalog. A detected crisis always attaches fixed
//! resource text; no score threshold can suppress it.

use std::sync::LazyLock;

use regex::Regex;

use super::sanitize::normalize;
use crate::models::enums::CrisisType;

pub const CRISIS_LINE: &str = "988";
pub const POISON_CONTROL_LINE: &str = "1-800-222-1222";
pub const EMERGENCY_LINE: &str = "911";

pub const SUICIDE_RESOURCES: &str = "If you are thinking about suicide, you are not alone. \
     Call or text 988 to reach the 988 Suicide & Crisis Lifeline (free, confidential, 24/7). \
     If you are in immediate danger, call 911 now.";

pub const SELF_HARM_RESOURCES: &str = "If you are hurting yourself or thinking about it, \
     call or text 988 to talk with a trained crisis counselor (free, confidential, 24/7). \
     If you are seriously injured or in immediate danger, call 911 now.";

pub const OVERDOSE_RESOURCES: &str = "If you or someone else may have taken too much of a \
     medicine or substance, call Poison Control at 1-800-222-1222 now. \
     If the person is unconscious, having trouble breathing or having a seizure, call 911. \
     If the overdose was intentional, you can also call or text 988.";

struct CrisisPattern {
    regex: Regex,
    crisis_type: CrisisType,
}

fn crisis_pattern(regex_str: &str, crisis_type: CrisisType) -> CrisisPattern {
    CrisisPattern {
        regex: Regex::new(regex_str).expect("Invalid crisis regex pattern"),
        crisis_type,
    }
}

/// Checked in precedence order. First match wins.
static CRISIS_PATTERNS: LazyLock<Vec<CrisisPattern>> = LazyLock::new(|| {
    vec![
        crisis_pattern(
            r"(?i)\bkill(ing)?\s+myself\b|\bsuicid\w*|\bend(ing)?\s+(it\s+all|my\s+life)\b|\b(want|wanna)\s+(to\s+)?die\b|\bbetter\s+off\s+dead\b|\btake\s+my\s+own\s+life\b|\bno\s+reason\s+to\s+live\b|\bdon'?t\s+want\s+to\s+(live|be\s+alive)\b",
            CrisisType::Suicide,
        ),
        crisis_pattern(
            r"(?i)\boverdos\w*|\bod'?d\b|\btook\s+(too\s+many|a\s+(whole\s+)?bottle\s+of|all\s+(of\s+)?(my|the))\s+(\w+\s+)?(pills|tablets|meds|medications?)\b|\bswallowed\s+(a\s+)?(bottle|bunch|lot|handful)\s+of\s+(pills|tablets)\b",
            CrisisType::Overdose,
        ),
        crisis_pattern(
            r"(?i)\b(cut(ting)?|hurt(ing)?|harm(ing)?|burn(ing)?|hit(ting)?)\s+myself\b|\bself[-\s]?harm\w*|\bself[-\s]?injur\w*",
            CrisisType::SelfHarm,
        ),
    ]
});

fn precedence(crisis_type: CrisisType) -> u8 {
    match crisis_type {
        CrisisType::Suicide => 3,
        CrisisType::Overdose => 2,
        CrisisType::SelfHarm => 1,
        CrisisType::None => 0,
    }
}

/// Classify one piece of patient text.
pub fn classify_crisis(text: &str) -> CrisisType {
    let normalized = normalize(text);
    CRISIS_PATTERNS
        .iter()
        .find(|p| p.regex.is_match(&normalized))
        .map(|p| p.crisis_type)
        .unwrap_or(CrisisType::None)
}

/// Classify several texts; the highest-precedence crisis wins.
pub fn classify_crisis_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> CrisisType {
    texts
        .into_iter()
        .map(classify_crisis)
        .max_by_key(|c| precedence(*c))
        .unwrap_or(CrisisType::None)
}

/// Fixed resource text for a crisis type. `None` for no crisis.
pub fn crisis_resources(crisis_type: CrisisType) -> Option<&'static str> {
    match crisis_type {
        CrisisType::Suicide => Some(SUICIDE_RESOURCES),
        CrisisType::SelfHarm => Some(SELF_HARM_RESOURCES),
        CrisisType::Overdose => Some(OVERDOSE_RESOURCES),
        CrisisType::None => None,
    }
}

/// Put the crisis resources verbatim ahead of any other response text.
pub fn format_crisis_response(crisis_type: CrisisType, response: &str) -> String {
    match crisis_resources(crisis_type) {
        Some(resources) if response.trim().is_empty() => resources.to_string(),
        Some(resources) => format!("{resources}\n\n{response}"),
        None => response.to_string(),
    }
}
