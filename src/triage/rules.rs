//! Red-flag rule catalog.
//!
//! Rules are data: an ordered list of definitions evaluated uniformly by the
//! matcher. Adding clinical coverage means appending a definition with a
//! fresh id. Sources: AHA stroke/MI warning signs, AAP infant fever
//! guidance, ACOG pregnancy warning signs, NICE sepsis and head-injury
//! guidance.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use serde::Serialize;

use super::types::{AgeRestriction, RedFlagRule, RuleDefinition, TriageError};
use crate::models::enums::{AgeGroup, ContextTag, RuleCategory};

/// Version string of the built-in catalog.
pub const BUILTIN_CATALOG_VERSION: &str = "builtin-2026.10";

const CALL_911: &str =
    "Call emergency services (911) now. Do not drive yourself to the hospital.";
const ER_NOW: &str = "Go to the nearest emergency department now, or call 911.";
const SAME_DAY: &str = "Contact a doctor or urgent care today.";

// ── Rule registry ───────────────────────────────────────────

fn rule(
    id: &str,
    category: RuleCategory,
    urgency_boost: u32,
    pattern: &str,
    description: &str,
    immediate_action: &str,
) -> RuleDefinition {
    RuleDefinition {
        id: id.into(),
        pattern: pattern.into(),
        category,
        urgency_boost,
        age_restriction: None,
        requires_context: Vec::new(),
        immediate_action: immediate_action.into(),
        description: description.into(),
    }
}

impl RuleDefinition {
    fn requiring(mut self, tags: &[ContextTag]) -> Self {
        self.requires_context = tags.to_vec();
        self
    }

    fn for_ages(mut self, restriction: AgeRestriction) -> Self {
        self.age_restriction = Some(restriction);
        self
    }
}

/// Built-in definitions in evaluation order.
fn builtin_definitions() -> Vec<RuleDefinition> {
    use RuleCategory::*;

    vec![
        // ── Cardiac ──
        rule(
            "cardiac_heart_attack",
            Cardiac,
            50,
            r"\bheart\s+attack\b",
            "Possible heart attack",
            CALL_911,
        ),
        rule(
            "cardiac_chest_pain_radiating",
            Cardiac,
            50,
            r"\bchest\s+(pain|pressure|tightness)[^.]*\b(arm|jaw|neck|shoulder|back)\b|\bpain\s+(radiating|spreading|going)\s+(down|to|into)\s+(my\s+)?(left\s+)?(arm|jaw)\b",
            "Chest pain spreading to arm, jaw or back",
            CALL_911,
        ),
        rule(
            "cardiac_chest_pain",
            Cardiac,
            40,
            r"\bchest\s+(pain|pressure|tightness|heaviness)\b|\bcrushing\s+(chest|pain)\b|\bpain\s+in\s+(my\s+)?chest\b",
            "Chest pain or pressure",
            CALL_911,
        ),
        rule(
            "cardiac_fainting",
            Cardiac,
            35,
            r"\b(faint(ed|ing)?|passed\s+out|blacked\s+out|syncope|collapsed)\b",
            "Fainting or collapse",
            ER_NOW,
        ),
        rule(
            "cardiac_palpitations",
            Cardiac,
            25,
            r"\b(heart|pulse)\s+(is\s+)?(racing|pounding|irregular|skipping)\b|\bpalpitations?\b",
            "Racing or irregular heartbeat",
            SAME_DAY,
        ),
        // ── Respiratory ──
        rule(
            "respiratory_cant_breathe",
            Respiratory,
            50,
            r"\b(can'?t|cannot|can\s+not|unable\s+to)\s+(breathe|catch\s+(my\s+)?breath)\b|\b(not|stopped)\s+breathing\b",
            "Unable to breathe",
            CALL_911,
        ),
        rule(
            "respiratory_choking",
            Respiratory,
            50,
            r"\bchok(e|ed|ing)\b",
            "Choking",
            "Call 911. If the person cannot cough, speak or breathe, start back blows and abdominal thrusts.",
        ),
        rule(
            "respiratory_blue_lips",
            Respiratory,
            50,
            r"\b(blue|gr[ae]y)\s+(lips|face|skin)\b|\blips\s+(are\s+|turning\s+)?(blue|gr[ae]y)\b|\bcyanos[ie]s\b",
            "Blue or grey lips or skin",
            CALL_911,
        ),
        rule(
            "respiratory_severe_difficulty",
            Respiratory,
            40,
            r"\b(severe|extreme)\s+(shortness\s+of\s+breath|breathlessness)\b|\bgasping\b|\b(struggling|difficulty|trouble)\s+(to\s+)?breath(e|ing)\b",
            "Severe difficulty breathing",
            ER_NOW,
        ),
        // ── Neurological ──
        rule(
            "neuro_stroke_signs",
            Neurological,
            50,
            r"\bstroke\b|\bface\s+(is\s+)?droop\w*|\bdrooping\s+(face|mouth)\b|\bslurred\s+speech\b|\bsudden\s+(numbness|weakness)\b|\bone\s+side\s+(of\s+(my|the|his|her|their)\s+(body|face)\s+)?(is\s+)?(numb|weak)\b",
            "Possible stroke signs",
            "Call 911 now and note the time symptoms started.",
        ),
        rule(
            "neuro_unresponsive",
            Neurological,
            50,
            r"\b(unresponsive|unconscious|not\s+responding)\b|\bwon'?t\s+wake(\s+up)?\b",
            "Unresponsive or unconscious",
            CALL_911,
        ),
        rule(
            "neuro_seizure",
            Neurological,
            45,
            r"\bseizures?\b|\bconvuls\w*|\bfitting\b",
            "Seizure",
            "Call 911. Lay the person on their side and do not put anything in their mouth.",
        ),
        rule(
            "neuro_thunderclap_headache",
            Neurological,
            45,
            r"\b(worst|thunderclap|sudden\s+severe|explosive)\s+headache\b|\bworst\s+headache\b|\bheadache\s+of\s+my\s+life\b",
            "Sudden severe headache",
            ER_NOW,
        ),
        rule(
            "neuro_vision_loss",
            Neurological,
            45,
            r"\bsudden(ly)?\s+(loss\s+of\s+vision|vision\s+loss|blind\w*|can'?t\s+see)\b|\blost\s+(my\s+)?(vision|sight)\b|\bdouble\s+vision\b",
            "Sudden vision loss or double vision",
            ER_NOW,
        ),
        rule(
            "neuro_sudden_confusion",
            Neurological,
            35,
            r"\bsudden(ly)?\s+(confus\w*|disorient\w*)|\bdisoriented\b|\bdoesn'?t\s+know\s+where\s+(she|he|they|i)\s+(is|are|am)\b",
            "Sudden confusion",
            ER_NOW,
        ),
        // ── Bleeding ──
        rule(
            "bleeding_severe",
            Bleeding,
            50,
            r"\b(won'?t|will\s+not|doesn'?t|does\s+not|can'?t)\s+stop\s+bleeding\b|\bbleeding\s+(heavily|profusely|a\s+lot)\b|\b(heavy|severe|uncontrolled)\s+bleeding\b|\bspurting\s+blood\b",
            "Severe or uncontrolled bleeding",
            "Apply firm pressure to the wound and call 911.",
        ),
        rule(
            "bleeding_vomiting_blood",
            Bleeding,
            45,
            r"\b(vomit\w*|throw\w*\s+up)\s+blood\b|\bbloody\s+vomit\b|\bcoffee[-\s]ground\b",
            "Vomiting blood",
            ER_NOW,
        ),
        rule(
            "bleeding_coughing_blood",
            Bleeding,
            40,
            r"\bcough\w*\s+(up\s+)?blood\b|\bha?emoptysis\b",
            "Coughing up blood",
            ER_NOW,
        ),
        rule(
            "bleeding_stool",
            Bleeding,
            35,
            r"\b(black|tarry|bloody)\s+(stools?|poop)\b|\bblood\s+in\s+(my\s+)?(stool|poop)\b",
            "Blood in stool or black stool",
            SAME_DAY,
        ),
        // ── Mental health ──
        rule(
            "mh_suicidal_ideation",
            MentalHealth,
            50,
            r"\bkill\s+myself\b|\bsuicid\w*|\bend\s+(it\s+all|my\s+life)\b|\bwant\s+to\s+die\b|\bbetter\s+off\s+dead\b|\btake\s+my\s+own\s+life\b",
            "Suicidal thoughts",
            "Call or text 988 (Suicide & Crisis Lifeline) now. If you are in immediate danger, call 911.",
        ),
        rule(
            "mh_overdose",
            MentalHealth,
            50,
            r"\boverdos\w*|\btook\s+too\s+many\s+(pills|tablets)\b|\bswallowed\s+(a\s+)?(bottle|bunch|lot)\s+of\s+(pills|tablets)\b|\bpoison(ed|ing)\b",
            "Possible overdose or poisoning",
            "Call 911 or Poison Control (1-800-222-1222) now.",
        ),
        rule(
            "mh_self_harm",
            MentalHealth,
            40,
            r"\b(cut(ting)?|hurt(ing)?|harm(ing)?|burn(ing)?)\s+myself\b|\bself[-\s]?harm\w*",
            "Self-harm",
            "Call or text 988 to talk with a crisis counselor now.",
        ),
        rule(
            "mh_hallucinations",
            MentalHealth,
            30,
            r"\bhearing\s+voices\b|\bvoices\s+telling\s+me\b|\bseeing\s+things\s+that\s+(are\s+not|aren'?t)\s+there\b",
            "Hallucinations",
            SAME_DAY,
        ),
        // ── Allergic ──
        rule(
            "allergic_anaphylaxis",
            Allergic,
            50,
            r"\banaphyla\w*|\bthroat\s+(is\s+)?(closing|swelling|swollen|tight)\b|\b(tongue|lips?|face)\s+(is\s+|are\s+)?(swelling|swollen)\b|\bswelling\s+of\s+(the\s+|my\s+)?(tongue|lips?|throat|face)\b",
            "Signs of anaphylaxis",
            "Use an epinephrine auto-injector if available and call 911 immediately.",
        ),
        rule(
            "allergic_hives_breathing",
            Allergic,
            40,
            r"\b(hives|welts)\b[^.]*\b(breath\w*|wheez\w*)",
            "Hives with breathing difficulty",
            CALL_911,
        ),
        rule(
            "allergic_medication_rash",
            Allergic,
            20,
            r"\brash\s+after\s+(taking|starting)\s+(a\s+|the\s+)?(new\s+)?(medication|medicine|antibiotic|pill)s?\b",
            "Rash after a new medication",
            "Stop the new medication only if a professional advises it, and contact your doctor or pharmacist today.",
        ),
        // ── Trauma ──
        rule(
            "trauma_major_injury",
            Trauma,
            45,
            r"\b(car|motor\s+vehicle|traffic)\s+(accident|crash)\b|\bhit\s+by\s+a\s+(car|vehicle)\b|\bfell\s+from\s+(a\s+)?(height|roof|ladder)\b|\bgunshot\b|\bstab(bed|\s+wound)\b|\bbone\s+(is\s+)?sticking\s+out\b",
            "Major trauma",
            CALL_911,
        ),
        rule(
            "trauma_head_injury_warning",
            Trauma,
            45,
            r"\b(head\s+injury|hit\s+(my|his|her|their)\s+head|head\s+trauma|concussion)\b[^.]*\b(vomit\w*|confus\w*|drows\w*|unconscious|passed\s+out)",
            "Head injury with warning signs",
            ER_NOW,
        ),
        rule(
            "trauma_child_head_injury",
            Trauma,
            35,
            r"\bhead\s+injury\b|\bhit\s+(my|his|her|their)\s+head\b|\bfell\s+on\s+(his|her|their|the)\s+head\b|\bbump(ed)?\s+(on\s+)?(the\s+|his\s+|her\s+|their\s+)?head\b|\bconcussion\b",
            "Head injury in a child",
            "Have a doctor check the child today. Go to the emergency department if they vomit, become drowsy or seem confused.",
        )
        .requiring(&[ContextTag::Child]),
        rule(
            "trauma_severe_burn",
            Trauma,
            35,
            r"\b(severe|large|deep)\s+burns?\b|\bburns?\s+(on|to)\s+(the\s+|my\s+)?(face|hands?|genitals)\b|\b(chemical|electrical)\s+burns?\b",
            "Severe burn",
            ER_NOW,
        ),
        rule(
            "trauma_senior_fall",
            Trauma,
            30,
            r"\bfell\s+(down|over|on|off|from|and)\b|\bhad\s+a\s+fall\b|\bha(s|ve)\s+fallen\b",
            "Fall in an older adult",
            SAME_DAY,
        )
        .requiring(&[ContextTag::Senior]),
        // ── Pediatric ──
        rule(
            "peds_infant_fever_any",
            Pediatric,
            50,
            r"\b(fever|feverish|temperature|burning\s+up)\b|\bhot\s+to\s+(the\s+)?touch\b",
            "Fever in an infant under 3 months",
            "Any fever in a baby under 3 months needs immediate medical evaluation. Go to the emergency department or call your pediatrician now.",
        )
        .requiring(&[ContextTag::Infant])
        .for_ages(AgeRestriction::max_years(0.25)),
        rule(
            "peds_infant_lethargic",
            Pediatric,
            45,
            r"\b(limp|floppy|lethargic|very\s+sleepy|hard\s+to\s+wake|inconsolable)\b|\bhigh[-\s]pitched\s+cry\w*",
            "Floppy, lethargic or inconsolable infant",
            ER_NOW,
        )
        .requiring(&[ContextTag::Infant]),
        rule(
            "peds_infant_fontanelle",
            Pediatric,
            45,
            r"\b(bulging|sunken)\s+(soft\s+spot|fontanelle?)\b",
            "Bulging or sunken soft spot",
            ER_NOW,
        )
        .requiring(&[ContextTag::Infant]),
        rule(
            "peds_infant_not_feeding",
            Pediatric,
            40,
            r"\b(not|won'?t|stopped)\s+(feeding|eating|drinking|nursing)\b|\brefus\w*\s+(to\s+)?(feed|eat|drink|nurse|the\s+bottle)\w*|\bno\s+wet\s+diapers?\b",
            "Infant not feeding or no wet diapers",
            "Call your pediatrician now. Go to the emergency department if you cannot reach them.",
        )
        .requiring(&[ContextTag::Infant]),
        rule(
            "peds_child_labored_breathing",
            Pediatric,
            45,
            r"\b(ribs|chest|skin\s+between\s+(the\s+)?ribs)\s+(is\s+|are\s+)?(pulling|sucking)\s+in\b|\bretractions\b|\bnostrils\s+flaring\b|\bgrunting\s+(when|while)\s+breathing\b|\bbreathing\s+(very\s+)?fast\b",
            "Labored breathing in a child",
            ER_NOW,
        )
        .requiring(&[ContextTag::Child]),
        rule(
            "peds_child_rash_fever",
            Pediatric,
            40,
            r"\b(rash|spots)\b[^.]*\bfever\b|\bfever\b[^.]*\b(rash|spots)\b|\bpetechia\w*|\brash\s+(that\s+)?(doesn'?t|does\s+not|won'?t)\s+fade\b",
            "Rash with fever in a child",
            SAME_DAY,
        )
        .requiring(&[ContextTag::Child]),
        // ── Pregnancy ──
        rule(
            "preg_abdominal_pain",
            Pregnancy,
            50,
            r"\b(abdominal|stomach|belly|pelvic|tummy)\s+(pain|cramps?|cramping)\b",
            "Abdominal pain during pregnancy",
            "Call your obstetric provider or go to labor and delivery or the emergency department now.",
        )
        .requiring(&[ContextTag::Pregnancy]),
        rule(
            "preg_bleeding",
            Pregnancy,
            50,
            r"\bvaginal\s+bleeding\b|\bspotting\b|\bpassing\s+clots\b|\bbleeding\s+(from\s+(the\s+)?vagina|down\s+there)\b",
            "Bleeding during pregnancy",
            "Go to labor and delivery or the emergency department now.",
        )
        .requiring(&[ContextTag::Pregnancy]),
        rule(
            "preg_preeclampsia_signs",
            Pregnancy,
            45,
            r"\b(blurred|blurry)\s+vision\b|\bseeing\s+(spots|flashing\s+lights)\b|\bsudden\s+swelling\b|\bswelling\s+(of|in)\s+(my\s+)?(face|hands)\b|\bsevere\s+headache\b",
            "Possible preeclampsia signs",
            "Contact your obstetric provider immediately or go to labor and delivery.",
        )
        .requiring(&[ContextTag::Pregnancy]),
        rule(
            "preg_reduced_movement",
            Pregnancy,
            40,
            r"\bbaby\s+(is\s+)?(not\s+moving|moving\s+less|stopped\s+moving)\b|\b(less|reduced|decreased|no)\s+(fetal\s+|baby\s+)?movements?\b|\bhaven'?t\s+felt\s+(the\s+)?baby\s+move\b",
            "Reduced fetal movement",
            "Contact labor and delivery now for monitoring.",
        )
        .requiring(&[ContextTag::Pregnancy]),
        rule(
            "preg_waters_breaking",
            Pregnancy,
            35,
            r"\bwater\s+(broke|breaking|has\s+broken)\b|\bleaking\s+fluid\b|\bgush\s+of\s+fluid\b",
            "Waters breaking",
            "Call your obstetric provider or labor and delivery now.",
        )
        .requiring(&[ContextTag::Pregnancy]),
        // ── Infection ──
        rule(
            "infection_sepsis_signs",
            Infection,
            45,
            r"\bsep(sis|tic)\b|\b(mottled|blotchy)\s+skin\b|\bhigh\s+fever\b[^.]*\b(confus\w*|shiver\w*|shaking|racing\s+heart)",
            "Possible sepsis",
            ER_NOW,
        ),
        rule(
            "infection_meningitis_signs",
            Infection,
            45,
            r"\b(stiff\s+neck|neck\s+stiffness)\b[^.]*\bfever\b|\bfever\b[^.]*\b(stiff\s+neck|neck\s+stiffness)\b",
            "Fever with stiff neck",
            ER_NOW,
        ),
        rule(
            "infection_senior_fever",
            Infection,
            30,
            r"\b(fever|feverish|chills|high\s+temperature)\b",
            "Fever in an older adult",
            SAME_DAY,
        )
        .requiring(&[ContextTag::Senior]),
        rule(
            "infection_spreading_redness",
            Infection,
            20,
            r"\bred\s+streaks?\b|\bspreading\s+redness\b|\bredness\s+(is\s+)?spreading\b",
            "Spreading redness around a wound",
            SAME_DAY,
        ),
        // ── Dehydration ──
        rule(
            "dehydration_heatstroke",
            Dehydration,
            40,
            r"\bheat\s*stroke\b|\bstopped\s+sweating\b",
            "Possible heatstroke",
            "Call 911, move to a cool place and cool the body with water.",
        ),
        rule(
            "dehydration_severe",
            Dehydration,
            35,
            r"\b(can'?t|cannot|unable\s+to)\s+keep\s+(anything|any\s+(fluids?|water|food))\s+down\b|\bno\s+urine\b|\bhaven'?t\s+(peed|urinated)\s+(in|for)\b|\bextreme\s+thirst\b|\bsevere(ly)?\s+dehydrat\w*",
            "Severe dehydration",
            SAME_DAY,
        ),
        rule(
            "dehydration_child_signs",
            Dehydration,
            35,
            r"\bno\s+(tears|urine|pee)\b|\bhasn'?t\s+(peed|urinated|had\s+a\s+wet\s+diaper)\b|\bsunken\s+eyes\b",
            "Signs of dehydration in a child",
            SAME_DAY,
        )
        .requiring(&[ContextTag::Child]),
        rule(
            "dehydration_persistent_losses",
            Dehydration,
            25,
            r"\bvomit\w*\s+(all\s+day|for\s+(days|hours)|non[-\s]?stop|constantly|repeatedly)\b|\b(persistent|constant|continuous)\s+(vomit\w*|diarrh\w*)",
            "Persistent vomiting or diarrhea",
            SAME_DAY,
        ),
    ]
}

// ── Catalog ─────────────────────────────────────────────────

/// An ordered, immutable set of red-flag rules.
///
/// A catalog never changes after construction. Extending it produces a new
/// catalog with a new version string.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    version: String,
    rules: Vec<RedFlagRule>,
}

static STANDARD_CATALOG: LazyLock<RuleCatalog> = LazyLock::new(|| {
    RuleCatalog::from_definitions(BUILTIN_CATALOG_VERSION, builtin_definitions())
        .expect("Invalid built-in red-flag rule")
});

impl RuleCatalog {
    /// The built-in catalog, compiled once per process.
    pub fn standard() -> &'static RuleCatalog {
        &STANDARD_CATALOG
    }

    /// Compile and validate definitions. Ids must be unique.
    pub fn from_definitions(
        version: impl Into<String>,
        definitions: Vec<RuleDefinition>,
    ) -> Result<Self, TriageError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(definitions.len());
        for def in definitions {
            if !seen.insert(def.id.clone()) {
                return Err(TriageError::DuplicateRuleId(def.id));
            }
            rules.push(RedFlagRule::try_from(def)?);
        }
        Ok(Self {
            version: version.into(),
            rules,
        })
    }

    /// New catalog with `definitions` appended after the existing rules.
    pub fn extended_with(
        &self,
        extension_version: &str,
        definitions: Vec<RuleDefinition>,
    ) -> Result<Self, TriageError> {
        let mut rules = self.rules.clone();
        let mut seen: HashSet<String> = rules.iter().map(|r| r.id.clone()).collect();
        for def in definitions {
            if !seen.insert(def.id.clone()) {
                return Err(TriageError::DuplicateRuleId(def.id));
            }
            rules.push(RedFlagRule::try_from(def)?);
        }
        let version = format!("{}+{}", self.version, extension_version);
        tracing::info!(
            version = %version,
            rule_count = rules.len(),
            "Red-flag catalog extended"
        );
        Ok(Self { version, rules })
    }

    /// Extension from a JSON array of rule definitions.
    pub fn extend_from_json(
        &self,
        extension_version: &str,
        json: &str,
    ) -> Result<Self, TriageError> {
        let definitions: Vec<RuleDefinition> = serde_json::from_str(json)?;
        self.extended_with(extension_version, definitions)
    }

    /// Extension from a JSON file. The file stem becomes the extension version.
    pub fn extend_from_file(&self, path: &Path) -> Result<Self, TriageError> {
        let json = std::fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("extension");
        self.extend_from_json(stem, &json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &[RedFlagRule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&RedFlagRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ── Age groups ──────────────────────────────────────────────

/// Classify a numeric age in years.
/// Boundaries: infant <1, child 1-12, teen 13-17, adult 18-64, senior 65+.
pub fn age_group_from_age(age_in_years: f64) -> AgeGroup {
    if age_in_years < 1.0 {
        AgeGroup::Infant
    } else if age_in_years < 13.0 {
        AgeGroup::Child
    } else if age_in_years < 18.0 {
        AgeGroup::Teen
    } else if age_in_years < 65.0 {
        AgeGroup::Adult
    } else {
        AgeGroup::Senior
    }
}

/// Additive urgency score for an age group, with its rationale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeModifier {
    pub group: AgeGroup,
    pub score: u32,
    pub rationale: &'static str,
}

static AGE_MODIFIERS: &[AgeModifier] = &[
    AgeModifier {
        group: AgeGroup::Infant,
        score: 15,
        rationale: "Infants can deteriorate quickly and cannot describe symptoms",
    },
    AgeModifier {
        group: AgeGroup::Child,
        score: 8,
        rationale: "Children may become seriously ill faster than adults",
    },
    AgeModifier {
        group: AgeGroup::Teen,
        score: 0,
        rationale: "No age-related adjustment",
    },
    AgeModifier {
        group: AgeGroup::Adult,
        score: 0,
        rationale: "No age-related adjustment",
    },
    AgeModifier {
        group: AgeGroup::Senior,
        score: 12,
        rationale: "Older adults have a higher risk of complications and atypical presentations",
    },
];

pub fn age_modifier(group: AgeGroup) -> AgeModifier {
    AGE_MODIFIERS
        .iter()
        .copied()
        .find(|m| m.group == group)
        .unwrap_or(AgeModifier {
            group,
            score: 0,
            rationale: "No age-related adjustment",
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::triage::types::{MAX_URGENCY_BOOST, MIN_URGENCY_BOOST};

    #[test]
    fn standard_catalog_compiles() {
        let catalog = RuleCatalog::standard();
        assert!(catalog.len() >= 40, "catalog has {} rules", catalog.len());
        assert_eq!(catalog.version(), BUILTIN_CATALOG_VERSION);
    }

    #[test]
    fn standard_ids_are_unique() {
        let catalog = RuleCatalog::standard();
        let ids: HashSet<&str> = catalog.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn standard_boosts_within_range() {
        for rule in RuleCatalog::standard().rules() {
            assert!(
                (MIN_URGENCY_BOOST..=MAX_URGENCY_BOOST).contains(&rule.urgency_boost),
                "{} has boost {}",
                rule.id,
                rule.urgency_boost
            );
        }
    }

    #[test]
    fn every_category_is_covered() {
        let catalog = RuleCatalog::standard();
        for category in RuleCategory::all() {
            assert!(
                catalog.rules().iter().any(|r| r.category == *category),
                "no rule for {category}"
            );
        }
    }

    #[test]
    fn named_rules_have_expected_shape() {
        let catalog = RuleCatalog::standard();

        let breathe = catalog.get("respiratory_cant_breathe").unwrap();
        assert_eq!(breathe.urgency_boost, 50);
        assert!(breathe.requires_context.is_empty());

        let preg = catalog.get("preg_abdominal_pain").unwrap();
        assert_eq!(preg.urgency_boost, 50);
        assert_eq!(preg.requires_context, vec![ContextTag::Pregnancy]);

        let infant = catalog.get("peds_infant_fever_any").unwrap();
        assert_eq!(infant.urgency_boost, 50);
        assert_eq!(infant.requires_context, vec![ContextTag::Infant]);
        assert_eq!(infant.age_restriction, Some(AgeRestriction::max_years(0.25)));
    }

    #[test]
    fn rules_have_actions_and_descriptions() {
        for rule in RuleCatalog::standard().rules() {
            assert!(!rule.immediate_action.is_empty(), "{} has no action", rule.id);
            assert!(!rule.description.is_empty(), "{} has no description", rule.id);
        }
    }

    #[test]
    fn age_group_boundaries() {
        assert_eq!(age_group_from_age(0.0), AgeGroup::Infant);
        assert_eq!(age_group_from_age(0.99), AgeGroup::Infant);
        assert_eq!(age_group_from_age(1.0), AgeGroup::Child);
        assert_eq!(age_group_from_age(12.0), AgeGroup::Child);
        assert_eq!(age_group_from_age(13.0), AgeGroup::Teen);
        assert_eq!(age_group_from_age(17.0), AgeGroup::Teen);
        assert_eq!(age_group_from_age(18.0), AgeGroup::Adult);
        assert_eq!(age_group_from_age(64.0), AgeGroup::Adult);
        assert_eq!(age_group_from_age(65.0), AgeGroup::Senior);
        assert_eq!(age_group_from_age(90.0), AgeGroup::Senior);
    }

    #[test]
    fn age_modifier_table() {
        assert_eq!(age_modifier(AgeGroup::Infant).score, 15);
        assert_eq!(age_modifier(AgeGroup::Child).score, 8);
        assert_eq!(age_modifier(AgeGroup::Teen).score, 0);
        assert_eq!(age_modifier(AgeGroup::Adult).score, 0);
        assert_eq!(age_modifier(AgeGroup::Senior).score, 12);
        assert!(!age_modifier(AgeGroup::Senior).rationale.is_empty());
    }

    fn extra(id: &str) -> RuleDefinition {
        rule(
            id,
            RuleCategory::Infection,
            30,
            r"\btick\s+bite\b[^.]*\brash\b",
            "Rash after tick bite",
            SAME_DAY,
        )
    }

    #[test]
    fn extension_appends_and_versions() {
        let base = RuleCatalog::standard();
        let extended = base.extended_with("lyme-1", vec![extra("infection_tick_rash")]).unwrap();
        assert_eq!(extended.len(), base.len() + 1);
        assert_eq!(extended.version(), format!("{BUILTIN_CATALOG_VERSION}+lyme-1"));
        assert_eq!(extended.rules().last().unwrap().id, "infection_tick_rash");
        // the base catalog is untouched
        assert!(base.get("infection_tick_rash").is_none());
    }

    #[test]
    fn extension_rejects_duplicate_id() {
        let err = RuleCatalog::standard()
            .extended_with("dup", vec![extra("respiratory_cant_breathe")])
            .unwrap_err();
        assert!(matches!(err, TriageError::DuplicateRuleId(id) if id == "respiratory_cant_breathe"));
    }

    #[test]
    fn from_definitions_rejects_duplicates() {
        let err = RuleCatalog::from_definitions("t", vec![extra("a"), extra("a")]).unwrap_err();
        assert!(matches!(err, TriageError::DuplicateRuleId(_)));
    }

    #[test]
    fn extension_from_json() {
        let json = r#"[{
            "id": "senior_new_incontinence",
            "pattern": "sudden(ly)?\\s+incontinen",
            "category": "neurological",
            "urgency_boost": 25,
            "requires_context": ["senior"],
            "immediate_action": "Contact a doctor today.",
            "description": "New incontinence in an older adult"
        }]"#;
        let extended = RuleCatalog::standard().extend_from_json("local", json).unwrap();
        let rule = extended.get("senior_new_incontinence").unwrap();
        assert_eq!(rule.requires_context, vec![ContextTag::Senior]);
        assert_eq!(rule.category, RuleCategory::Neurological);
    }

    #[test]
    fn extension_from_file_uses_stem_as_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic-2026.json");
        let mut file = std::fs::File::create(&path).unwrap();
        let defs = vec![extra("infection_tick_rash")];
        file.write_all(serde_json::to_string(&defs).unwrap().as_bytes()).unwrap();

        let extended = RuleCatalog::standard().extend_from_file(&path).unwrap();
        assert!(extended.version().ends_with("+clinic-2026"));
        assert!(extended.get("infection_tick_rash").is_some());
    }

    #[test]
    fn missing_extension_file_is_io_error() {
        let err = RuleCatalog::standard()
            .extend_from_file(Path::new("/nonexistent/rules.json"))
            .unwrap_err();
        assert!(matches!(err, TriageError::Io(_)));
    }
}
