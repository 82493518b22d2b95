use serde::{Deserialize, Serialize};

use crate::triage::types::TriageError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variant order is the declared order, so `Ord` follows it.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// All variants in declared order.
            pub fn all() -> &'static [Self] {
                &[$(Self::$variant),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = TriageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(TriageError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Discrete triage level, ordered from least to most urgent.
    UrgencyLevel {
        SelfCare => "self_care",
        Monitor => "monitor",
        NonUrgent => "non_urgent",
        Soon => "soon",
        Urgent => "urgent",
        Emergency => "emergency",
    }
);

str_enum!(RuleCategory {
    Cardiac => "cardiac",
    Respiratory => "respiratory",
    Neurological => "neurological",
    Bleeding => "bleeding",
    MentalHealth => "mental_health",
    Allergic => "allergic",
    Trauma => "trauma",
    Pediatric => "pediatric",
    Pregnancy => "pregnancy",
    Infection => "infection",
    Dehydration => "dehydration",
});

str_enum!(
    /// Patient context a rule may require before it is allowed to fire.
    ContextTag {
        Pregnancy => "pregnancy",
        Infant => "infant",
        Child => "child",
        Senior => "senior",
    }
);

str_enum!(AgeGroup {
    Infant => "infant",
    Child => "child",
    Teen => "teen",
    Adult => "adult",
    Senior => "senior",
});

str_enum!(SymptomDuration {
    JustNow => "just_now",
    FewHours => "few_hours",
    Today => "today",
    FewDays => "few_days",
    OneToTwoWeeks => "1_2_weeks",
    MoreThanTwoWeeks => "more_than_2_weeks",
    Chronic => "chronic",
});

str_enum!(SymptomFrequency {
    Once => "once",
    Occasional => "occasional",
    Intermittent => "intermittent",
    Frequent => "frequent",
    Constant => "constant",
});

str_enum!(
    /// Self-harm-adjacent disclosure category. Handled outside scoring.
    CrisisType {
        Suicide => "suicide",
        SelfHarm => "self_harm",
        Overdose => "overdose",
        None => "none",
    }
);

impl UrgencyLevel {
    /// Patient-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelfCare => "Self-care at home",
            Self::Monitor => "Monitor your symptoms",
            Self::NonUrgent => "See a doctor when convenient",
            Self::Soon => "See a doctor within 24-48 hours",
            Self::Urgent => "Seek medical care today",
            Self::Emergency => "Call emergency services now",
        }
    }

    /// Home remedies, OTC and herbal suggestions are withheld at these levels.
    pub fn suppresses_self_care_guidance(&self) -> bool {
        *self >= Self::Urgent
    }

    pub fn shows_emergency_messaging(&self) -> bool {
        *self == Self::Emergency
    }
}

impl AgeGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Infant => "Infant",
            Self::Child => "Child",
            Self::Teen => "Teen",
            Self::Adult => "Adult",
            Self::Senior => "Senior",
        }
    }
}
