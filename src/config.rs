use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Symptom Triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming a JSON file of extra red-flag rules.
/// The rules are appended to the built-in catalog at startup.
pub const RULES_ENV_VAR: &str = "SYMPTOM_TRIAGE_RULES";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "symptom_triage_lib=debug,symptom_triage=debug,info"
    } else {
        "symptom_triage_lib=info,symptom_triage=info,warn"
    }
}

/// Path of the rule extension file, if configured.
pub fn extra_rules_path() -> Option<PathBuf> {
    std::env::var_os(RULES_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_set() {
        assert_eq!(APP_NAME, "Symptom Triage");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_filter_targets_this_crate() {
        assert!(default_log_filter().contains("symptom_triage_lib="));
    }
}
