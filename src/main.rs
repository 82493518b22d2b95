use std::io::Read;
use std::path::{Path, PathBuf};

use symptom_triage_lib::config;
use symptom_triage_lib::triage::RuleCatalog;
use symptom_triage_lib::{HealthContext, TriageEngine, TriageError, TriageService};

/// Reads one `HealthContext` JSON document from the path given as the first
/// argument (or stdin when absent or `-`) and prints the triage report.
fn main() -> Result<(), TriageError> {
    symptom_triage_lib::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let engine = build_engine()?;
    let input = std::env::args_os().nth(1).map(PathBuf::from);
    let ctx = read_context(input.as_deref())?;

    let report = engine.evaluate(&ctx);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_engine() -> Result<TriageEngine, TriageError> {
    let catalog = match config::extra_rules_path() {
        Some(path) => RuleCatalog::standard().extend_from_file(&path)?,
        None => RuleCatalog::standard().clone(),
    };
    tracing::info!(
        version = catalog.version(),
        rule_count = catalog.len(),
        "Red-flag catalog loaded"
    );
    Ok(TriageEngine::with_catalog(catalog))
}

fn read_context(path: Option<&Path>) -> Result<HealthContext, TriageError> {
    let json = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    HealthContext::from_json(&json)
}
