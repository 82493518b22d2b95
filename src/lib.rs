pub mod config;
pub mod models;
pub mod triage;

use tracing_subscriber::EnvFilter;

pub use models::{CrisisType, HealthContext, UrgencyLevel};
pub use triage::{TriageEngine, TriageError, TriageReport, TriageService};

/// Install the global tracing subscriber. Logs go to stderr so stdout stays
/// free for machine-readable output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}
