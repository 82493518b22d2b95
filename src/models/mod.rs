pub mod enums;
pub mod health_context;

pub use enums::*;
pub use health_context::HealthContext;
