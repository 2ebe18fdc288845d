// Alert derivation for environmental signals.
//
// Architecture:
// - model.rs: Alert, AlertKind and Severity types
// - severity.rs: Threshold banding and unit helpers
// - guidance.rs: Fixed guidance templates and action lists
// - triggers.rs: One rule per alert kind
// - engine.rs: Runs the rules in order

pub mod engine;
pub mod guidance;
pub mod model;
pub mod severity;
pub mod triggers;

pub use engine::{derive_alerts, highest_severity, sort_by_severity};
pub use model::{Alert, AlertKind, Severity};
