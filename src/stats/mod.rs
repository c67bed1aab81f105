//! Estimators and diagnostics computed from a simulated outbreak

mod phases;
mod reproduction;

pub use phases::{PhaseDiagnostics, PhaseStatistics};
pub use reproduction::ReproductionNumber;
