//! Persistence of submitted plans for auditing.
//!
//! Storing a plan is best effort: failures are logged and never change the
//! flamegraph that was already produced.

pub mod audit;

pub use audit::{persist_in_background, JsonlPlanStore, PlanRecord, PlanStore};
