//! `vendorbook-recon`: import reconciliation.
//!
//! Analyze is a pure diff of uploaded rows against a store snapshot. Apply
//! writes the approved part of that diff back as one batch. The plan between
//! the two is a plain value the caller keeps (see [`ImportPlan::save`]).

pub mod classify;
pub mod dedupe;
pub mod engine;
pub mod error;
pub mod model;

pub use dedupe::dedupe_last;
pub use engine::{analyze, apply, diff};
pub use error::ReconError;
pub use model::{
    AmbiguousMatch, ApplyOutcome, Approval, ConflictCandidate, ImportPlan, PlanSummary,
    UnchangedRow,
};
