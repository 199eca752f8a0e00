#![deny(missing_docs)]
#![doc = "Verification sampling: sample sizing, stratification and reproducible selection."]

/// Sampling request vocabulary.
pub mod params;
/// Verification plan and its lifecycle.
pub mod plan;
/// Plan construction.
pub mod planner;
/// Sample-size formula.
pub mod size;
/// Population stratification filters.
pub mod stratify;

pub use params::{AgeFilter, SamplingParameters, SamplingType, Sex, SexFilter, CONFIDENCE_LEVELS};
pub use plan::{PlanStatus, VerificationPlan};
pub use planner::{plan, plan_with_context, PlanContext};
pub use size::{sample_size, z_score};
pub use stratify::{stratify, SamplingCandidate, StratificationReport};
