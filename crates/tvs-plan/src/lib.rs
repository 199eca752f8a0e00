#![deny(missing_docs)]
#![doc = "Plan assembly: targeting selection followed by verification sampling."]

/// Selection and sampling composition.
pub mod assembler;
/// Household to sampling-candidate projection.
pub mod candidates;

pub use assembler::{build, build_at, PlanAssembler};
pub use candidates::{candidate_for, AGE_ATTRIBUTE, SEX_ATTRIBUTE};
