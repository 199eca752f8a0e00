#![deny(missing_docs)]
#![doc = "Predicate evaluation and OR-of-AND targeting criteria selection over household populations."]

/// Population selection.
pub mod composer;
/// Criteria blocks and validation.
pub mod criteria;
/// Single-predicate evaluation.
pub mod predicate;
/// Flattened household and individual records.
pub mod record;
pub mod value;

pub use composer::{household_matches, select, select_households};
pub use criteria::{validate_criteria, CompiledCriteria, CriteriaBlock, TargetingCriteria};
pub use predicate::{evaluate, CompiledPredicate, Predicate};
pub use record::{AttributeSource, EntityRecord, Household, PeriodicValues, RoundValue};
pub use value::{coerce_scalar, coerce_stored, Scalar};
