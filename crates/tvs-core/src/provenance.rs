//! Provenance and schema descriptors attached to verification plans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every verification plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProvenance {
    /// Schema of the serialized plan.
    pub schema_version: SchemaVersion,
    /// Canonical hash of the targeting criteria, empty when the plan was
    /// sampled from a pre-selected population.
    #[serde(default)]
    pub criteria_hash: String,
    /// Canonical hash of the filtered sampling population (ids in order).
    pub population_hash: String,
    /// Master seed used for random selection.
    pub seed: u64,
    /// Timestamp recording when the plan was created.
    pub created_at: DateTime<Utc>,
}
