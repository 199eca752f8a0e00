#![deny(missing_docs)]
#![doc = "Shared identifiers, error taxonomy and deterministic primitives for the targeting and verification sampling engine."]

pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
mod ids;
pub mod provenance;
pub mod rng;
/// Canonical JSON serde helpers.
pub mod serde;

pub use errors::{ErrorInfo, ErrorKind, TvsError};
pub use hash::stable_hash_string;
pub use ids::{AreaId, EntityId, EntityKind};
pub use provenance::{PlanProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle, SAMPLING_SUBSTREAM};
