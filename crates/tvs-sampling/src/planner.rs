use chrono::{DateTime, Utc};
use rand::seq::index;
use serde_json::Value;
use tvs_core::errors::TvsError;
use tvs_core::{
    stable_hash_string, EntityId, PlanProvenance, RngHandle, SchemaVersion, SAMPLING_SUBSTREAM,
};

use crate::params::SamplingParameters;
use crate::plan::VerificationPlan;
use crate::size::sample_size;
use crate::stratify::{stratify, SamplingCandidate};

/// Creation context supplied by the caller instead of ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanContext {
    /// Timestamp recorded on the plan.
    pub created_at: DateTime<Utc>,
    /// Criteria echo, hashed into the provenance.
    pub criteria: Option<Value>,
}

impl PlanContext {
    /// Context stamped with the current time and no criteria echo.
    pub fn now() -> Self {
        Self {
            created_at: Utc::now(),
            criteria: None,
        }
    }
}

/// Builds a verification plan stamped with the current time.
pub fn plan(
    parameters: &SamplingParameters,
    eligible: &[SamplingCandidate],
) -> Result<VerificationPlan, TvsError> {
    plan_with_context(parameters, eligible, PlanContext::now())
}

/// Builds a verification plan.
///
/// Parameters are validated before any work so an invalid request creates no
/// plan. The eligible set is stratified, then either taken whole (full list)
/// or sampled without replacement from a stream derived from
/// `parameters.seed`. Sampled ids are returned in canonical order.
pub fn plan_with_context(
    parameters: &SamplingParameters,
    eligible: &[SamplingCandidate],
    context: PlanContext,
) -> Result<VerificationPlan, TvsError> {
    let random = parameters.validate()?;
    let (population, stratification) = stratify(parameters, eligible);
    let population_size = population.len();
    let sampled_ids = match random {
        None => population.clone(),
        Some((confidence, margin)) => {
            let size = sample_size(confidence, margin, population_size)?;
            draw(&population, size, parameters.seed)
        }
    };
    let criteria_hash = match &context.criteria {
        Some(criteria) => stable_hash_string(criteria)?,
        None => String::new(),
    };
    let provenance = PlanProvenance {
        schema_version: SchemaVersion::default(),
        criteria_hash,
        population_hash: stable_hash_string(&population)?,
        seed: parameters.seed,
        created_at: context.created_at,
    };
    tracing::debug!(
        sampling = ?parameters.sampling_type,
        received = stratification.received,
        eligible = population_size,
        sampled = sampled_ids.len(),
        "verification plan built"
    );
    Ok(VerificationPlan::new(
        population_size,
        sampled_ids,
        parameters.clone(),
        stratification,
        provenance,
        context.criteria,
    ))
}

fn draw(population: &[EntityId], size: usize, seed: u64) -> Vec<EntityId> {
    let mut rng = RngHandle::for_substream(seed, SAMPLING_SUBSTREAM);
    let mut picked: Vec<EntityId> = index::sample(&mut rng, population.len(), size)
        .into_iter()
        .map(|idx| population[idx].clone())
        .collect();
    picked.sort();
    picked
}
