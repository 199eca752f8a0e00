use chrono::{DateTime, Utc};
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_criteria::{select_households, Household, TargetingCriteria};
use tvs_fields::{FieldCatalog, FieldRegistry};
use tvs_sampling::{
    plan_with_context, PlanContext, SamplingCandidate, SamplingParameters, SamplingType,
    VerificationPlan,
};

use crate::candidates::candidate_for;

/// Selects the target population and samples it into a verification plan
/// stamped with the current time.
pub fn build(
    criteria: &TargetingCriteria,
    sampling: &SamplingParameters,
    households: &[Household],
    catalog: &FieldCatalog,
) -> Result<VerificationPlan, TvsError> {
    build_at(criteria, sampling, households, catalog, Utc::now())
}

/// Same as [`build`] with an explicit creation timestamp.
///
/// Sampling parameters are checked before selection so an invalid request
/// does no work. An empty selection still yields a valid, empty plan.
pub fn build_at(
    criteria: &TargetingCriteria,
    sampling: &SamplingParameters,
    households: &[Household],
    catalog: &FieldCatalog,
    created_at: DateTime<Utc>,
) -> Result<VerificationPlan, TvsError> {
    sampling.validate()?;
    let selected = select_households(criteria, households, catalog)?;
    let candidates = selected
        .into_iter()
        .map(candidate_for)
        .collect::<Result<Vec<SamplingCandidate>, _>>()?;
    let echo = serde_json::to_value(criteria).map_err(|err| {
        TvsError::Serde(ErrorInfo::new("criteria_echo", err.to_string()))
    })?;
    let context = PlanContext {
        created_at,
        criteria: Some(echo),
    };
    let plan = plan_with_context(sampling, &candidates, context)?;
    check_invariants(&plan, criteria)?;
    tracing::debug!(
        households = households.len(),
        selected = candidates.len(),
        eligible = plan.eligible_population_size(),
        sampled = plan.sample_size(),
        "verification plan assembled"
    );
    Ok(plan)
}

/// Plan builder bound to a field registry.
///
/// Each build takes one catalog snapshot and uses it throughout, so a
/// concurrent reload never changes the catalog mid-build.
#[derive(Debug, Clone, Default)]
pub struct PlanAssembler {
    registry: FieldRegistry,
}

impl PlanAssembler {
    /// Creates an assembler reading fields from `registry`.
    pub fn new(registry: FieldRegistry) -> Self {
        Self { registry }
    }

    /// Registry the assembler resolves fields against.
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Builds a plan against the current catalog snapshot.
    pub fn build(
        &self,
        criteria: &TargetingCriteria,
        sampling: &SamplingParameters,
        households: &[Household],
    ) -> Result<VerificationPlan, TvsError> {
        let catalog = self.registry.snapshot();
        build(criteria, sampling, households, &catalog)
    }

    /// Builds a plan against the current catalog snapshot with an explicit
    /// creation timestamp.
    pub fn build_at(
        &self,
        criteria: &TargetingCriteria,
        sampling: &SamplingParameters,
        households: &[Household],
        created_at: DateTime<Utc>,
    ) -> Result<VerificationPlan, TvsError> {
        let catalog = self.registry.snapshot();
        build_at(criteria, sampling, households, &catalog, created_at)
    }
}

fn check_invariants(
    plan: &VerificationPlan,
    criteria: &TargetingCriteria,
) -> Result<(), TvsError> {
    let parameters = plan.parameters();
    let eligible = plan.eligible_population_size();
    let size = plan.sample_size();
    if size > eligible {
        return Err(violation(
            "sample_exceeds_population",
            &[("sample_size", size.to_string()), ("eligible", eligible.to_string())],
        ));
    }
    if parameters.sampling_type == SamplingType::Random && eligible >= 1 && size == 0 {
        return Err(violation(
            "empty_random_sample",
            &[("eligible", eligible.to_string())],
        ));
    }
    let excluded = plan.sampled_ids().iter().find(|id| {
        parameters.excluded_record_ids.contains(*id)
            || criteria.excluded_household_ids.contains(*id)
    });
    if let Some(id) = excluded {
        return Err(violation(
            "excluded_id_sampled",
            &[("record", id.to_string())],
        ));
    }
    Ok(())
}

fn violation(code: &str, context: &[(&str, String)]) -> TvsError {
    let info = context.iter().fold(
        ErrorInfo::new(code, format!("verification plan violates `{code}`")),
        |info, (key, value)| info.with_context(*key, value.as_str()),
    );
    TvsError::InvalidSamplingParameters(info)
}
