use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_core::{EntityId, PlanProvenance};

use crate::params::SamplingParameters;
use crate::stratify::StratificationReport;

/// Lifecycle state of a verification plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    /// Created, not yet collecting responses.
    Draft,
    /// Collecting verification responses.
    Active,
    /// Verification completed.
    Finished,
    /// Abandoned before completion.
    Discarded,
}

impl PlanStatus {
    /// Returns true for states that admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, PlanStatus::Finished | PlanStatus::Discarded)
    }

    fn can_become(self, next: PlanStatus) -> bool {
        matches!(
            (self, next),
            (PlanStatus::Draft, PlanStatus::Active)
                | (PlanStatus::Active, PlanStatus::Finished)
                | (PlanStatus::Draft, PlanStatus::Discarded)
                | (PlanStatus::Active, PlanStatus::Discarded)
        )
    }
}

impl Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanStatus::Draft => "DRAFT",
            PlanStatus::Active => "ACTIVE",
            PlanStatus::Finished => "FINISHED",
            PlanStatus::Discarded => "DISCARDED",
        };
        f.write_str(label)
    }
}

/// Finalized verification sample.
///
/// Everything except the status is fixed at creation; the status moves only
/// through [`activate`](Self::activate), [`finish`](Self::finish) and
/// [`discard`](Self::discard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationPlan {
    eligible_population_size: usize,
    sample_size: usize,
    sampled_ids: Vec<EntityId>,
    parameters: SamplingParameters,
    created_at: DateTime<Utc>,
    status: PlanStatus,
    stratification: StratificationReport,
    provenance: PlanProvenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    criteria: Option<Value>,
}

impl VerificationPlan {
    pub(crate) fn new(
        eligible_population_size: usize,
        sampled_ids: Vec<EntityId>,
        parameters: SamplingParameters,
        stratification: StratificationReport,
        provenance: PlanProvenance,
        criteria: Option<Value>,
    ) -> Self {
        Self {
            eligible_population_size,
            sample_size: sampled_ids.len(),
            sampled_ids,
            parameters,
            created_at: provenance.created_at,
            status: PlanStatus::Draft,
            stratification,
            provenance,
            criteria,
        }
    }

    /// Size of the population after stratification.
    pub fn eligible_population_size(&self) -> usize {
        self.eligible_population_size
    }

    /// Number of sampled records.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Sampled ids in canonical order.
    pub fn sampled_ids(&self) -> &[EntityId] {
        &self.sampled_ids
    }

    /// Parameters the plan was built from.
    pub fn parameters(&self) -> &SamplingParameters {
        &self.parameters
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current lifecycle state.
    pub fn status(&self) -> PlanStatus {
        self.status
    }

    /// Per-filter removal counts.
    pub fn stratification(&self) -> &StratificationReport {
        &self.stratification
    }

    /// Hashes, seed and schema of the plan.
    pub fn provenance(&self) -> &PlanProvenance {
        &self.provenance
    }

    /// Echo of the targeting criteria that selected the population.
    pub fn criteria(&self) -> Option<&Value> {
        self.criteria.as_ref()
    }

    /// Only active plans accept verification responses.
    pub fn can_receive_responses(&self) -> bool {
        self.status == PlanStatus::Active
    }

    /// `DRAFT -> ACTIVE`.
    pub fn activate(&mut self) -> Result<(), TvsError> {
        self.transition(PlanStatus::Active)
    }

    /// `ACTIVE -> FINISHED`.
    pub fn finish(&mut self) -> Result<(), TvsError> {
        self.transition(PlanStatus::Finished)
    }

    /// `DRAFT | ACTIVE -> DISCARDED`.
    pub fn discard(&mut self) -> Result<(), TvsError> {
        self.transition(PlanStatus::Discarded)
    }

    fn transition(&mut self, next: PlanStatus) -> Result<(), TvsError> {
        if !self.status.can_become(next) {
            return Err(TvsError::InvalidTransition(
                ErrorInfo::new(
                    "plan_status",
                    format!("cannot move a {} plan to {next}", self.status),
                )
                .with_context("from", self.status.to_string())
                .with_context("to", next.to_string()),
            ));
        }
        tracing::debug!(from = %self.status, to = %next, "verification plan status changed");
        self.status = next;
        Ok(())
    }
}
