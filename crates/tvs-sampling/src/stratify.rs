use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tvs_core::{AreaId, EntityId};

use crate::params::{Sex, SamplingParameters};

/// One eligible record with the attributes used for stratification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingCandidate {
    /// Record identifier.
    pub id: EntityId,
    /// Age of the head of household in years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Sex of the head of household.
    #[serde(default)]
    pub sex: Option<Sex>,
    /// Administrative area of the record.
    #[serde(default)]
    pub admin_area: Option<AreaId>,
}

impl SamplingCandidate {
    /// Creates a candidate without stratification attributes.
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            age: None,
            sex: None,
            admin_area: None,
        }
    }
}

/// Number of candidates removed by each filter stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StratificationReport {
    /// Candidates received, after removing duplicate ids.
    pub received: usize,
    /// Removed by the age filter.
    pub removed_by_age: usize,
    /// Removed by the sex filter.
    pub removed_by_sex: usize,
    /// Removed because their area is excluded.
    pub removed_by_area: usize,
    /// Removed because their id is excluded.
    pub removed_by_id: usize,
}

/// Applies the age, sex, area and id filters in that order and returns the
/// surviving ids in canonical (sorted) order. Duplicate ids keep their first
/// occurrence.
pub fn stratify(
    parameters: &SamplingParameters,
    eligible: &[SamplingCandidate],
) -> (Vec<EntityId>, StratificationReport) {
    let mut seen = BTreeSet::new();
    let mut remaining: Vec<&SamplingCandidate> = eligible
        .iter()
        .filter(|candidate| seen.insert(&candidate.id))
        .collect();
    let mut report = StratificationReport {
        received: remaining.len(),
        ..StratificationReport::default()
    };

    if let Some(age) = &parameters.age_filter {
        report.removed_by_age = retain_counting(&mut remaining, |c| age.admits(c.age));
    }
    if let Some(sex) = parameters.sex_filter {
        report.removed_by_sex = retain_counting(&mut remaining, |c| sex.admits(c.sex));
    }
    if !parameters.excluded_admin_areas.is_empty() {
        report.removed_by_area = retain_counting(&mut remaining, |c| {
            c.admin_area
                .as_ref()
                .map_or(true, |area| !parameters.excluded_admin_areas.contains(area))
        });
    }
    if !parameters.excluded_record_ids.is_empty() {
        report.removed_by_id = retain_counting(&mut remaining, |c| {
            !parameters.excluded_record_ids.contains(&c.id)
        });
    }

    let mut ids: Vec<EntityId> = remaining.into_iter().map(|c| c.id.clone()).collect();
    ids.sort();
    (ids, report)
}

fn retain_counting<F>(candidates: &mut Vec<&SamplingCandidate>, keep: F) -> usize
where
    F: Fn(&SamplingCandidate) -> bool,
{
    let before = candidates.len();
    candidates.retain(|candidate| keep(candidate));
    before - candidates.len()
}
