use std::collections::BTreeSet;

use tvs_core::errors::TvsError;
use tvs_core::EntityId;
use tvs_fields::FieldCatalog;

use crate::criteria::{any_block, validate_criteria, CompiledCriteria, TargetingCriteria};
use crate::record::Household;

/// Selects the ids of every household matching `criteria`.
///
/// Selection is all-or-nothing: the first evaluation error aborts it.
pub fn select(
    criteria: &TargetingCriteria,
    households: &[Household],
    catalog: &FieldCatalog,
) -> Result<BTreeSet<EntityId>, TvsError> {
    Ok(select_households(criteria, households, catalog)?
        .into_iter()
        .map(|household| household.id.clone())
        .collect())
}

/// Returns the matching households in input order.
pub fn select_households<'a>(
    criteria: &TargetingCriteria,
    households: &'a [Household],
    catalog: &FieldCatalog,
) -> Result<Vec<&'a Household>, TvsError> {
    let compiled = validate_criteria(criteria, catalog)?;
    let mut selected = Vec::new();
    for household in households {
        if household_matches(&compiled, household)? {
            selected.push(household);
        }
    }
    tracing::debug!(
        households = households.len(),
        predicates = compiled.predicate_count(),
        selected = selected.len(),
        "targeting selection complete"
    );
    Ok(selected)
}

/// Evaluates compiled criteria against one household.
///
/// Excluded ids are rejected without evaluation and explicitly targeted ids
/// are accepted without evaluation. With no blocks, every household matches
/// unless explicit ids are given, in which case only those match. An empty
/// household block list places no household-level restriction.
pub fn household_matches(
    criteria: &CompiledCriteria,
    household: &Household,
) -> Result<bool, TvsError> {
    if criteria.excluded_household_ids.contains(&household.id) {
        return Ok(false);
    }
    if criteria.household_ids.contains(&household.id) {
        return Ok(true);
    }
    if criteria.household_blocks.is_empty() && criteria.individual_blocks.is_empty() {
        return Ok(criteria.household_ids.is_empty());
    }
    if !criteria.household_blocks.is_empty()
        && !any_block(&criteria.household_blocks, household)?
    {
        return Ok(false);
    }
    if criteria.individual_blocks.is_empty() {
        return Ok(true);
    }
    for member in &household.members {
        if any_block(&criteria.individual_blocks, member)? {
            return Ok(true);
        }
    }
    Ok(false)
}
