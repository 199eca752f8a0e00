use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tvs_core::errors::{ErrorInfo, TvsError};
use tvs_core::{EntityId, EntityKind};
use tvs_fields::FieldCatalog;

use crate::predicate::{CompiledPredicate, Predicate};
use crate::record::AttributeSource;

/// Predicates that must all hold for a record to match (logical AND).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaBlock {
    /// Entity kind the block is evaluated against.
    pub kind: EntityKind,
    /// Predicates evaluated left to right.
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}

impl CriteriaBlock {
    /// Creates a household-scoped block.
    pub fn household(predicates: Vec<Predicate>) -> Self {
        Self {
            kind: EntityKind::Household,
            predicates,
        }
    }

    /// Creates an individual-scoped block.
    pub fn individual(predicates: Vec<Predicate>) -> Self {
        Self {
            kind: EntityKind::Individual,
            predicates,
        }
    }
}

/// Disjunction of household blocks and of individual blocks, plus explicit
/// id targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TargetingCriteria {
    /// Household-scoped blocks, OR-ed together.
    #[serde(default)]
    pub household_blocks: Vec<CriteriaBlock>,
    /// Individual-scoped blocks, OR-ed together; a household needs one
    /// matching member when non-empty.
    #[serde(default)]
    pub individual_blocks: Vec<CriteriaBlock>,
    /// Households targeted explicitly in addition to block matches.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub household_ids: BTreeSet<EntityId>,
    /// Households never selected.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub excluded_household_ids: BTreeSet<EntityId>,
}

impl TargetingCriteria {
    /// Returns true when no blocks are declared.
    pub fn has_no_blocks(&self) -> bool {
        self.household_blocks.is_empty() && self.individual_blocks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledBlock {
    predicates: Vec<CompiledPredicate>,
}

impl CompiledBlock {
    /// AND with left-to-right short circuit.
    pub(crate) fn matches<R: AttributeSource + ?Sized>(
        &self,
        record: &R,
    ) -> Result<bool, TvsError> {
        for predicate in &self.predicates {
            if !predicate.evaluate(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// OR across blocks in declaration order, stopping at the first match.
pub(crate) fn any_block<R: AttributeSource + ?Sized>(
    blocks: &[CompiledBlock],
    record: &R,
) -> Result<bool, TvsError> {
    for block in blocks {
        if block.matches(record)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Criteria validated against a catalog snapshot.
#[derive(Debug, Clone)]
pub struct CompiledCriteria {
    pub(crate) household_blocks: Vec<CompiledBlock>,
    pub(crate) individual_blocks: Vec<CompiledBlock>,
    pub(crate) household_ids: BTreeSet<EntityId>,
    pub(crate) excluded_household_ids: BTreeSet<EntityId>,
}

impl CompiledCriteria {
    /// Number of predicates across all blocks.
    pub fn predicate_count(&self) -> usize {
        self.household_blocks
            .iter()
            .chain(&self.individual_blocks)
            .map(|block| block.predicates.len())
            .sum()
    }
}

/// Validates every block and predicate of `criteria` against `catalog`.
///
/// Checks field existence, operator registration, round numbers, argument
/// types and arity, range bounds, and that each block's fields belong to the
/// block's entity kind. Fails on the first problem found.
pub fn validate_criteria(
    criteria: &TargetingCriteria,
    catalog: &FieldCatalog,
) -> Result<CompiledCriteria, TvsError> {
    Ok(CompiledCriteria {
        household_blocks: compile_blocks(
            &criteria.household_blocks,
            EntityKind::Household,
            catalog,
        )?,
        individual_blocks: compile_blocks(
            &criteria.individual_blocks,
            EntityKind::Individual,
            catalog,
        )?,
        household_ids: criteria.household_ids.clone(),
        excluded_household_ids: criteria.excluded_household_ids.clone(),
    })
}

fn compile_blocks(
    blocks: &[CriteriaBlock],
    expected: EntityKind,
    catalog: &FieldCatalog,
) -> Result<Vec<CompiledBlock>, TvsError> {
    let mut compiled = Vec::with_capacity(blocks.len());
    for (block_idx, block) in blocks.iter().enumerate() {
        if block.kind != expected {
            return Err(TvsError::InvalidPredicate(
                ErrorInfo::new(
                    "block_kind_mismatch",
                    format!("{} block listed among {expected} blocks", block.kind),
                )
                .with_context("block", block_idx.to_string()),
            ));
        }
        let mut predicates = Vec::with_capacity(block.predicates.len());
        for predicate in &block.predicates {
            let compiled_predicate = CompiledPredicate::compile(predicate, catalog)?;
            let scope = compiled_predicate.field().associated_with;
            if scope != block.kind {
                return Err(TvsError::InvalidPredicate(
                    ErrorInfo::new(
                        "field_scope_mismatch",
                        format!(
                            "{scope} field `{}` used in a {} block",
                            predicate.field_name, block.kind
                        ),
                    )
                    .with_context("field", predicate.field_name.as_str())
                    .with_context("block", block_idx.to_string()),
                ));
            }
            predicates.push(compiled_predicate);
        }
        compiled.push(CompiledBlock { predicates });
    }
    Ok(compiled)
}
