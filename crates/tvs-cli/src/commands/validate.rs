use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tvs_criteria::{validate_criteria, TargetingCriteria};
use tvs_fields::load_document;

use super::io::{emit, load_catalog};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Field definitions (YAML or JSON).
    #[arg(long)]
    pub fields: PathBuf,
    /// Targeting criteria (YAML or JSON).
    #[arg(long)]
    pub criteria: PathBuf,
}

#[derive(Debug, Serialize)]
struct Verdict {
    status: &'static str,
    household_blocks: usize,
    individual_blocks: usize,
    predicates: usize,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(&args.fields)?;
    let criteria: TargetingCriteria = load_document(&args.criteria)?;
    let compiled = validate_criteria(&criteria, &catalog)?;
    emit(
        &Verdict {
            status: "ok",
            household_blocks: criteria.household_blocks.len(),
            individual_blocks: criteria.individual_blocks.len(),
            predicates: compiled.predicate_count(),
        },
        None,
    )?;
    Ok(())
}
