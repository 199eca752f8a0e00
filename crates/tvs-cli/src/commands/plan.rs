use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use tvs_criteria::TargetingCriteria;
use tvs_fields::load_document;
use tvs_sampling::SamplingParameters;

use super::io::{emit, load_catalog, load_population};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Field definitions (YAML or JSON).
    #[arg(long)]
    pub fields: PathBuf,
    /// Household population (JSON).
    #[arg(long)]
    pub population: PathBuf,
    /// Targeting criteria (YAML or JSON).
    #[arg(long)]
    pub criteria: PathBuf,
    /// Sampling parameters (YAML or JSON).
    #[arg(long)]
    pub sampling: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &PlanArgs) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(&args.fields)?;
    let households = load_population(&args.population)?;
    let criteria: TargetingCriteria = load_document(&args.criteria)?;
    let sampling: SamplingParameters = load_document(&args.sampling)?;
    let plan = tvs_plan::build(&criteria, &sampling, &households, &catalog)?;
    tracing::info!(
        eligible = plan.eligible_population_size(),
        sampled = plan.sample_size(),
        "verification plan built"
    );
    emit(&plan, args.out.as_deref())?;
    Ok(())
}
