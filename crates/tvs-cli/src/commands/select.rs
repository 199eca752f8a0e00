use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tvs_core::EntityId;
use tvs_criteria::{select, TargetingCriteria};
use tvs_fields::load_document;

use super::io::{emit, load_catalog, load_population};

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Field definitions (YAML or JSON).
    #[arg(long)]
    pub fields: PathBuf,
    /// Household population (JSON).
    #[arg(long)]
    pub population: PathBuf,
    /// Targeting criteria (YAML or JSON).
    #[arg(long)]
    pub criteria: PathBuf,
    /// Output file; stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Selection {
    count: usize,
    selected: Vec<EntityId>,
}

pub fn run(args: &SelectArgs) -> Result<(), Box<dyn Error>> {
    let catalog = load_catalog(&args.fields)?;
    let households = load_population(&args.population)?;
    let criteria: TargetingCriteria = load_document(&args.criteria)?;
    let selected: Vec<EntityId> = select(&criteria, &households, &catalog)?.into_iter().collect();
    tracing::info!(selected = selected.len(), "selection complete");
    emit(
        &Selection {
            count: selected.len(),
            selected,
        },
        args.out.as_deref(),
    )?;
    Ok(())
}
