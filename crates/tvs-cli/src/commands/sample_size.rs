use std::error::Error;

use clap::Args;
use serde::Serialize;
use tvs_sampling::{sample_size, z_score};

use super::io::emit;

#[derive(Args, Debug)]
pub struct SampleSizeArgs {
    /// Confidence level in percent (90, 95, 97 or 99).
    #[arg(long)]
    pub confidence: u32,
    /// Margin of error in percent.
    #[arg(long)]
    pub margin: f64,
    /// Eligible population size.
    #[arg(long)]
    pub population: usize,
}

#[derive(Debug, Serialize)]
struct Preview {
    confidence_interval: u32,
    margin_of_error: f64,
    eligible_population_size: usize,
    z_score: f64,
    sample_size: usize,
}

pub fn run(args: &SampleSizeArgs) -> Result<(), Box<dyn Error>> {
    let preview = Preview {
        confidence_interval: args.confidence,
        margin_of_error: args.margin,
        eligible_population_size: args.population,
        z_score: z_score(args.confidence)?,
        sample_size: sample_size(args.confidence, args.margin, args.population)?,
    };
    emit(&preview, None)?;
    Ok(())
}
