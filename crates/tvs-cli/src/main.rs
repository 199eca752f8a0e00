use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    plan::{self, PlanArgs},
    sample_size::{self, SampleSizeArgs},
    select::{self, SelectArgs},
    validate::{self, ValidateArgs},
};
use tvs_core::TvsError;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "tvs", version, about = "Targeting selection and verification sampling")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the households selected by targeting criteria.
    Select(SelectArgs),
    /// Build a verification plan from criteria and sampling parameters.
    Plan(PlanArgs),
    /// Preview the random sample size for a population.
    SampleSize(SampleSizeArgs),
    /// Check targeting criteria against the field catalog.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Select(args) => select::run(&args),
        Command::Plan(args) => plan::run(&args),
        Command::SampleSize(args) => sample_size::run(&args),
        Command::Validate(args) => validate::run(&args),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn report(err: &(dyn Error + 'static)) {
    match err.downcast_ref::<TvsError>() {
        Some(tvs) => match serde_json::to_string(tvs) {
            Ok(rendered) => eprintln!("{rendered}"),
            Err(_) => eprintln!("error: {tvs}"),
        },
        None => eprintln!("error: {err}"),
    }
}
