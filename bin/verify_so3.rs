use std::process::ExitCode;

use clap::Parser;
use so3_manifold::verification::{VerificationConfig, Verifier};
use so3_manifold::{SMALL_EPS, So3Result, init_logger_with_level};
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "verify_so3")]
#[command(about = "Check the numerical contracts of the SO(3) exp/log maps")]
struct Args {
    /// Maximum accepted residual norm for every check
    #[arg(short, long, default_value_t = SMALL_EPS)]
    tolerance: f64,

    /// Enable verbose output (per-case DEBUG logging)
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> So3Result<bool> {
    let config = VerificationConfig::new().with_tolerance(args.tolerance);
    config.validate()?;

    let report = Verifier::new(config).run_all();
    for failure in report.failures() {
        eprintln!("{failure}");
    }
    Ok(report.passed())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger_with_level(if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    match run(&args) {
        Ok(true) => {
            info!("SO3 verification passed");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!("failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
