//! pose-compare command-line entry point.

use clap::Parser;

use pose_compare::cli::args::{Cli, Commands};
use pose_compare::cli::compare::run_compare;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare(args) => run_compare(&args).await,
    }
}
