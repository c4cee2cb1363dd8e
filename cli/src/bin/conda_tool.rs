//! CLI entry point for conda environment export

use b_tools_cli::conda_tool::{CondaToolArgs, run};
use b_tools_cli::logging;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CondaToolArgs::parse();
    logging::init(args.log_level());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
