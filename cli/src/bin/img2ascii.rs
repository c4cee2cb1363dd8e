//! CLI entry point for image to ASCII art conversion

use b_tools_cli::img2ascii::{Img2AsciiArgs, run};
use b_tools_cli::logging;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Img2AsciiArgs::parse();
    logging::init(args.log_level());

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
