mod cli;
mod execute;

use std::process::ExitCode;
use anyhow::Result;
use clap::Parser;
use vagrant_wrapper::logging;
use crate::cli::CLI;

fn main() -> Result<ExitCode> {
    let cli = CLI::parse();
    logging::init(logging::directive_for_verbosity(cli.verbose));
    execute::execute(cli)
}
