// superview-cli/src/main.rs
//
// Entry point of the `superview` binary: parse arguments, install logging,
// run the encode and turn the outcome into an exit code.
//
// Exit codes: 0 on success, 130 when the user interrupted the encode, 1 for
// every other failure.

use std::process::ExitCode;

use clap::Parser;
use console::style;
use superview_core::CoreError;
use superview_cli::{Cli, logging, progress, run_encode};

const EXIT_CANCELLED: u8 = 130;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let progress_bar = !cli.json_progress && progress::bar_is_drawn();
    if let Err(e) = logging::init_logging(cli.verbose, cli.log_file.as_deref(), progress_bar) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        return ExitCode::FAILURE;
    }

    let logs_to_file = cli.log_file.is_some();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_cancelled(&e) => {
            log::warn!("Encode cancelled");
            eprintln!("{}", style("Cancelled").yellow().bold());
            ExitCode::from(EXIT_CANCELLED)
        }
        Err(e) => {
            if logs_to_file {
                log::error!("{:#}", e);
            }
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    run_encode(cli)?;
    Ok(())
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<CoreError>()
        .is_some_and(CoreError::is_cancelled)
}
