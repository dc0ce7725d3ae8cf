#![deny(missing_docs)]

//! # CelPatch CLI
//!
//! Post-processing step for generated CRD manifests: injects
//! `x-kubernetes-validations` (CEL rules) for registered resources.
//!
//! Exit codes:
//! - `0`: patched, or validations already present.
//! - `1`: missing argument, missing file, or any other failure.

use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

mod error;
mod inject;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Inject CEL validation rules into generated CRD manifests"
)]
struct Cli {
    #[clap(flatten)]
    args: inject::InjectArgs,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_parse_error(&err),
    };

    match inject::execute(&cli.args) {
        Ok(status) => {
            log::debug!("Finished: {:?}", status);
            ExitCode::SUCCESS
        }
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Help and version go to stdout with success; every other parse error exits with `1`.
fn report_parse_error(err: &clap::Error) -> ExitCode {
    print!("{}", err.render());
    ExitCode::from(parse_error_code(err.kind()))
}

fn parse_error_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}
