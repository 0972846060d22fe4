//! The main entry point for solcst.

use std::process::ExitCode;

use anstream as _;
use clap as _;
use serde_json as _;
use solcst_config as _;
use solcst_interface as _;
use solcst_lint as _;
use solcst_parse as _;
use tracing as _;
#[cfg(feature = "tracing")]
use tracing_subscriber as _;

fn main() -> ExitCode {
    let _guard = solcst_cli::utils::init_logger();
    let opts = match solcst_cli::parse_args(std::env::args_os()) {
        Ok(opts) => opts,
        Err(e) => e.exit(),
    };
    match solcst_cli::run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
