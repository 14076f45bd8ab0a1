use clap::Parser;
use std::process::ExitCode;

use myst_preview::{supervisor, Args, PreviewError};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match supervisor::run(&args) {
        Ok(code) => ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            if err.downcast_ref::<PreviewError>().is_some() {
                ExitCode::FAILURE
            } else {
                // Failures after validation are reported on stderr without
                // overriding the exit code; build mode is the only carrier
                // of a renderer's nonzero code.
                ExitCode::SUCCESS
            }
        }
    }
}
