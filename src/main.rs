mod cli;
mod commands;
mod model;
mod util;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match cli.command.dispatch() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_failure(&err);
            ExitCode::FAILURE
        }
    }
}

impl Commands {
    fn dispatch(self) -> Result<()> {
        match self {
            Self::Toc(args) => commands::toc::run(args),
            Self::Render(args) => commands::render::run(args),
            Self::Resolve(args) => commands::resolve::run(args),
            Self::Filter(args) => commands::filter::run(args),
        }
    }
}

fn log_failure(err: &anyhow::Error) {
    let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
    if causes.is_empty() {
        error!(error = %err, "guidebook failed");
    } else {
        error!(error = %err, causes = %causes.join(": "), "guidebook failed");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
