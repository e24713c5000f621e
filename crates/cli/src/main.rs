use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use kokoro_client::KokoroClient;
use std::io;

mod cli_args;
mod commands;
mod settings;
mod tracing;
mod utils;

use crate::tracing::setup_logging;
use cli_args::{CliArgs, Commands};
use settings::resolve_config;

async fn run(args: CliArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let client = KokoroClient::new(config);
    commands::run(&client, args.command).await
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Handle completion generation and exit early.
    if let Commands::Completion { shell } = &args.command {
        let mut cmd = CliArgs::command();
        clap_complete::generate(*shell, &mut cmd, "kokoro", &mut io::stdout());
        return;
    }

    let tracer_provider = setup_logging();
    let outcome = run(args).await;

    if let Some(tp) = tracer_provider {
        if let Err(e) = tp.shutdown() {
            log::warn!("failed to flush traces: {}", e);
        }
    }

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "Error:".bright_red(), e);
        std::process::exit(1);
    }
}
