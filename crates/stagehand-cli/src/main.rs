//! Stagehand CLI Application
//!
//! Command-line interface for the stagehand deployment orchestrator.

mod args;
mod cli;
mod renderer;

use std::process::ExitCode;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let Args {
        settings,
        dry_run,
        json,
        no_color,
        command,
    } = Args::parse();

    let renderer = TerminalRenderer::new(!no_color);
    let cli = Cli::new(settings.into(), dry_run, json, renderer);

    info!("Stagehand started");

    match command {
        Run(args) => cli.run(&args.into()).await,
        Plan(args) => cli.show_plan(&args.into()).map(|()| ExitCode::SUCCESS),
        Teardown(args) => cli.teardown(&args.into()).await,
        Schema => cli.schema().map(|()| ExitCode::SUCCESS),
    }
}
