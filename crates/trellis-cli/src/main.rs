//! Trellis CLI Application
//!
//! Command-line interface and MCP server for the Trellis action plan engine.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{TrellisMcpServer, run_stdio_server};
use renderer::TerminalRenderer;
use trellis_core::PlannerBuilder;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        user,
        command,
    } = Args::parse();

    let planner = PlannerBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize planner")?;

    info!("Trellis started with database {}", planner.database_path().display());

    if let Some(Commands::Serve) = command {
        info!("Starting Trellis MCP server");
        return run_stdio_server(TrellisMcpServer::new(planner))
            .await
            .context("MCP server failed");
    }

    let cli = Cli::new(planner, TerminalRenderer::new(!no_color), user);
    match command {
        Some(Commands::Plan { command }) => cli.handle_plan_command(command).await,
        Some(Commands::Phase { command }) => cli.handle_phase_command(command).await,
        Some(Commands::Task { command }) => cli.handle_task_command(command).await,
        Some(Commands::Dep { command }) => cli.handle_dep_command(command).await,
        Some(Commands::Progress { command }) => cli.handle_progress_command(command).await,
        Some(Commands::Export(args)) => cli.handle_export(args).await,
        Some(Commands::Serve) | None => cli.show_summary().await,
    }
}
