//! daylog CLI - the editing, import/export, and maintenance surface over
//! `daylog-core`.
//!
//! The CLI is the "external collaborator" of the core: it supplies field
//! values, renders records and summaries, and owns presentation policy like
//! measurement-interval gating. All persistence behavior lives in the core.

mod cli;
mod commands;
mod config;
mod measure;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::DaylogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DaylogConfig::load(cli.config.as_deref().map(Path::new))?;

    match &cli.command {
        Commands::Show(args) => commands::show::handle_show(&cli, &config, args).await,
        Commands::Log(args) => commands::log::handle_log(&cli, &config, args).await,
        Commands::Edit(args) => commands::edit::handle_edit(&cli, &config, args).await,
        Commands::List(args) => commands::list::handle_list(&cli, &config, args).await,
        Commands::Summary => commands::summary::handle_summary(&cli, &config).await,
        Commands::Export(args) => commands::export::handle_export(&cli, &config, args).await,
        Commands::Import(args) => commands::import::handle_import(&cli, &config, args).await,
        Commands::ClearRange(args) => commands::clear::handle_clear_range(&cli, &config, args).await,
        Commands::ClearAll(args) => commands::clear::handle_clear_all(&cli, &config, args).await,
    }
}
