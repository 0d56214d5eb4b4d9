//! lazymod CLI: the `lazymod` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` stdout stays parseable.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Names { manifest, json } => commands::names::run(manifest, json),

        Commands::Table { manifest, json } => commands::table::run(manifest, json),

        Commands::Codegen { manifest, out } => commands::codegen::run(manifest, out),

        Commands::DeclarationCheck {
            manifest,
            source,
            json,
        } => commands::declaration_check::run(manifest, source, json),

        Commands::ProbeUrls {
            urls,
            timeout_ms,
            json,
        } => commands::probe_urls::run(urls, timeout_ms, json),
    }
}
