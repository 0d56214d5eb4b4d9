use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lazymod",
    about = "lazymod: lazily loaded package facades and their declaration tooling",
    version
)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every exported name of a facade manifest, sorted
    Names {
        /// Facade manifest (.toml or .json)
        #[arg(long)]
        manifest: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the export table: how each name resolves
    Table {
        /// Facade manifest (.toml or .json)
        #[arg(long)]
        manifest: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render the static declaration module for a manifest
    Codegen {
        /// Facade manifest (.toml or .json)
        #[arg(long)]
        manifest: String,

        /// Write the module here instead of stdout
        #[arg(long)]
        out: Option<String>,
    },

    /// Check a declaration module against its manifest (names + digest)
    DeclarationCheck {
        /// Facade manifest (.toml or .json)
        #[arg(long)]
        manifest: String,

        /// Source file defining `DECLARED_EXPORTS`
        #[arg(long)]
        source: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe dataset URLs and report which datasets are unavailable
    ProbeUrls {
        /// JSON object: dataset key -> url or [url, ...]
        #[arg(long)]
        urls: String,

        /// Per-URL connect/read timeout in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
