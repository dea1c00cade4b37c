// Copyright 2026 Scarab Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, unused_imports)]

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod catalog;
mod checkpoint;
mod cli;
mod config;
mod extract;
mod index;
mod pipeline;
mod progress;

use config::HarvestConfig;

#[derive(Parser)]
#[command(
    name = "scarab",
    about = "Scarab — resumable museum-collection harvester",
    version,
    after_help = "Run 'scarab <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every harvest subcommand.
#[derive(Args)]
struct HarvestArgs {
    /// Source CSV catalog (defaults to <root>/objects.csv)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Data root for images, indexes, catalog, and checkpoint
    #[arg(long, default_value = "data")]
    root: PathBuf,

    /// Items per batch (checkpoint granularity)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Concurrent page fetches in phase 1
    #[arg(long)]
    scrape_concurrency: Option<usize>,

    /// Concurrent image downloads in phase 2
    #[arg(long)]
    image_concurrency: Option<usize>,
}

impl HarvestArgs {
    fn into_config(self) -> HarvestConfig {
        let mut config = HarvestConfig::for_root(&self.root);
        if let Some(csv) = self.csv {
            config.csv_path = csv;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size.max(1);
        }
        if let Some(n) = self.scrape_concurrency {
            config.scrape_concurrency = n.max(1);
        }
        if let Some(n) = self.image_concurrency {
            config.image_concurrency = n.max(1);
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run all three phases: scrape pages, download images, build indexes
    Run(HarvestArgs),
    /// Phase 1 only: scrape collection pages for descriptions and URLs
    Scrape(HarvestArgs),
    /// Phase 2 only: download object images discovered by phase 1
    Images(HarvestArgs),
    /// Phase 3 only: rebuild the catalog document and indexes
    Build(HarvestArgs),
    /// Show checkpoint progress and enrichment coverage
    Status(HarvestArgs),
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("SCARAB_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("SCARAB_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("SCARAB_VERBOSE", "1");
    }

    let default_filter = if cli.verbose {
        "scarab=debug"
    } else if cli.quiet {
        "scarab=warn"
    } else {
        "scarab=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => cli::run_cmd::run(args.into_config()).await,
        Commands::Scrape(args) => cli::scrape_cmd::run(args.into_config()).await,
        Commands::Images(args) => cli::images_cmd::run(args.into_config()).await,
        Commands::Build(args) => cli::build_cmd::run(args.into_config()).await,
        Commands::Status(args) => cli::status_cmd::run(args.into_config()).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "scarab", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }
    result
}
