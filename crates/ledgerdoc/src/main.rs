//! ledgerdoc CLI - Main entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::Selector;
use config::Config;

#[derive(Parser)]
#[command(name = "ledgerdoc")]
#[command(version)]
#[command(about = "Render stored invoice and report templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a stored template against a JSON context
    Render {
        /// Template collection file or directory (defaults to `store` in ledgerdoc.toml)
        #[arg(long)]
        store: Option<PathBuf>,

        #[command(flatten)]
        selector: Selector,

        /// JSON file holding the render context
        #[arg(short = 'c', long)]
        context: PathBuf,

        /// Write output to FILE (use '--output -' for stdout)
        #[arg(short = 'o', long)]
        output: Option<String>,

        /// Emit the processed body only, without the page shell
        #[arg(long)]
        fragment: bool,

        /// HTML-escape substituted values
        #[arg(long)]
        escape_html: bool,

        /// Fail when any placeholder or block cannot be resolved
        #[arg(long)]
        strict: bool,
    },

    /// List stored templates
    List {
        /// Template collection file or directory
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Report unresolved placeholders and malformed blocks
    Check {
        /// Template collection file or directory
        #[arg(long)]
        store: Option<PathBuf>,

        #[command(flatten)]
        selector: Selector,

        /// JSON file holding the render context
        #[arg(short = 'c', long)]
        context: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    // Initialize logging; stdout is reserved for rendered output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerdoc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::discover(&cwd)?;

    match cli.command {
        Commands::Render {
            store,
            selector,
            context,
            output,
            fragment,
            escape_html,
            strict,
        } => {
            let args = commands::render::RenderArgs {
                store: config.store_path(store)?,
                selector,
                context,
                output,
                fragment,
                options: config.options(escape_html, strict),
            };
            commands::render::execute(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::List { store } => {
            commands::list::execute(&config.store_path(store)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check {
            store,
            selector,
            context,
        } => {
            let args = commands::check::CheckArgs {
                store: config.store_path(store)?,
                selector,
                context,
            };
            commands::check::execute(&args)
        }
    }
}
