//! Stencil CLI
//!
//! Renders project templates and repairs generated component source.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Stencil - project scaffolding templates
#[derive(Parser)]
#[command(name = "stencil")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "stencil.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template
    Render {
        /// Template file
        template: String,

        /// JSON file with the template context
        #[arg(long)]
        context: Option<String>,

        /// Context value as key=value (repeatable, dotted keys nest)
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Compile every template in a directory and report the cache
    Precompile {
        /// Template directory (defaults to the configured one)
        dir: Option<String>,
    },

    /// Reorder className arguments in component source
    Transform {
        /// Files or directories (defaults to the project directory)
        paths: Vec<String>,

        /// Write changes back (default is a dry run)
        #[arg(long)]
        write: bool,

        /// Class-merging function to target
        #[arg(long)]
        target_fn: Option<String>,
    },

    /// Restore line breaks in collapsed templates
    FmtTemplates {
        /// Template directory (defaults to the configured one)
        dir: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries rendered output
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Render {
            template,
            context,
            set,
            output,
        } => {
            commands::render::run(
                &cli.config,
                &template,
                context.as_deref(),
                &set,
                output.as_deref(),
            )
            .await?;
        }
        Commands::Precompile { dir } => {
            commands::precompile::run(&cli.config, dir.as_deref()).await?;
        }
        Commands::Transform {
            paths,
            write,
            target_fn,
        } => {
            commands::transform::run(&cli.config, &paths, write, target_fn.as_deref()).await?;
        }
        Commands::FmtTemplates { dir } => {
            commands::fmt_templates::run(&cli.config, dir.as_deref()).await?;
        }
    }

    Ok(())
}
