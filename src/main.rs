// ABOUTME: CLI entry point for pg-column-export
// ABOUTME: Parses commands, loads configuration and routes to handlers

use clap::{Args, Parser, Subcommand};
use pg_column_export::{commands, config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pg-column-export")]
#[command(
    about = "Export a PostgreSQL table restricted to the columns a production schema also has",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct ConfigArgs {
    /// Path to a TOML config file (built-in defaults when omitted)
    #[arg(long = "config", short = 'c')]
    config_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the primary table's common columns and dump the auxiliary tables
    Export {
        #[command(flatten)]
        config: ConfigArgs,
        /// Overwrite existing output files without asking
        #[arg(short = 'y', long)]
        yes: bool,
        /// Exit with an error if any export statement failed
        #[arg(long)]
        strict: bool,
    },
    /// Report development vs production columns without exporting anything
    Columns {
        #[command(flatten)]
        config: ConfigArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build ready-to-load SQL scripts from a previous export
    Assemble {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Check tools, configuration and database access before exporting
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set.
    // Logs go to stderr so stdout carries only command output (`columns --json`).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // No subcommand behaves like a plain `export` run
    let command = cli.command.unwrap_or(Commands::Export {
        config: ConfigArgs::default(),
        yes: false,
        strict: false,
    });

    match command {
        Commands::Export {
            config: args,
            yes,
            strict,
        } => {
            let config = config::load_config(args.config_path.as_deref())?;
            commands::export(&config, yes, strict).await.map(|_| ())
        }
        Commands::Columns { config: args, json } => {
            let config = config::load_config(args.config_path.as_deref())?;
            commands::columns(&config, json).await.map(|_| ())
        }
        Commands::Assemble { config: args } => {
            let config = config::load_config(args.config_path.as_deref())?;
            commands::assemble(&config).map(|_| ())
        }
        Commands::Validate { config: args } => {
            let config = config::load_config(args.config_path.as_deref())?;
            commands::validate(&config).await
        }
    }
}
