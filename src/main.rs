//! sbom-export: Export and post-process SBOMs from the Endor Labs API.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_export::{
    cli::{run_clean, run_generate, CleanConfig, GenerateConfig},
    config::DEFAULT_EXCLUDE_FILE,
    ExportFormat,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sbom-export")]
#[command(version)]
#[command(about = "Export and post-process SBOMs from the Endor Labs API", long_about = None)]
#[command(after_help = "ENVIRONMENT:
    API_KEY          Endor Labs API key (required)
    API_SECRET       Endor Labs API secret (required)
    ENDOR_NAMESPACE  Tenant namespace for project lookup (clean)
    ORGANIZATION     Organization recorded as an SPDX creator (generate)
    PERSON_EMAIL     Contact email recorded as an SPDX creator (generate)

A .env file in the working directory is read before the environment.

EXAMPLES:
    # Generate an SPDX SBOM for a project
    sbom-export generate --namespace acme --project-uuid 123e4567-...

    # Download the SPDX SBOM and strip test dependencies
    sbom-export clean --project-uuid 123e4567-... --exclude-file test_dependencies.txt

    # Clean a branch context instead of main
    sbom-export clean --project-uuid 123e4567-... --branch release/2.0")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `generate` subcommand
#[derive(Parser)]
struct GenerateArgs {
    /// Tenant namespace to export from
    #[arg(long, env = "ENDOR_NAMESPACE")]
    namespace: String,

    /// UUID of the project
    #[arg(long)]
    project_uuid: String,

    /// Output SPDX file name (defaults to {project_uuid}-spdx.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the raw CycloneDX export to this path
    #[arg(long)]
    cyclonedx_output: Option<PathBuf>,

    /// Format of the raw CycloneDX dump (json or xml)
    #[arg(long, value_enum, default_value = "json")]
    format: ExportFormat,
}

/// Arguments for the `clean` subcommand
#[derive(Parser)]
struct CleanArgs {
    /// UUID of the project
    #[arg(long)]
    project_uuid: String,

    /// Branch context to analyze (defaults to the main context)
    #[arg(long)]
    branch: Option<String>,

    /// File listing package names to remove, one per line
    #[arg(long, default_value = DEFAULT_EXCLUDE_FILE)]
    exclude_file: PathBuf,

    /// Output file for the cleaned SBOM
    /// (defaults to {project_uuid}[-branch]-cleaned-spdx.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an SPDX SBOM for a project via CycloneDX conversion
    Generate(GenerateArgs),

    /// Download an SPDX SBOM and remove test/dev dependencies
    Clean(CleanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Generate(args) => run_generate(GenerateConfig {
            namespace: args.namespace,
            project_uuid: args.project_uuid,
            output: args.output,
            cyclonedx_output: args.cyclonedx_output,
            cyclonedx_format: args.format,
        }),

        Commands::Clean(args) => run_clean(CleanConfig {
            project_uuid: args.project_uuid,
            branch: args.branch,
            exclude_file: args.exclude_file,
            output: args.output,
        }),

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sbom-export", &mut io::stdout());
            Ok(())
        }
    }
}
