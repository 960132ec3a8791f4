use anyhow::Result;
use clap::{Parser, Subcommand};
use rds_rightsizer::config::{self, Config};
use rds_rightsizer::exit_codes::exit_code_for_anyhow;
use rds_rightsizer::workflow::{self, AnalyzeArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rds-rightsizer")]
#[command(
    about = "Cost-optimization recommendations for Amazon RDS instances",
    long_about = "rds-rightsizer inspects RDS instances and their CloudWatch utilization and writes a CSV report.\n\nFor each instance it reports:\n  - Current monthly on-demand cost\n  - A Graviton (ARM) equivalent and its savings\n  - A smaller class in the same family when CPU peaks are low\n  - Savings from moving over-provisioned io1/io2 storage to gp3\n  - Instances with no database connections"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one instance (--name) or every instance (--all) in a region
    Analyze(AnalyzeArgs),
    /// Write a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".rds-rightsizer.toml")]
        path: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    // Warnings and errors only unless --verbose or RUST_LOG says otherwise
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => {
            workflow::handle_analyze(args, &config, &cli.output).await?;
        }
        Commands::Init { path } => {
            config::init_config(&path)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code_for_anyhow(&err));
    }
}
