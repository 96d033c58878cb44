mod export;
mod summary;

use clap::{Parser, Subcommand};
use salesdash_source::SalesApiClient;
use tracing_subscriber::EnvFilter;

use crate::{export::ExportArgs, summary::SummaryArgs};

#[derive(Debug, Parser)]
#[command(name = "salesdash-cli")]
#[command(about = "Sales dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the dashboard metrics and summary tables
    Summary(SummaryArgs),
    /// Write the filtered raw data as CSV
    Export(ExportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = salesdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("no command given; run `salesdash-cli --help`");
        return Ok(());
    };

    let client = SalesApiClient::from_config(&config)?;
    match command {
        Commands::Summary(args) => summary::run_summary(&client, &args).await,
        Commands::Export(args) => export::run_export(&client, &args).await,
    }
}
