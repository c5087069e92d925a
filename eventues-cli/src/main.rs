use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use eventues_store::{Config, HttpCatalogRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ticket catalog tools for Eventues organizers")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective price of every subcategory
    Prices {
        event_id: String,
        /// Evaluate batch windows at this instant instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Fetch the catalog and list anything that would block a submit
    Validate { event_id: String },
    /// Write the fetched catalog to a JSON file
    Export {
        event_id: String,
        #[arg(long)]
        output: PathBuf,
    },
    /// Validate a catalog JSON file and submit it
    Submit {
        event_id: String,
        #[arg(long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Using backend at {}", config.backend.base_url);
    let repository = HttpCatalogRepository::new(&config.backend)?;

    match args.command {
        Command::Prices { event_id, at } => {
            let at = at.unwrap_or_else(Utc::now);
            print!("{}", eventues_cli::show_prices(&repository, &event_id, at).await?);
        }
        Command::Validate { event_id } => {
            match eventues_cli::check_catalog(&repository, &event_id).await? {
                Some(report) => {
                    print!("{}", report);
                    return Ok(ExitCode::FAILURE);
                }
                None => println!("Catalog for event {} is valid", event_id),
            }
        }
        Command::Export { event_id, output } => {
            eventues_cli::export_catalog(&repository, &event_id, &output).await?;
        }
        Command::Submit { event_id, input } => {
            eventues_cli::submit_catalog(&repository, &event_id, &input).await?;
            println!("Catalog for event {} submitted", event_id);
        }
    }

    Ok(ExitCode::SUCCESS)
}
