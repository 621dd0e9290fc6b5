use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use opptrack::config::Settings;
use opptrack::jobs;
use opptrack::models::params::{AwardParams, OpportunityParams};
use opptrack::services::{ContractsApiClient, StoreClient};
use opptrack::snapshot;

#[derive(Parser)]
#[command(name = "opptrack", about = "Fetch and reconcile contract opportunity records", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch notices from the record store using the configured filters
    FetchNotices {
        /// Output file for the fetched records
        #[arg(long, default_value = "notices.json")]
        out: PathBuf,
    },
    /// Fetch awards from the record store using the configured filters
    FetchAwards {
        /// Output file for the fetched records
        #[arg(long, default_value = "awards.json")]
        out: PathBuf,
    },
    /// Fetch award contracts from the contracts API
    FetchContracts {
        /// Saved-search key understood by the API
        #[arg(long)]
        search_id: Option<String>,
        /// Filter by awardee UEI
        #[arg(long)]
        awardee_uei: Option<String>,
        /// Filter by last modified date (YYYY-MM-DD)
        #[arg(long)]
        last_modified_date: Option<String>,
        /// Output file for the fetched records
        #[arg(long, default_value = "contracts.json")]
        out: PathBuf,
    },
    /// Fetch opportunities from the contracts API
    FetchOpportunities {
        /// Saved-search key understood by the API
        #[arg(long)]
        search_id: Option<String>,
        /// Filter by capture date (YYYY-MM-DD)
        #[arg(long)]
        captured_date: Option<String>,
        /// Filter by source type (e.g. sam)
        #[arg(long)]
        source_type: Option<String>,
        /// Output file for the fetched records
        #[arg(long, default_value = "opportunities.json")]
        out: PathBuf,
    },
    /// Reconcile a snapshot (CSV or JSON) against a fetched-results dump
    Reconcile {
        /// Snapshot file: spreadsheet export or earlier JSON dump
        snapshot: PathBuf,
        /// JSON dump of fetched store records
        results: PathBuf,
    },
    /// Fetch one award from both sources and compare it field by field
    CompareAward {
        /// Award key understood by the contracts API
        #[arg(long)]
        award_id: String,
        /// Procurement instrument ID in the record store
        #[arg(long)]
        piid: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::FetchNotices { out } => {
            let store = StoreClient::new(settings.store.url, settings.store.api_key)?;
            let notices = jobs::fetch_notices(&store, &settings.notices, &settings.fetch).await?;
            snapshot::write_json_records(&out, &notices)?;
        }
        Command::FetchAwards { out } => {
            let store = StoreClient::new(settings.store.url, settings.store.api_key)?;
            let awards = jobs::fetch_awards(&store, &settings.awards, &settings.fetch).await?;
            snapshot::write_json_records(&out, &awards)?;
        }
        Command::FetchContracts { search_id, awardee_uei, last_modified_date, out } => {
            let api = ContractsApiClient::new(
                settings.contracts_api.base_url,
                settings.contracts_api.api_key,
            )?;
            let params = AwardParams {
                search_id,
                awardee_uei,
                last_modified_date,
                ..Default::default()
            };
            let contracts = jobs::fetch_api_awards(&api, &params, &settings.fetch).await?;
            snapshot::write_json_records(&out, &contracts)?;
        }
        Command::FetchOpportunities { search_id, captured_date, source_type, out } => {
            let api = ContractsApiClient::new(
                settings.contracts_api.base_url,
                settings.contracts_api.api_key,
            )?;
            let params = OpportunityParams {
                search_id,
                captured_date,
                source_type,
                ..Default::default()
            };
            let opportunities = jobs::fetch_api_opportunities(&api, &params, &settings.fetch).await?;
            snapshot::write_json_records(&out, &opportunities)?;
        }
        Command::Reconcile { snapshot: snapshot_path, results } => {
            let report = jobs::reconcile_snapshots(&snapshot_path, &results)?;
            println!("{}", report.render("snapshot", "results"));
        }
        Command::CompareAward { award_id, piid } => {
            let store = StoreClient::new(settings.store.url, settings.store.api_key)?;
            let api = ContractsApiClient::new(
                settings.contracts_api.base_url,
                settings.contracts_api.api_key,
            )?;
            let report = jobs::compare_award(&api, &store, &award_id, &piid).await?;
            println!("{}", report.render());
        }
    }

    Ok(())
}
