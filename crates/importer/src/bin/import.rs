use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use importer::{
    CatalogFetcher, DirectoryImportOptions, FetchConfig, FileDownloader, RemoteFetchOptions,
    RunReport,
    config::{DEFAULT_CATALOG_TIMEOUT_SECS, DEFAULT_DOWNLOAD_TIMEOUT_SECS},
    fetch_remote, import_directory,
    spreadsheet::extract_file,
};
use std::path::PathBuf;
use std::time::Duration;
use storage::{
    Database, MemoryStore, RatingStore,
    dto::leaderboard::LeaderboardFilter,
    models::RatingCategory,
    services::leaderboard::build_leaderboard,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rating-import")]
#[command(about = "Rating archive importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// PostgreSQL connection string. Without it an in-memory store is used
    /// and nothing outlives the process.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download new files listed in the remote archive and import them.
    Fetch {
        #[arg(long, env = "RATING_CATALOG_URL")]
        catalog_url: String,

        #[arg(long, default_value = "./downloads")]
        output: PathBuf,

        /// Stop after this many files have been processed.
        #[arg(long)]
        limit: Option<usize>,

        /// Re-import files that were already applied.
        #[arg(long)]
        force: bool,

        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,

        #[arg(long, env = "RATING_CATALOG_TIMEOUT_SECS", default_value_t = DEFAULT_CATALOG_TIMEOUT_SECS)]
        catalog_timeout_secs: u64,

        #[arg(long, env = "RATING_DOWNLOAD_TIMEOUT_SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
        download_timeout_secs: u64,
    },
    /// Import rating spreadsheets already on disk.
    ImportDir {
        #[arg(long, default_value = "./downloads")]
        directory: PathBuf,

        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        json: bool,
    },
    /// Show how a spreadsheet would be read, without touching the store.
    Inspect { file: PathBuf },
    /// Print the current leaderboard as JSON.
    Leaderboard {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        category: Option<RatingCategory>,
    },
    /// Delete the snapshots of one rating date.
    Purge {
        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        category: Option<RatingCategory>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rating_import={},importer={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Fetch {
            catalog_url,
            output,
            limit,
            force,
            dry_run,
            json,
            catalog_timeout_secs,
            download_timeout_secs,
        } => {
            let config = FetchConfig {
                catalog_url,
                download_dir: output,
                catalog_timeout: Duration::from_secs(catalog_timeout_secs),
                download_timeout: Duration::from_secs(download_timeout_secs),
                ..FetchConfig::default()
            };
            let options = RemoteFetchOptions {
                download_dir: config.download_dir.clone(),
                limit,
                force,
                dry_run,
            };
            let store = open_store(cli.database_url.as_deref()).await?;
            handle_fetch(store.as_ref(), &config, &options, json).await?;
        }
        Commands::ImportDir {
            directory,
            dry_run,
            json,
        } => {
            let store = open_store(cli.database_url.as_deref()).await?;
            let options = DirectoryImportOptions { directory, dry_run };
            let report = import_directory(store.as_ref(), &options).await?;
            finish_run(&report, json)?;
        }
        Commands::Inspect { file } => {
            handle_inspect(file).await?;
        }
        Commands::Leaderboard { search, category } => {
            let store = open_store(cli.database_url.as_deref()).await?;
            let filter = LeaderboardFilter { search, category };
            let leaderboard = build_leaderboard(store.as_ref(), &filter).await?;
            println!("{}", serde_json::to_string_pretty(&leaderboard)?);
        }
        Commands::Purge { date, category } => {
            let store = open_store(cli.database_url.as_deref()).await?;
            let removed = store.purge_snapshots(date, category).await?;
            tracing::info!(
                "Purged {} snapshot(s) dated {}{}",
                removed,
                date,
                category.map(|c| format!(" in {}", c)).unwrap_or_default()
            );
        }
    }

    Ok(())
}

async fn open_store(
    database_url: Option<&str>,
) -> Result<Box<dyn RatingStore>, Box<dyn std::error::Error>> {
    match database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let database = Database::connect(url).await?;
            database.migrate().await?;
            Ok(Box::new(database.into_store()))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; using an in-memory store, nothing will persist");
            Ok(Box::new(MemoryStore::new()))
        }
    }
}

async fn handle_fetch(
    store: &dyn RatingStore,
    config: &FetchConfig,
    options: &RemoteFetchOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CatalogFetcher::new(config)?;
    let downloader = FileDownloader::new(config)?;

    if options.dry_run {
        tracing::info!("Dry run: files are downloaded and parsed but nothing is stored");
    }

    let report = fetch_remote(store, &catalog, &downloader, options).await?;
    finish_run(&report, json)
}

fn finish_run(report: &RunReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", report.to_json()?);
    }

    if report.has_failures() {
        return Err(format!("{} file(s) failed to import", report.totals.files_failed).into());
    }

    Ok(())
}

async fn handle_inspect(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Inspecting {}", file.display());

    let extraction = extract_file(file).await?;

    for sheet in &extraction.sheets {
        match (sheet.category, sheet.header_row) {
            (Some(category), Some(header_row)) => tracing::info!(
                "  {} -> {} (header row {}): {} records, {} discarded",
                sheet.sheet,
                category,
                header_row,
                sheet.records,
                sheet.discarded
            ),
            (Some(category), None) => {
                tracing::info!("  {} -> {}: unrecognized layout", sheet.sheet, category)
            }
            (None, _) => tracing::info!("  {}: not a rating sheet", sheet.sheet),
        }
    }

    tracing::info!(
        "Total: {} records in {} categories",
        extraction.records.len(),
        extraction.categories_found.len()
    );
    println!("{}", serde_json::to_string_pretty(&extraction.sheets)?);

    Ok(())
}
