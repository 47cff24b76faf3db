mod harvest;

use anyhow::Context;
use clap::{Parser, Subcommand};
use swatch_scraper::{AssetFetcher, AssetPipeline, WebDriverPage};
use swatch_store::{FirebaseDatabase, FirebaseStorage, RecordWriter};
use tracing_subscriber::EnvFilter;

use crate::harvest::{Harvester, StagingDirs};

#[derive(Debug, Parser)]
#[command(name = "swatch-cli")]
#[command(about = "Harvest product colour variants and media into Firebase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest one or more product pages into a collection.
    Harvest {
        /// Product page URLs, harvested in order.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Database collection the products are written under.
        #[arg(long, alias = "collectionName")]
        collection_name: String,
        /// Print what would be harvested without opening a browser or writing anything.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = swatch_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Harvest {
            urls,
            collection_name,
            dry_run,
        } => run_harvest(&config, &urls, &collection_name, dry_run).await,
    }
}

async fn run_harvest(
    config: &swatch_core::AppConfig,
    urls: &[String],
    collection_name: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        println!(
            "dry-run: would harvest {} product pages into '{collection_name}': [{}]",
            urls.len(),
            urls.join(", ")
        );
        return Ok(());
    }

    let storage = FirebaseStorage::open(config).context("failed to open blob storage")?;
    let database = FirebaseDatabase::open(config).context("failed to open database")?;
    let fetcher = AssetFetcher::from_config(config).context("failed to build media fetcher")?;
    let page = WebDriverPage::connect(config)
        .await
        .with_context(|| format!("failed to start a browser session at {}", config.webdriver_url))?;

    tracing::info!(
        env = %config.env,
        collection = collection_name,
        products = urls.len(),
        "harvest starting"
    );
    let mut harvester = Harvester::new(
        page,
        AssetPipeline::new(fetcher, storage),
        RecordWriter::new(database, collection_name),
        StagingDirs::from_config(config),
        &config.media_root,
    );
    let totals = harvester.run(urls).await;

    let (page, storage, database) = harvester.into_parts();
    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "browser session did not close cleanly");
    }
    storage.close();
    database.close();

    println!(
        "harvested {} of {} products: {} variants recorded, {} without images, {} failed",
        totals.products - totals.failed_products,
        totals.products,
        totals.variants.recorded,
        totals.variants.skipped_empty,
        totals.variants.failed
    );

    if totals.failed_products == totals.products {
        anyhow::bail!("every product failed to harvest");
    }
    Ok(())
}
