use anyhow::{Context, Result};
use skin_wiz::config::AppConfig;
use skin_wiz::pipeline::{process_and_merge, run_all_cleaners};
use skin_wiz::processor::AttributeTagger;
use skin_wiz::storage::CsvStore;
use std::env;
use tracing::{error, info, warn};

const CONFIG_PATH: &str = "src/configs/skin_wiz.toml";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Check if the raw files should be cleaned again before merging
    let clean = env::args().any(|arg| arg == "--clean" || arg == "-c");

    if clean {
        info!("🚀 Starting SkinWiz pipeline (cleaning raw data, then merging)");
    } else {
        info!("🚀 Starting SkinWiz pipeline (merging cleaned data)");
    }

    // Load configuration
    let config = AppConfig::from_file(CONFIG_PATH).context("Failed to load SkinWiz configuration")?;
    info!(
        "Datasets: raw={} cleaned={} merged={}",
        config.datasets.raw_dir.display(),
        config.datasets.cleaned_dir.display(),
        config.datasets.merged_path.display()
    );

    // Initialize local table storage
    let store = CsvStore::new(config.datasets.clone());

    if clean {
        match run_all_cleaners(&store) {
            Ok(summary) => info!(
                "✅ Cleaned {} skincare records, {} banned ingredients, {} listings",
                summary.skincare, summary.banned, summary.listings
            ),
            Err(e) => {
                error!("❌ Cleaning failed: {:#}", e);
                return Err(e);
            }
        }
    }

    // Filter, match, deduplicate and tag into the merged table
    let tagger = AttributeTagger::new(config.tagging.brightening_keywords);
    let summary = process_and_merge(&store, &tagger).context("Failed to merge datasets")?;

    info!("\n=== SkinWiz Merge Summary ===");
    info!(
        "📊 Ingredient filter: {} kept out of {} skincare records",
        summary.after_filter, summary.skincare_in
    );
    info!("📊 Matched {} listing pairs, {} products after deduplication", summary.combined, summary.deduplicated);

    if summary.deduplicated > 0 {
        info!("🎉 Merged dataset written to {}", config.datasets.merged_path.display());
    } else {
        warn!("⚠️ Merge produced no products");
    }

    Ok(())
}
