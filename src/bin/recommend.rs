use anyhow::{Context, Result, anyhow};
use skin_wiz::config::AppConfig;
use skin_wiz::fetcher::{OpenMeteoFetcher, WeatherProvider};
use skin_wiz::models::UserProfile;
use skin_wiz::recommendation::build_report;
use skin_wiz::storage::CsvStore;
use std::env;
use tracing::{info, warn};

const CONFIG_PATH: &str = "src/configs/skin_wiz.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let profile_path = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("Usage: recommend <profile.toml>"))?;

    let config = AppConfig::from_file(CONFIG_PATH).context("Failed to load SkinWiz configuration")?;
    let profile = UserProfile::from_file(&profile_path)
        .with_context(|| format!("Failed to load profile: {}", profile_path))?;

    info!("🚀 Building recommendations for {} in {}", profile.name, profile.city);

    // Weather is optional; recommendations still run without it
    let fetcher = OpenMeteoFetcher::new(config.weather.clone())?;
    let weather = fetcher.fetch(&profile.city).await;
    if let Err(e) = &weather {
        warn!("⚠️ Continuing without weather: {}", e);
    }

    // Load merged dataset
    let records = CsvStore::new(config.datasets.clone())
        .load_merged()
        .context("Failed to load merged dataset; run `skin-wiz --clean` first")?;

    let report = build_report(&config.recommendation, &records, &profile, weather)?;
    println!("{}", report);

    Ok(())
}
