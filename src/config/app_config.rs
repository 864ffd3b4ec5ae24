use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{DatasetConfig, WeatherConfig};
use crate::processor::BrighteningKeywords;
use crate::recommendation::SpfTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationSettings {
    /// Table used to derive the SPF floor when filtering.
    pub spf_table: SpfTable,
    /// Table used for the SPF shown next to the weather.
    pub advisory_spf_table: SpfTable,
    pub top_n: usize,
    /// Strictly above this age, only anti-aging products qualify.
    pub anti_aging_age: u32,
    /// Strictly above this UV index, sunscreens are suggested.
    pub sunscreen_uv_threshold: f64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            spf_table: SpfTable::Recommendation,
            advisory_spf_table: SpfTable::WeatherAdvisory,
            top_n: 5,
            anti_aging_age: 30,
            sunscreen_uv_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggingSettings {
    pub brightening_keywords: BrighteningKeywords,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub datasets: DatasetConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub tagging: TaggingSettings,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.datasets.apply_env_overrides();
        config.weather.apply_env_overrides();
        config.datasets.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [recommendation]
            spf_table = "weather_advisory"
            advisory_spf_table = "weather_advisory"
            top_n = 3
            anti_aging_age = 40
            sunscreen_uv_threshold = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.recommendation.spf_table, SpfTable::WeatherAdvisory);
        assert_eq!(config.recommendation.top_n, 3);
        assert_eq!(config.tagging.brightening_keywords, BrighteningKeywords::Legacy);
        assert_eq!(config.weather.cities.len(), 10);
    }

    #[test]
    fn test_sparse_sections_fill_missing_keys() {
        let config: AppConfig = toml::from_str(
            r#"
            [recommendation]
            top_n = 3

            [weather]
            api_url = "http://localhost:8080/forecast"
            "#,
        )
        .unwrap();

        assert_eq!(config.recommendation.top_n, 3);
        assert_eq!(config.recommendation.spf_table, SpfTable::Recommendation);
        assert_eq!(config.recommendation.advisory_spf_table, SpfTable::WeatherAdvisory);
        assert_eq!(config.recommendation.anti_aging_age, 30);
        assert_eq!(config.weather.api_url, "http://localhost:8080/forecast");
        assert_eq!(config.weather.timezone, "America/New_York");
        assert_eq!(config.weather.cities.len(), 10);
    }

    #[test]
    fn test_shipped_config_parses() {
        let config: AppConfig = toml::from_str(include_str!("../configs/skin_wiz.toml")).unwrap();
        assert_eq!(config.recommendation.spf_table, SpfTable::Recommendation);
        assert!(config.weather.coordinates("Dallas, TX").is_some());
    }
}
