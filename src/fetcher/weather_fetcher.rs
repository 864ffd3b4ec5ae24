use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use wreq::Client;
use wreq_util::Emulation;

use crate::config::WeatherConfig;
use crate::error::SkinWizError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_c: f64,
    pub uv_index_max: f64,
    pub fetched_at: DateTime<Utc>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherReport, SkinWizError>;
}

/// Today's forecast from the Open-Meteo API.
pub struct OpenMeteoFetcher {
    client: Client,
    config: WeatherConfig,
}

impl OpenMeteoFetcher {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .emulation(Emulation::Firefox136)
            .build()?;

        Ok(OpenMeteoFetcher { client, config })
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {}", response.status()));
        }

        let data: Value = response.json().await?;
        Ok(data)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoFetcher {
    async fn fetch(&self, city: &str) -> Result<WeatherReport, SkinWizError> {
        let url = self
            .config
            .build_request_url(city)
            .map_err(|e| SkinWizError::UpstreamFetch(e.to_string()))?;

        info!("Fetching forecast for {}", city);
        let data = self.fetch_json(&url).await.map_err(|e| {
            error!("Failed to fetch forecast for {}: {}", city, e);
            SkinWizError::UpstreamFetch(format!("{}: {}", city, e))
        })?;

        parse_forecast(city, &data)
    }
}

/// Reads `current_weather.temperature` and the first `daily.uv_index_max`.
pub fn parse_forecast(city: &str, data: &Value) -> Result<WeatherReport, SkinWizError> {
    let temperature_c = data
        .get("current_weather")
        .and_then(|c| c.get("temperature"))
        .and_then(Value::as_f64)
        .ok_or_else(|| SkinWizError::UpstreamFetch("forecast has no current temperature".into()))?;

    let uv_index_max = data
        .get("daily")
        .and_then(|d| d.get("uv_index_max"))
        .and_then(|uv| uv.get(0))
        .and_then(Value::as_f64)
        .ok_or_else(|| SkinWizError::UpstreamFetch("forecast has no daily UV index".into()))?;

    Ok(WeatherReport {
        city: city.to_string(),
        temperature_c,
        uv_index_max,
        fetched_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedWeather(Option<f64>);

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn fetch(&self, city: &str) -> Result<WeatherReport, SkinWizError> {
            let data = match self.0 {
                Some(uv) => json!({
                    "current_weather": {"temperature": 21.5},
                    "daily": {"uv_index_max": [uv, 1.0]}
                }),
                None => json!({"error": true, "reason": "Latitude must be in range"}),
            };
            parse_forecast(city, &data)
        }
    }

    #[test]
    fn test_parse_forecast() {
        let data = json!({
            "current_weather": {"temperature": 18.2, "windspeed": 9.0},
            "daily": {"time": ["2024-10-01"], "uv_index_max": [6.35]}
        });

        let report = parse_forecast("Chicago, IL", &data).unwrap();
        assert_eq!(report.temperature_c, 18.2);
        assert_eq!(report.uv_index_max, 6.35);
    }

    #[test]
    fn test_parse_forecast_missing_uv() {
        let data = json!({"current_weather": {"temperature": 18.2}, "daily": {"uv_index_max": []}});
        assert!(matches!(
            parse_forecast("Chicago, IL", &data),
            Err(SkinWizError::UpstreamFetch(_))
        ));
    }

    #[tokio::test]
    async fn test_provider_seam() {
        let provider: Box<dyn WeatherProvider> = Box::new(FixedWeather(Some(7.2)));
        let report = provider.fetch("Houston, TX").await.unwrap();
        assert_eq!(report.city, "Houston, TX");
        assert_eq!(report.uv_index_max, 7.2);

        let failing = FixedWeather(None);
        assert!(failing.fetch("Houston, TX").await.is_err());
    }
}
