use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Forecast endpoint and the cities a user can pick from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_url: String,
    pub timezone: String,
    pub cities: BTreeMap<String, Coordinates>,
}

impl WeatherConfig {
    pub fn coordinates(&self, city: &str) -> Option<Coordinates> {
        self.cities.get(city).copied()
    }

    pub fn build_request_url(&self, city: &str) -> Result<String> {
        let coords = self
            .coordinates(city)
            .ok_or_else(|| anyhow!("No coordinates configured for city: {}", city))?;

        Ok(format!(
            "{}?latitude={}&longitude={}&current_weather=true&daily=uv_index_max&timezone={}",
            self.api_url,
            coords.latitude,
            coords.longitude,
            self.timezone.replace('/', "%2F")
        ))
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("SKIN_WIZ_WEATHER_URL") {
            self.api_url = url;
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        let cities = [
            ("New York City, NY", 40.7128, -74.0060),
            ("Los Angeles, CA", 34.0522, -118.2437),
            ("Chicago, IL", 41.8781, -87.6298),
            ("Houston, TX", 29.7604, -95.3698),
            ("Phoenix, AZ", 33.4484, -112.0740),
            ("Philadelphia, PA", 39.9526, -75.1652),
            ("San Antonio, TX", 29.4241, -98.4936),
            ("San Diego, CA", 32.7157, -117.1611),
            ("Dallas, TX", 32.7767, -96.7970),
            ("Pittsburgh, PA", 40.4406, -79.9959),
        ]
        .into_iter()
        .map(|(name, latitude, longitude)| {
            (name.to_string(), Coordinates { latitude, longitude })
        })
        .collect();

        Self {
            api_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timezone: "America/New_York".to_string(),
            cities,
        }
    }
}
