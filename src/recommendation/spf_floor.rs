use serde::{Deserialize, Serialize};

/// Upper UV bounds (inclusive) with the SPF required at or below each.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpfThresholds {
    pub tiers: [(f64, u32); 4],
    /// SPF once the UV index exceeds the last tier.
    pub above: u32,
}

impl SpfThresholds {
    /// Used to filter products.
    pub const RECOMMENDATION: SpfThresholds = SpfThresholds {
        tiers: [(2.0, 0), (5.0, 0), (7.0, 30), (10.0, 50)],
        above: 50,
    };

    /// Shown next to the forecast. Differs at UV 3-5.
    pub const WEATHER_ADVISORY: SpfThresholds = SpfThresholds {
        tiers: [(2.0, 0), (5.0, 15), (7.0, 30), (10.0, 50)],
        above: 50,
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpfTable {
    #[default]
    Recommendation,
    WeatherAdvisory,
}

impl SpfTable {
    pub fn thresholds(&self) -> &'static SpfThresholds {
        match self {
            SpfTable::Recommendation => &SpfThresholds::RECOMMENDATION,
            SpfTable::WeatherAdvisory => &SpfThresholds::WEATHER_ADVISORY,
        }
    }
}

pub fn spf_floor(uv_index: f64, table: &SpfThresholds) -> u32 {
    table
        .tiers
        .iter()
        .find(|(max_uv, _)| uv_index <= *max_uv)
        .map(|(_, spf)| *spf)
        .unwrap_or(table.above)
}
