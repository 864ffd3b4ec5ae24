use serde::{Deserialize, Serialize};

use crate::error::SkinWizError;
use crate::models::{Benefit, SkinType};

/// What a user fills in before asking for recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub city: String,
    /// Lowercase category labels, e.g. "moisturizer" or "face mask".
    pub categories: Vec<String>,
    pub skin_types: Vec<SkinType>,
    #[serde(default)]
    pub benefits: Vec<Benefit>,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

fn default_max_price() -> f64 {
    100.0
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn new(low: f64, high: f64) -> Self {
        PriceRange { low, high }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

impl UserProfile {
    pub fn from_file(path: &str) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let profile: UserProfile = toml::from_str(&content)?;
        Ok(profile)
    }

    pub fn price_range(&self) -> PriceRange {
        PriceRange::new(0.0, self.max_price)
    }

    pub fn validate(&self) -> Result<(), SkinWizError> {
        if self.name.trim().is_empty() {
            return Err(SkinWizError::InvalidProfile("Name is required.".into()));
        }
        if self.skin_types.is_empty() {
            return Err(SkinWizError::InvalidProfile(
                "Please select at least one skin type.".into(),
            ));
        }
        if self.categories.is_empty() {
            return Err(SkinWizError::InvalidProfile(
                "Please select at least one skincare product type.".into(),
            ));
        }
        if self.benefits.is_empty() {
            return Err(SkinWizError::InvalidProfile(
                "Please select at least one skincare improvement.".into(),
            ));
        }
        Ok(())
    }
}
