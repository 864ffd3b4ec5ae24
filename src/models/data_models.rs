use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkinType {
    Combination,
    Dry,
    Normal,
    Oily,
    Sensitive,
}

impl SkinType {
    /// Column order of the source tables.
    pub const ALL: [SkinType; 5] = [
        SkinType::Combination,
        SkinType::Dry,
        SkinType::Normal,
        SkinType::Oily,
        SkinType::Sensitive,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            SkinType::Combination => "Combination",
            SkinType::Dry => "Dry",
            SkinType::Normal => "Normal",
            SkinType::Oily => "Oily",
            SkinType::Sensitive => "Sensitive",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SkinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkinType::ALL
            .into_iter()
            .find(|t| t.column().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown skin type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Benefit {
    Acne,
    Brightening,
    Hydration,
    #[serde(rename = "Anti_Aging", alias = "Anti-Aging")]
    AntiAging,
}

impl Benefit {
    pub const ALL: [Benefit; 4] = [
        Benefit::Acne,
        Benefit::Brightening,
        Benefit::Hydration,
        Benefit::AntiAging,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Benefit::Acne => "Acne",
            Benefit::Brightening => "Brightening",
            Benefit::Hydration => "Hydration",
            Benefit::AntiAging => "Anti_Aging",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Benefit::AntiAging => "Anti-Aging",
            other => other.column(),
        }
    }
}

impl fmt::Display for Benefit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Benefit {
    type Err = String;

    /// Accepts both the column name ("Anti_Aging") and the form label ("Anti-Aging").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Benefit::ALL
            .into_iter()
            .find(|b| b.column().eq_ignore_ascii_case(s) || b.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown skincare improvement: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinTypeFlags {
    pub combination: bool,
    pub dry: bool,
    pub normal: bool,
    pub oily: bool,
    pub sensitive: bool,
}

impl SkinTypeFlags {
    pub fn get(&self, skin_type: SkinType) -> bool {
        match skin_type {
            SkinType::Combination => self.combination,
            SkinType::Dry => self.dry,
            SkinType::Normal => self.normal,
            SkinType::Oily => self.oily,
            SkinType::Sensitive => self.sensitive,
        }
    }

    pub fn set(&mut self, skin_type: SkinType, value: bool) {
        match skin_type {
            SkinType::Combination => self.combination = value,
            SkinType::Dry => self.dry = value,
            SkinType::Normal => self.normal = value,
            SkinType::Oily => self.oily = value,
            SkinType::Sensitive => self.sensitive = value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitFlags {
    pub acne: bool,
    pub brightening: bool,
    pub hydration: bool,
    pub anti_aging: bool,
}

impl BenefitFlags {
    pub fn get(&self, benefit: Benefit) -> bool {
        match benefit {
            Benefit::Acne => self.acne,
            Benefit::Brightening => self.brightening,
            Benefit::Hydration => self.hydration,
            Benefit::AntiAging => self.anti_aging,
        }
    }

    pub fn set(&mut self, benefit: Benefit, value: bool) {
        match benefit {
            Benefit::Acne => self.acne = value,
            Benefit::Brightening => self.brightening = value,
            Benefit::Hydration => self.hydration = value,
            Benefit::AntiAging => self.anti_aging = value,
        }
    }
}

/// One row of the cleaned skincare ingredient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkincareIngredientRecord {
    pub label: String,
    pub brand: String,
    pub name: String,
    pub price: Option<f64>,
    pub rank: Option<f64>,
    pub ingredients: String,
    pub skin_types: SkinTypeFlags,
}

impl SkincareIngredientRecord {
    /// Matching field: brand and name joined by a single space.
    pub fn brand_name(&self) -> String {
        format!("{} {}", self.brand, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BannedIngredientRecord {
    pub name: String,
    pub restriction: String,
}

/// One cleaned Amazon search result. `price` is still the currency text as scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmazonListingRecord {
    pub product: String,
    pub review_count: u64,
    pub price: String,
    pub url: String,
    pub rating: f64,
}

/// A skincare record paired with a listing whose title contains all its tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRecord {
    pub skincare: SkincareIngredientRecord,
    pub brand_name: String,
    pub listing: AmazonListingRecord,
}

/// Row of the merged table; the system of record for recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedProductRecord {
    pub label: String,
    pub brand: String,
    pub name: String,
    pub rank: Option<f64>,
    pub ingredients: String,
    pub skin_types: SkinTypeFlags,
    pub brand_name: String,
    pub product: String,
    pub review_count: u64,
    /// Listing price; overrides the skincare table's price.
    pub price: f64,
    pub url: String,
    pub rating: f64,
    pub spf: u32,
    pub benefits: BenefitFlags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benefit_parsing_accepts_form_and_column_names() {
        assert_eq!("Anti-Aging".parse::<Benefit>().unwrap(), Benefit::AntiAging);
        assert_eq!("Anti_Aging".parse::<Benefit>().unwrap(), Benefit::AntiAging);
        assert_eq!("acne".parse::<Benefit>().unwrap(), Benefit::Acne);
        assert!("Glow".parse::<Benefit>().is_err());
    }

    #[test]
    fn test_skin_type_flags_round_trip() {
        let mut flags = SkinTypeFlags::default();
        flags.set(SkinType::Oily, true);
        assert!(flags.get(SkinType::Oily));
        assert!(!flags.get(SkinType::Dry));
        assert_eq!(" dry ".parse::<SkinType>().unwrap(), SkinType::Dry);
    }
}
