use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::deduplicator::PricedRecord;
use crate::models::{Benefit, BenefitFlags, MergedProductRecord};

const ACNE_KEYWORDS: &[&str] = &["salicylic acid", "benzoyl peroxide", "retinol"];
const HYDRATION_KEYWORDS: &[&str] = &["hyaluronic acid", "glycerin", "ceramide"];
const ANTI_AGING_KEYWORDS: &[&str] = &["retinol", "peptides", "vitamin c", "vitamin-c"];

// "vitamin-c" and "niacinamide" were fused into one keyword in the list the
// merged dataset was built with. Kept until the correction is signed off.
const BRIGHTENING_LEGACY: &[&str] = &["vitamin c", "vitamin-cniacinamide", "alpha-arbutin"];
const BRIGHTENING_CORRECTED: &[&str] = &["vitamin c", "vitamin-c", "niacinamide", "alpha-arbutin"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrighteningKeywords {
    #[default]
    Legacy,
    Corrected,
}

impl BrighteningKeywords {
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            BrighteningKeywords::Legacy => BRIGHTENING_LEGACY,
            BrighteningKeywords::Corrected => BRIGHTENING_CORRECTED,
        }
    }
}

/// Derives SPF and benefit flags from names and ingredient text.
pub struct AttributeTagger {
    spf_pattern: Regex,
    brightening: BrighteningKeywords,
}

impl AttributeTagger {
    pub fn new(brightening: BrighteningKeywords) -> Self {
        AttributeTagger {
            spf_pattern: Regex::new(r"(?i)spf\s*([0-9]+)").expect("static SPF pattern"),
            brightening,
        }
    }

    /// First `spf<digits>` occurrence, or 0. Compatibility digits such as
    /// full-width ones are folded to ASCII first; oversized values saturate.
    pub fn extract_spf(&self, text: &str) -> u32 {
        let folded: String = text.nfkc().collect();
        self.spf_pattern
            .captures(&folded)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().parse().unwrap_or(u32::MAX))
            .unwrap_or(0)
    }

    pub fn benefits(&self, ingredients: &str) -> BenefitFlags {
        let ingredients = ingredients.to_lowercase();
        let mut flags = BenefitFlags::default();
        for benefit in Benefit::ALL {
            let hit = self
                .keywords(benefit)
                .iter()
                .any(|keyword| ingredients.contains(keyword));
            flags.set(benefit, hit);
        }
        flags
    }

    fn keywords(&self, benefit: Benefit) -> &'static [&'static str] {
        match benefit {
            Benefit::Acne => ACNE_KEYWORDS,
            Benefit::Brightening => self.brightening.keywords(),
            Benefit::Hydration => HYDRATION_KEYWORDS,
            Benefit::AntiAging => ANTI_AGING_KEYWORDS,
        }
    }

    pub fn tag(&self, record: PricedRecord) -> MergedProductRecord {
        let PricedRecord { combined, price } = record;
        let spf = self
            .extract_spf(&combined.brand_name)
            .max(self.extract_spf(&combined.listing.product));
        let benefits = self.benefits(&combined.skincare.ingredients);

        MergedProductRecord {
            label: combined.skincare.label,
            brand: combined.skincare.brand,
            name: combined.skincare.name,
            rank: combined.skincare.rank,
            ingredients: combined.skincare.ingredients,
            skin_types: combined.skincare.skin_types,
            brand_name: combined.brand_name,
            product: combined.listing.product,
            review_count: combined.listing.review_count,
            price,
            url: combined.listing.url,
            rating: combined.listing.rating,
            spf,
            benefits,
        }
    }

    pub fn tag_all(&self, records: Vec<PricedRecord>) -> Vec<MergedProductRecord> {
        records.into_iter().map(|r| self.tag(r)).collect()
    }
}

impl Default for AttributeTagger {
    fn default() -> Self {
        Self::new(BrighteningKeywords::default())
    }
}
