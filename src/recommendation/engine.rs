use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use super::category_encoder::CategoryEncoder;
use super::spf_floor::{SpfThresholds, spf_floor};
use crate::config::RecommendationSettings;
use crate::error::SkinWizError;
use crate::models::{Benefit, MergedProductRecord, PriceRange, SkinType};

/// A coarse recommendation with the number of requested skin types it suits.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct {
    pub record: MergedProductRecord,
    pub skin_type_score: usize,
}

/// Coarse result for one requested category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOutcome {
    pub category: String,
    pub outcome: Result<Vec<ScoredProduct>, SkinWizError>,
}

/// Final picks for one requested category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatches {
    pub category: String,
    pub products: Vec<MergedProductRecord>,
}

/// Stateless filters over the merged record set.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    thresholds: SpfThresholds,
    top_n: usize,
    anti_aging_age: u32,
}

impl RecommendationEngine {
    pub fn new(settings: &RecommendationSettings) -> Self {
        RecommendationEngine {
            thresholds: *settings.spf_table.thresholds(),
            top_n: settings.top_n,
            anti_aging_age: settings.anti_aging_age,
        }
    }

    /// Without a UV reading there is no floor.
    pub fn spf_floor(&self, uv_index: Option<f64>) -> u32 {
        uv_index.map_or(0, |uv| spf_floor(uv, &self.thresholds))
    }

    /// Per category: products of that category meeting the SPF floor, most
    /// suitable skin-type coverage first. Unknown categories fail alone.
    pub fn recommend(
        &self,
        records: &[MergedProductRecord],
        categories: &[String],
        skin_types: &[SkinType],
        uv_index: Option<f64>,
    ) -> Vec<CategoryOutcome> {
        let floor = self.spf_floor(uv_index);
        let encoder = CategoryEncoder::fit(records);
        let selected: BTreeSet<SkinType> = skin_types.iter().copied().collect();

        categories
            .iter()
            .map(|category| {
                let outcome = encoder.encode(category).map(|ordinal| {
                    let label = encoder.decode(ordinal).unwrap_or_default();
                    let mut scored: Vec<ScoredProduct> = records
                        .iter()
                        .filter(|r| r.label == label)
                        .filter(|r| r.spf >= floor)
                        .map(|r| ScoredProduct {
                            record: r.clone(),
                            skin_type_score: selected.iter().filter(|t| r.skin_types.get(**t)).count(),
                        })
                        .collect();
                    scored.sort_by(|a, b| b.skin_type_score.cmp(&a.skin_type_score));
                    debug!("{} candidates for {} (SPF floor {})", scored.len(), category, floor);
                    scored
                });

                if let Err(e) = &outcome {
                    warn!("Skipping category: {} (known: {})", e, encoder.classes().join(", "));
                }

                CategoryOutcome {
                    category: category.clone(),
                    outcome,
                }
            })
            .collect()
    }

    /// Per category: every selected skin type, any selected benefit, price in
    /// range and, past the anti-aging age, an anti-aging product. One entry
    /// per product name, best rated first.
    pub fn filter_exact(
        &self,
        records: &[MergedProductRecord],
        categories: &[String],
        skin_types: &[SkinType],
        benefits: &[Benefit],
        price_range: PriceRange,
        age: u32,
    ) -> Vec<CategoryMatches> {
        let qualifies = |r: &MergedProductRecord| {
            skin_types.iter().all(|t| r.skin_types.get(*t))
                && (benefits.is_empty() || benefits.iter().any(|b| r.benefits.get(*b)))
                && price_range.contains(r.price)
                && (age <= self.anti_aging_age || r.benefits.anti_aging)
        };

        categories
            .iter()
            .map(|category| {
                let candidates = records
                    .iter()
                    .filter(|r| &r.label == category)
                    .filter(|r| qualifies(*r));

                CategoryMatches {
                    category: category.clone(),
                    products: self.top_by_rating(candidates),
                }
            })
            .collect()
    }

    /// Sunscreens across all categories: suits at least one selected skin
    /// type, meets the SPF floor and the budget.
    pub fn recommend_sunscreen(
        &self,
        records: &[MergedProductRecord],
        skin_types: &[SkinType],
        price_range: PriceRange,
        uv_index: Option<f64>,
    ) -> Vec<MergedProductRecord> {
        let floor = self.spf_floor(uv_index);

        let candidates = records.iter().filter(|r| {
            skin_types.iter().any(|t| r.skin_types.get(*t))
                && r.spf >= floor
                && price_range.contains(r.price)
        });

        self.top_by_rating(candidates)
    }

    fn top_by_rating<'a>(
        &self,
        candidates: impl Iterator<Item = &'a MergedProductRecord>,
    ) -> Vec<MergedProductRecord> {
        let mut seen = HashSet::new();
        let mut unique: Vec<&MergedProductRecord> = candidates
            .filter(|r| seen.insert(r.name.clone()))
            .collect();

        unique.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        unique.into_iter().take(self.top_n).cloned().collect()
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(&RecommendationSettings::default())
    }
}

/// Coarse per-category recommendation with default settings.
pub fn recommend(
    records: &[MergedProductRecord],
    categories: &[String],
    skin_types: &[SkinType],
    uv_index: Option<f64>,
) -> Vec<CategoryOutcome> {
    RecommendationEngine::default().recommend(records, categories, skin_types, uv_index)
}

/// Exact-match top picks per category with default settings.
pub fn filter_exact(
    records: &[MergedProductRecord],
    categories: &[String],
    skin_types: &[SkinType],
    benefits: &[Benefit],
    price_range: PriceRange,
    age: u32,
) -> Vec<CategoryMatches> {
    RecommendationEngine::default().filter_exact(records, categories, skin_types, benefits, price_range, age)
}

/// Sunscreen top picks with default settings.
pub fn recommend_sunscreen(
    records: &[MergedProductRecord],
    skin_types: &[SkinType],
    price_range: PriceRange,
    uv_index: Option<f64>,
) -> Vec<MergedProductRecord> {
    RecommendationEngine::default().recommend_sunscreen(records, skin_types, price_range, uv_index)
}
