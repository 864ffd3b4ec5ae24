use std::fmt;

use tracing::info;

use super::engine::RecommendationEngine;
use super::spf_floor::spf_floor;
use crate::config::RecommendationSettings;
use crate::error::SkinWizError;
use crate::fetcher::WeatherReport;
use crate::models::{MergedProductRecord, UserProfile};

#[derive(Debug, Clone, PartialEq)]
pub enum SunscreenAdvice {
    Recommended(Vec<MergedProductRecord>),
    NotNeeded,
    WeatherUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecommendation {
    pub category: String,
    pub outcome: Result<Vec<MergedProductRecord>, SkinWizError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationReport {
    pub name: String,
    pub categories: Vec<CategoryRecommendation>,
    pub weather: Result<WeatherReport, SkinWizError>,
    /// SPF shown with the forecast, from the advisory table.
    pub advisory_spf: Option<u32>,
    pub sunscreens: SunscreenAdvice,
}

/// Coarse pass over the merged set, exact pass per category over the coarse
/// picks, then sunscreens when the UV index is high enough.
pub fn build_report(
    settings: &RecommendationSettings,
    records: &[MergedProductRecord],
    profile: &UserProfile,
    weather: Result<WeatherReport, SkinWizError>,
) -> Result<RecommendationReport, SkinWizError> {
    profile.validate()?;

    let engine = RecommendationEngine::new(settings);
    let uv_index = weather.as_ref().ok().map(|w| w.uv_index_max);
    let price_range = profile.price_range();

    let coarse = engine.recommend(records, &profile.categories, &profile.skin_types, uv_index);
    let mut coarse_union: Vec<MergedProductRecord> = Vec::new();

    let categories = coarse
        .into_iter()
        .map(|entry| {
            let outcome = entry.outcome.map(|scored| {
                let candidates: Vec<MergedProductRecord> =
                    scored.into_iter().map(|s| s.record).collect();
                let picks = engine
                    .filter_exact(
                        &candidates,
                        std::slice::from_ref(&entry.category),
                        &profile.skin_types,
                        &profile.benefits,
                        price_range,
                        profile.age,
                    )
                    .into_iter()
                    .next()
                    .map(|m| m.products)
                    .unwrap_or_default();
                coarse_union.extend(candidates);
                picks
            });

            CategoryRecommendation {
                category: entry.category,
                outcome,
            }
        })
        .collect::<Vec<_>>();

    let sunscreens = match uv_index {
        None => SunscreenAdvice::WeatherUnavailable,
        Some(uv) if uv > settings.sunscreen_uv_threshold => SunscreenAdvice::Recommended(
            engine.recommend_sunscreen(&coarse_union, &profile.skin_types, price_range, Some(uv)),
        ),
        Some(_) => SunscreenAdvice::NotNeeded,
    };

    let advisory_spf = uv_index.map(|uv| spf_floor(uv, settings.advisory_spf_table.thresholds()));

    info!(
        "Report for {}: {} categories, {} succeeded",
        profile.name,
        categories.len(),
        categories.iter().filter(|c| c.outcome.is_ok()).count()
    );

    Ok(RecommendationReport {
        name: profile.name.clone(),
        categories,
        weather,
        advisory_spf,
        sunscreens,
    })
}

fn write_products(f: &mut fmt::Formatter<'_>, products: &[MergedProductRecord]) -> fmt::Result {
    if products.is_empty() {
        return writeln!(f, "  No products match your criteria.");
    }
    for p in products {
        writeln!(f, "  - {} | ${:.2} | rating {:.1} | SPF {} | {}", p.product, p.price, p.rating, p.spf, p.url)?;
    }
    Ok(())
}

impl fmt::Display for RecommendationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recommendations for {}", self.name)?;

        match &self.weather {
            Ok(w) => {
                write!(f, "Weather in {}: {:.1}°C, max UV index {:.1}", w.city, w.temperature_c, w.uv_index_max)?;
                match self.advisory_spf {
                    Some(spf) if spf > 0 => writeln!(f, " (use at least SPF {})", spf)?,
                    _ => writeln!(f, " (no sunscreen needed)")?,
                }
            }
            Err(e) => writeln!(f, "Weather unavailable: {}", e)?,
        }

        for entry in &self.categories {
            writeln!(f)?;
            writeln!(f, "[{}]", entry.category)?;
            match &entry.outcome {
                Ok(products) => write_products(f, products)?,
                Err(e) => writeln!(f, "  {}", e)?,
            }
        }

        if let SunscreenAdvice::Recommended(products) = &self.sunscreens {
            writeln!(f)?;
            writeln!(f, "[sunscreen]")?;
            write_products(f, products)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Benefit, BenefitFlags, SkinType, SkinTypeFlags};
    use chrono::Utc;

    fn record(label: &str, name: &str, price: f64, spf: u32, rating: f64) -> MergedProductRecord {
        MergedProductRecord {
            label: label.into(),
            brand: "brand".into(),
            name: name.into(),
            rank: None,
            ingredients: "water, glycerin".into(),
            skin_types: SkinTypeFlags {
                dry: true,
                oily: true,
                ..Default::default()
            },
            brand_name: "brand".into(),
            product: format!("Brand {}", name),
            review_count: 10,
            price,
            url: format!("https://example.com/{}", name),
            rating,
            spf,
            benefits: BenefitFlags {
                hydration: true,
                ..Default::default()
            },
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            name: "Sam".into(),
            age: 25,
            city: "Chicago, IL".into(),
            categories: vec!["moisturizer".into(), "serum".into()],
            skin_types: vec![SkinType::Dry],
            benefits: vec![Benefit::Hydration],
            max_price: 100.0,
        }
    }

    fn weather(uv: f64) -> Result<WeatherReport, SkinWizError> {
        Ok(WeatherReport {
            city: "Chicago, IL".into(),
            temperature_c: 20.0,
            uv_index_max: uv,
            fetched_at: Utc::now(),
        })
    }

    fn records() -> Vec<MergedProductRecord> {
        vec![
            record("moisturizer", "a", 5.0, 30, 4.1),
            record("moisturizer", "b", 50.0, 0, 4.8),
            record("moisturizer", "c", 150.0, 50, 4.9),
            record("cleanser", "d", 12.0, 0, 4.0),
        ]
    }

    #[test]
    fn test_unknown_category_fails_alone() {
        let report = build_report(&RecommendationSettings::default(), &records(), &profile(), weather(3.0)).unwrap();

        assert_eq!(report.categories.len(), 2);
        let names: Vec<&str> = report.categories[0]
            .outcome
            .as_ref()
            .unwrap()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(
            report.categories[1].outcome,
            Err(SkinWizError::UnknownCategory("serum".into()))
        );
        assert_eq!(report.sunscreens, SunscreenAdvice::NotNeeded);
        assert_eq!(report.advisory_spf, Some(15));
    }

    #[test]
    fn test_high_uv_adds_sunscreens() {
        let report = build_report(&RecommendationSettings::default(), &records(), &profile(), weather(6.5)).unwrap();

        let picks = report.categories[0].outcome.as_ref().unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].name, "a");

        match report.sunscreens {
            SunscreenAdvice::Recommended(products) => {
                // "c" meets the floor but is over budget
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].name, "a");
            }
            other => panic!("expected sunscreens, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_weather_means_no_floor() {
        let failure = Err(SkinWizError::UpstreamFetch("timeout".into()));
        let report = build_report(&RecommendationSettings::default(), &records(), &profile(), failure).unwrap();

        assert_eq!(report.sunscreens, SunscreenAdvice::WeatherUnavailable);
        assert_eq!(report.advisory_spf, None);
        assert_eq!(report.categories[0].outcome.as_ref().unwrap().len(), 2);

        let text = report.to_string();
        assert!(text.contains("Weather unavailable"));
        assert!(text.contains("unrecognized product category: serum"));
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let mut p = profile();
        p.benefits.clear();
        let result = build_report(&RecommendationSettings::default(), &records(), &p, weather(1.0));
        assert!(matches!(result, Err(SkinWizError::InvalidProfile(_))));
    }
}
