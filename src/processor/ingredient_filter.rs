use std::collections::HashSet;
use tracing::info;

use crate::models::{BannedIngredientRecord, SkincareIngredientRecord};

/// Drops skincare records containing a banned substance and applies the
/// fixed brand/name spelling corrections.
pub struct IngredientFilter;

impl IngredientFilter {
    pub fn filter(
        &self,
        skincare: &[SkincareIngredientRecord],
        banned: &[BannedIngredientRecord],
    ) -> Vec<SkincareIngredientRecord> {
        let banned_names = self.banned_names(banned);

        let mut seen = HashSet::new();
        let unique: Vec<&SkincareIngredientRecord> = skincare
            .iter()
            .filter(|record| seen.insert(record_key(record)))
            .collect();

        let kept: Vec<SkincareIngredientRecord> = unique
            .into_iter()
            .map(lowercase_record)
            .filter(|record| {
                !banned_names
                    .iter()
                    .any(|banned| record.ingredients.contains(banned.as_str()))
            })
            .map(correct_spelling)
            .collect();

        info!(
            "Ingredient filter: kept {} of {} skincare records ({} banned names)",
            kept.len(),
            skincare.len(),
            banned_names.len()
        );

        kept
    }

    /// Lowercased, deduplicated, non-empty names in first-seen order.
    pub fn banned_names(&self, banned: &[BannedIngredientRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        banned
            .iter()
            .map(|b| b.name.to_lowercase())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }
}

fn record_key(record: &SkincareIngredientRecord) -> String {
    format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{:?}\u{1f}{:?}\u{1f}{}\u{1f}{:?}",
        record.label,
        record.brand,
        record.name,
        record.price,
        record.rank,
        record.ingredients,
        record.skin_types
    )
}

fn lowercase_record(record: &SkincareIngredientRecord) -> SkincareIngredientRecord {
    SkincareIngredientRecord {
        label: record.label.to_lowercase(),
        brand: record.brand.to_lowercase(),
        name: record.name.to_lowercase(),
        ingredients: record.ingredients.to_lowercase(),
        ..record.clone()
    }
}

fn correct_spelling(mut record: SkincareIngredientRecord) -> SkincareIngredientRecord {
    record.brand = record.brand.replace("lncme", "lancome");
    for field in [
        &mut record.label,
        &mut record.brand,
        &mut record.name,
        &mut record.ingredients,
    ] {
        *field = field.replace("crme", "creme");
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkinTypeFlags;

    fn skincare(brand: &str, name: &str, ingredients: &str) -> SkincareIngredientRecord {
        SkincareIngredientRecord {
            label: "Moisturizer".into(),
            brand: brand.into(),
            name: name.into(),
            price: Some(30.0),
            rank: Some(4.1),
            ingredients: ingredients.into(),
            skin_types: SkinTypeFlags::default(),
        }
    }

    fn banned(name: &str) -> BannedIngredientRecord {
        BannedIngredientRecord {
            name: name.into(),
            restriction: "Not permitted for all products".into(),
        }
    }

    #[test]
    fn test_banned_substring_removes_record() {
        let records = vec![
            skincare("A", "Cream", "Water, Mercury Compounds, Glycerin"),
            skincare("B", "Lotion", "Water, Glycerin"),
        ];
        let kept = IngredientFilter.filter(&records, &[banned("MERCURY")]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].brand, "b");
        assert_eq!(kept[0].ingredients, "water, glycerin");
    }

    #[test]
    fn test_containment_ignores_word_boundaries() {
        let records = vec![skincare("A", "Serum", "Water, Chloroformate")];
        assert!(IngredientFilter.filter(&records, &[banned("chloroform")]).is_empty());
    }

    #[test]
    fn test_spelling_corrections() {
        let records = vec![skincare("Lncme", "Rnergie Crme", "water")];
        let kept = IngredientFilter.filter(&records, &[]);

        assert_eq!(kept[0].brand, "lancome");
        assert_eq!(kept[0].name, "rnergie creme");
        assert_eq!(kept[0].brand_name(), "lancome rnergie creme");
    }

    #[test]
    fn test_duplicates_and_blank_banned_names() {
        let records = vec![
            skincare("A", "Cream", "water"),
            skincare("A", "Cream", "water"),
        ];
        let banned_list = vec![banned(""), banned("Lead"), banned("lead")];

        assert_eq!(IngredientFilter.banned_names(&banned_list), vec!["lead".to_string()]);
        assert_eq!(IngredientFilter.filter(&records, &banned_list).len(), 1);
    }
}
