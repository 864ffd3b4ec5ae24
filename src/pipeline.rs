use anyhow::{Context, Result};
use tracing::info;

use crate::processor::{
    AmazonCleaner, AttributeTagger, BannedCleaner, Deduplicator, IngredientFilter,
    InvertedIndexMatcher, SkincareCleaner, match_records,
};
use crate::storage::CsvStore;

/// Row counts of one cleaning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
    pub skincare: usize,
    pub banned: usize,
    pub listings: usize,
}

/// Row counts after each merge stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub skincare_in: usize,
    pub after_filter: usize,
    pub combined: usize,
    pub deduplicated: usize,
}

/// Raw scraped/exported files to the three cleaned tables.
pub fn run_all_cleaners(store: &CsvStore) -> Result<CleanSummary> {
    // Skincare ingredient dump
    let skincare_raw = store.read_raw_skincare().context("Failed to read raw skincare data")?;
    let skincare = SkincareCleaner::new()?.clean(&skincare_raw)?;
    store.write_skincare(&skincare)?;

    // Regulatory banned-substance export
    let banned_raw = store.read_raw_banned().context("Failed to read raw banned list")?;
    let banned = BannedCleaner.clean(&banned_raw)?;
    store.write_banned(&banned)?;

    // Scraped search-result anchors and ratings
    let (rows, ratings) = store.read_raw_links().context("Failed to read raw Amazon links")?;
    let listings = AmazonCleaner.clean(&rows, &ratings);
    store.write_amazon(&listings)?;

    let summary = CleanSummary {
        skincare: skincare.len(),
        banned: banned.len(),
        listings: listings.len(),
    };
    info!(
        "Cleaned {} skincare records, {} banned ingredients, {} listings",
        summary.skincare, summary.banned, summary.listings
    );
    Ok(summary)
}

/// Cleaned tables to the merged, tagged product table.
pub fn process_and_merge(store: &CsvStore, tagger: &AttributeTagger) -> Result<MergeSummary> {
    // Load cleaned tables
    let skincare = store.read_skincare()?;
    let banned = store.read_banned()?;
    let listings = store.read_amazon()?;

    // Drop products containing banned substances
    let filtered = IngredientFilter.filter(&skincare, &banned);

    // Pair products with listings by name tokens
    let matcher = InvertedIndexMatcher::new(&listings);
    let combined = match_records(&matcher, &filtered, &listings);
    let combined_len = combined.len();

    // Cheapest listing per title, then SPF and benefit tags
    let deduplicated = Deduplicator.deduplicate(combined);
    let merged = tagger.tag_all(deduplicated);

    // Save merged dataset
    let path = store.write_merged(&merged)?;
    info!("Merged {} products into {}", merged.len(), path.display());

    Ok(MergeSummary {
        skincare_in: skincare.len(),
        after_filter: filtered.len(),
        combined: combined_len,
        deduplicated: merged.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use crate::models::{AmazonListingRecord, BannedIngredientRecord, SkinTypeFlags, SkincareIngredientRecord};
    use tempfile::TempDir;

    #[test]
    fn test_merge_from_cleaned_tables() {
        let dir = TempDir::new().unwrap();
        let store = CsvStore::new(DatasetConfig::from_root(dir.path()));

        store
            .write_skincare(&[
                SkincareIngredientRecord {
                    label: "moisturizer".into(),
                    brand: "CeraVe".into(),
                    name: "Daily Lotion".into(),
                    price: Some(14.0),
                    rank: Some(4.5),
                    ingredients: "Water, Glycerin, Ceramide".into(),
                    skin_types: SkinTypeFlags { dry: true, ..Default::default() },
                },
                SkincareIngredientRecord {
                    label: "moisturizer".into(),
                    brand: "Acme".into(),
                    name: "Bad Cream".into(),
                    price: Some(9.0),
                    rank: None,
                    ingredients: "Water, Mercury".into(),
                    skin_types: SkinTypeFlags::default(),
                },
            ])
            .unwrap();
        store
            .write_banned(&[BannedIngredientRecord {
                name: "Mercury".into(),
                restriction: "Not permitted for all products".into(),
            }])
            .unwrap();
        store
            .write_amazon(&[AmazonListingRecord {
                product: "CeraVe Daily Lotion SPF 30 12oz".into(),
                review_count: 120,
                price: "$14.99".into(),
                url: "https://www.amazon.com/dp/1".into(),
                rating: 4.6,
            }])
            .unwrap();

        let summary = process_and_merge(&store, &AttributeTagger::default()).unwrap();
        assert_eq!(summary.skincare_in, 2);
        assert_eq!(summary.after_filter, 1);
        assert_eq!(summary.combined, 1);
        assert_eq!(summary.deduplicated, 1);

        let merged = store.load_merged().unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].spf, 30);
        assert_eq!(merged[0].price, 14.99);
        assert!(merged[0].benefits.hydration);
    }
}
