use std::cmp::Ordering;
use tracing::{info, warn};

use super::price_parser::parse_price;
use crate::error::SkinWizError;
use crate::models::CombinedRecord;

/// A combined record whose listing price parsed cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedRecord {
    pub combined: CombinedRecord,
    pub price: f64,
}

/// Keeps the cheapest combined record per listing title.
pub struct Deduplicator;

impl Deduplicator {
    pub fn deduplicate(&self, combined: Vec<CombinedRecord>) -> Vec<PricedRecord> {
        let total = combined.len();
        let mut failed_count = 0;

        let mut priced: Vec<PricedRecord> = combined
            .into_iter()
            .enumerate()
            .filter_map(|(row, record)| match parse_price(&record.listing.price) {
                Ok(price) => Some(PricedRecord {
                    combined: record,
                    price,
                }),
                Err(e) => {
                    failed_count += 1;
                    warn!("{}", SkinWizError::malformed("combined", row, e.to_string()));
                    None
                }
            })
            .collect();

        // Stable: equal (product, price) pairs keep their match order.
        priced.sort_by(|a, b| {
            a.combined
                .listing
                .product
                .cmp(&b.combined.listing.product)
                .then_with(|| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
        });
        priced.dedup_by(|later, first| later.combined.listing.product == first.combined.listing.product);

        info!(
            "Deduplicator: {} unique products from {} combined rows ({} unparsable prices)",
            priced.len(),
            total,
            failed_count
        );

        priced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmazonListingRecord, SkinTypeFlags, SkincareIngredientRecord};

    fn combined(name: &str, product: &str, price: &str) -> CombinedRecord {
        CombinedRecord {
            skincare: SkincareIngredientRecord {
                label: "moisturizer".into(),
                brand: "cerave".into(),
                name: name.into(),
                price: None,
                rank: None,
                ingredients: "water".into(),
                skin_types: SkinTypeFlags::default(),
            },
            brand_name: format!("cerave {}", name),
            listing: AmazonListingRecord {
                product: product.into(),
                review_count: 1,
                price: price.into(),
                url: String::new(),
                rating: 4.0,
            },
        }
    }

    #[test]
    fn test_cheapest_survives() {
        let rows = vec![
            combined("cream", "CeraVe Cream", "$12.00"),
            combined("cream", "CeraVe Cream", "$9.50"),
        ];
        let kept = Deduplicator.deduplicate(rows);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].price, 9.5);
    }

    #[test]
    fn test_ties_keep_first_match() {
        let rows = vec![
            combined("first", "CeraVe Cream", "$9.50"),
            combined("second", "CeraVe Cream", "$9.50"),
            combined("other", "Aveeno Lotion", "$7.00"),
        ];
        let kept = Deduplicator.deduplicate(rows);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].combined.listing.product, "Aveeno Lotion");
        assert_eq!(kept[1].combined.skincare.name, "first");
    }

    #[test]
    fn test_unparsable_prices_are_dropped() {
        let rows = vec![
            combined("cream", "CeraVe Cream", "see options"),
            combined("cream", "CeraVe Cream", "$1,020.00"),
        ];
        let kept = Deduplicator.deduplicate(rows);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].price, 1020.0);
    }
}
