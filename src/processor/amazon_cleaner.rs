use tracing::{info, warn};

use crate::error::SkinWizError;
use crate::models::AmazonListingRecord;

const UNWANTED_PHRASES: [&str; 10] = [
    "new offer",
    "Learn more",
    "Visit the help section",
    "contact us",
    "Remove",
    "Leave ad feedback",
    "Refresh Your BeautyRefresh Your Beauty",
    "CleansersCleansers",
    "Best SellersBest Sellers",
    "MasksMasks",
];

/// One anchor scraped from a search results page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLinkRow {
    pub link_text: Option<String>,
    pub url: Option<String>,
}

impl RawLinkRow {
    pub fn new(link_text: Option<&str>, url: Option<&str>) -> Self {
        RawLinkRow {
            link_text: link_text.map(str::to_string),
            url: url.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ListingTriplet {
    product: Option<String>,
    review_count: Option<String>,
    price: Option<String>,
    url: Option<String>,
}

/// Rebuilds listings from the flat anchor dump: product name, review count
/// and price arrive as consecutive rows, ratings in a separate column.
pub struct AmazonCleaner;

impl AmazonCleaner {
    pub fn clean(&self, rows: &[RawLinkRow], ratings: &[Option<String>]) -> Vec<AmazonListingRecord> {
        let relevant: Vec<&RawLinkRow> = rows
            .iter()
            .filter(|row| {
                row.link_text
                    .as_deref()
                    .is_none_or(|text| !UNWANTED_PHRASES.iter().any(|p| text.contains(p)))
            })
            .collect();

        let triplets = self.transpose(&relevant);
        let ratings: Vec<String> = ratings
            .iter()
            .flatten()
            .filter_map(|r| r.split(' ').next().map(str::to_string))
            .collect();

        let mut records = Vec::new();
        let mut failed_count = 0;
        let paired = triplets.len().min(ratings.len());

        for (row, (triplet, rating)) in triplets.into_iter().zip(ratings).enumerate() {
            match self.to_record(row, triplet, &rating) {
                Ok(record) => records.push(record),
                Err(e) => {
                    failed_count += 1;
                    warn!("{}", e);
                }
            }
        }

        info!(
            "Amazon cleaning summary: {} successful, {} failed out of {} paired rows",
            records.len(),
            failed_count,
            paired
        );

        records
    }

    fn transpose(&self, rows: &[&RawLinkRow]) -> Vec<ListingTriplet> {
        let text_at = |i: usize| rows.get(i).and_then(|r| r.link_text.as_deref());

        let mut triplets = Vec::new();
        let mut i = 0;

        while i < rows.len() {
            let mut triplet = ListingTriplet {
                product: text_at(i).map(str::to_string),
                ..Default::default()
            };

            if let Some(value) = text_at(i + 1) {
                let digits = value.replace(',', "");
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    triplet.review_count = Some(digits);
                }
            }

            if let Some(value) = text_at(i + 2).filter(|v| v.starts_with('$')) {
                triplet.price = Some(first_price(value));
                triplet.url = rows[i + 2].url.as_deref().map(clean_url);
            }

            let step = if triplet.review_count.is_some() && triplet.price.is_some() {
                3
            } else {
                2
            };

            triplets.push(triplet);
            i += step;
        }

        triplets
    }

    fn to_record(
        &self,
        row: usize,
        triplet: ListingTriplet,
        rating: &str,
    ) -> Result<AmazonListingRecord, SkinWizError> {
        let missing = |field: &str| SkinWizError::malformed("amazon", row, format!("missing {}", field));

        let product = triplet.product.ok_or_else(|| missing("product"))?;
        let review_count = triplet
            .review_count
            .ok_or_else(|| missing("review count"))?
            .parse::<u64>()
            .map_err(|e| SkinWizError::malformed("amazon", row, e.to_string()))?;
        let price = triplet.price.ok_or_else(|| missing("price"))?;
        let url = triplet.url.ok_or_else(|| missing("url"))?;
        let rating = rating
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .ok_or_else(|| SkinWizError::malformed("amazon", row, format!("rating {:?}", rating)))?;

        Ok(AmazonListingRecord {
            product,
            review_count,
            price,
            url,
            rating,
        })
    }
}

/// `"$12.99$15.99 (2 offers)"` → `"$12.99"`.
fn first_price(text: &str) -> String {
    let before_details = text.split('(').next().unwrap_or_default();
    match before_details.split('$').nth(1) {
        Some(amount) => format!("${}", amount),
        None => before_details.to_string(),
    }
}

/// Drops the query string and repairs doubled `https://` prefixes.
fn clean_url(url: &str) -> String {
    let url = url.split('?').next().unwrap_or_default();
    match url.match_indices("https://").nth(1) {
        Some((second, _)) => url[second..].to_string(),
        None => url.to_string(),
    }
}
