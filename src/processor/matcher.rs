use std::collections::HashMap;
use tracing::info;

use super::name_normalizer::{NameNormalizer, TokenSet};
use crate::models::{AmazonListingRecord, CombinedRecord, SkincareIngredientRecord};

/// Finds the listings whose title contains every token of a skincare name.
///
/// Implementations must return listing indices in ascending order so that
/// the merge output does not depend on the strategy chosen.
pub trait Matcher {
    fn matching_listings(&self, tokens: &TokenSet) -> Vec<usize>;
}

/// Scans every listing for every skincare record.
pub struct AllPairsMatcher {
    listing_tokens: Vec<TokenSet>,
}

impl AllPairsMatcher {
    pub fn new(listings: &[AmazonListingRecord]) -> Self {
        let listing_tokens = listings
            .iter()
            .map(|l| NameNormalizer.tokenize(&l.product))
            .collect();
        AllPairsMatcher { listing_tokens }
    }
}

impl Matcher for AllPairsMatcher {
    fn matching_listings(&self, tokens: &TokenSet) -> Vec<usize> {
        self.listing_tokens
            .iter()
            .enumerate()
            .filter(|(_, listing)| tokens.is_subset(listing))
            .map(|(index, _)| index)
            .collect()
    }
}

/// Token → listing ids. Candidates come from the rarest token's postings.
pub struct InvertedIndexMatcher {
    postings: HashMap<String, Vec<usize>>,
    listing_tokens: Vec<TokenSet>,
}

impl InvertedIndexMatcher {
    pub fn new(listings: &[AmazonListingRecord]) -> Self {
        let listing_tokens: Vec<TokenSet> = listings
            .iter()
            .map(|l| NameNormalizer.tokenize(&l.product))
            .collect();

        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, tokens) in listing_tokens.iter().enumerate() {
            for token in tokens {
                postings.entry(token.clone()).or_default().push(index);
            }
        }

        InvertedIndexMatcher {
            postings,
            listing_tokens,
        }
    }
}

impl Matcher for InvertedIndexMatcher {
    fn matching_listings(&self, tokens: &TokenSet) -> Vec<usize> {
        // The empty set is a subset of every listing.
        if tokens.is_empty() {
            return (0..self.listing_tokens.len()).collect();
        }

        let mut rarest: Option<&Vec<usize>> = None;
        for token in tokens {
            match self.postings.get(token) {
                None => return Vec::new(),
                Some(list) if rarest.is_none_or(|r| list.len() < r.len()) => rarest = Some(list),
                Some(_) => {}
            }
        }

        // Postings are built in index order, so the result stays ascending.
        rarest
            .map(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .filter(|&index| tokens.is_subset(&self.listing_tokens[index]))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Pairs every skincare record with every listing it matches, in table order.
pub fn match_records(
    matcher: &dyn Matcher,
    skincare: &[SkincareIngredientRecord],
    listings: &[AmazonListingRecord],
) -> Vec<CombinedRecord> {
    let mut combined = Vec::new();
    let mut matched_skincare = 0;

    for record in skincare {
        let brand_name = record.brand_name();
        let tokens = NameNormalizer.tokenize(&brand_name);
        let hits = matcher.matching_listings(&tokens);

        if !hits.is_empty() {
            matched_skincare += 1;
        }

        for index in hits {
            combined.push(CombinedRecord {
                skincare: record.clone(),
                brand_name: brand_name.clone(),
                listing: listings[index].clone(),
            });
        }
    }

    info!(
        "Matcher: {} of {} skincare records matched, {} combined rows",
        matched_skincare,
        skincare.len(),
        combined.len()
    );

    combined
}
