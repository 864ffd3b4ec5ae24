use std::collections::BTreeSet;

/// Lowercase whitespace-delimited words of a product name.
pub type TokenSet = BTreeSet<String>;

pub struct NameNormalizer;

impl NameNormalizer {
    pub fn tokenize(&self, text: &str) -> TokenSet {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}
