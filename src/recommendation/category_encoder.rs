use std::collections::BTreeSet;

use crate::error::SkinWizError;
use crate::models::MergedProductRecord;

/// Category label ↔ ordinal, derived from the records on every call.
/// Ordinals follow the sorted order of the distinct labels.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    classes: Vec<String>,
}

impl CategoryEncoder {
    pub fn fit(records: &[MergedProductRecord]) -> Self {
        let classes: BTreeSet<&str> = records.iter().map(|r| r.label.as_str()).collect();
        CategoryEncoder {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn encode(&self, label: &str) -> Result<usize, SkinWizError> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| SkinWizError::UnknownCategory(label.to_string()))
    }

    pub fn decode(&self, ordinal: usize) -> Option<&str> {
        self.classes.get(ordinal).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}
