use anyhow::{Result, anyhow};
use regex::Regex;
use tracing::{info, warn};

use super::price_parser::coerce_number;
use crate::error::SkinWizError;
use crate::models::{SkinType, SkinTypeFlags, SkincareIngredientRecord};

pub const SKINCARE_COLUMNS: [&str; 11] = [
    "Label",
    "Brand",
    "Name",
    "Price",
    "Rank",
    "Ingredients",
    "Combination",
    "Dry",
    "Normal",
    "Oily",
    "Sensitive",
];

/// Parses the attribute-format skincare dump (header section, then `@DATA`
/// followed by comma-separated rows with single-quoted text fields).
pub struct SkincareCleaner {
    field_pattern: Regex,
}

impl SkincareCleaner {
    pub fn new() -> Result<Self> {
        Ok(SkincareCleaner {
            field_pattern: Regex::new(r"(?:'[^']*'|[^,]+)")?,
        })
    }

    pub fn clean(&self, raw: &str) -> Result<Vec<SkincareIngredientRecord>> {
        let mut lines = raw.lines();
        lines
            .by_ref()
            .find(|line| line.trim() == "@DATA")
            .ok_or_else(|| anyhow!("No @DATA section in skincare source"))?;

        let mut records = Vec::new();
        let mut failed_count = 0;
        let mut total = 0;

        for (row, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            total += 1;

            match self.parse_row(row, line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    failed_count += 1;
                    warn!("{}", e);
                }
            }
        }

        info!(
            "Skincare cleaning summary: {} successful, {} failed out of {} total",
            records.len(),
            failed_count,
            total
        );

        Ok(records)
    }

    pub fn split_fields(&self, line: &str) -> Vec<String> {
        self.field_pattern
            .find_iter(line.trim())
            .map(|m| strip_quotes(m.as_str().trim()).to_string())
            .collect()
    }

    fn parse_row(&self, row: usize, line: &str) -> Result<SkincareIngredientRecord, SkinWizError> {
        let fields = self.split_fields(line);
        if fields.len() != SKINCARE_COLUMNS.len() {
            return Err(SkinWizError::malformed(
                "skincare",
                row,
                format!("expected {} fields, found {}", SKINCARE_COLUMNS.len(), fields.len()),
            ));
        }

        let mut skin_types = SkinTypeFlags::default();
        for (skin_type, value) in SkinType::ALL.into_iter().zip(&fields[6..]) {
            let flag = coerce_number(value).ok_or_else(|| {
                SkinWizError::malformed("skincare", row, format!("{} flag is {:?}", skin_type, value))
            })?;
            skin_types.set(skin_type, flag != 0.0);
        }

        Ok(SkincareIngredientRecord {
            label: fields[0].clone(),
            brand: fields[1].clone(),
            name: fields[2].clone(),
            price: coerce_number(&fields[3]),
            rank: coerce_number(&fields[4]),
            ingredients: fields[5].clone(),
            skin_types,
        })
    }
}

fn strip_quotes(field: &str) -> &str {
    let field = field.strip_prefix('\'').unwrap_or(field);
    field.strip_suffix('\'').unwrap_or(field)
}
