use anyhow::{Result, anyhow};
use tracing::{debug, info};

use crate::models::BannedIngredientRecord;

pub const NAME_COLUMN: &str = "Name";
pub const RESTRICTION_COLUMN: &str = "Restriction(s)";

const PROHIBITED_PREFIX: &str = "Not permitted for all products";

/// Parses the tab-separated regulatory export and keeps only substances that
/// are prohibited for every product type.
pub struct BannedCleaner;

impl BannedCleaner {
    pub fn clean(&self, raw: &str) -> Result<Vec<BannedIngredientRecord>> {
        let rows: Vec<&str> = raw.lines().collect();

        let start = rows
            .iter()
            .position(|row| row.contains(NAME_COLUMN) && row.contains("EC No."))
            .unwrap_or(0);

        let header = split_row(rows.get(start).copied().unwrap_or_default());
        let name_idx = column_index(&header, NAME_COLUMN)?;
        let restriction_idx = column_index(&header, RESTRICTION_COLUMN)?;

        let mut skipped = 0;
        let mut records = Vec::new();

        for row in rows.iter().skip(start + 1) {
            let columns = split_row(row);
            if columns.len() != header.len() {
                skipped += 1;
                continue;
            }
            if !columns[restriction_idx].starts_with(PROHIBITED_PREFIX) {
                continue;
            }
            records.push(BannedIngredientRecord {
                name: columns[name_idx].clone(),
                restriction: columns[restriction_idx].clone(),
            });
        }

        debug!("Skipped {} banned-list rows with a mismatched column count", skipped);
        info!("Banned ingredient cleaning: {} prohibited substances", records.len());

        Ok(records)
    }
}

fn split_row(row: &str) -> Vec<String> {
    row.replace('"', "").split('\t').map(str::to_string).collect()
}

fn column_index(header: &[String], column: &str) -> Result<usize> {
    header
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| anyhow!("Banned ingredient header has no {:?} column", column))
}
