use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{
    AMAZON_CLEANED_FILE, AMAZON_RAW_FILE, BANNED_CLEANED_FILE, BANNED_RAW_FILE, DatasetConfig,
    SKINCARE_CLEANED_FILE, SKINCARE_RAW_FILE,
};
use crate::error::SkinWizError;
use crate::models::{
    AmazonListingRecord, BannedIngredientRecord, Benefit, BenefitFlags, MergedProductRecord,
    SkinType, SkinTypeFlags, SkincareIngredientRecord,
};
use crate::processor::{RawLinkRow, coerce_number, parse_price};

/// Local CSV tables for every pipeline stage.
pub struct CsvStore {
    config: DatasetConfig,
}

impl CsvStore {
    pub fn new(config: DatasetConfig) -> Self {
        CsvStore { config }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn read_raw_skincare(&self) -> Result<String> {
        read_text(&self.config.raw_path(SKINCARE_RAW_FILE))
    }

    pub fn read_raw_banned(&self) -> Result<String> {
        read_text(&self.config.raw_path(BANNED_RAW_FILE))
    }

    /// Anchor rows and the separately scraped rating column.
    pub fn read_raw_links(&self) -> Result<(Vec<RawLinkRow>, Vec<Option<String>>)> {
        let df = read_table(&self.config.raw_path(AMAZON_RAW_FILE))?;
        let texts = string_column(&df, "Link Text")?;
        let urls = string_column(&df, "URL")?;
        let ratings = string_column(&df, "Rating")?;

        let rows = texts
            .into_iter()
            .zip(urls)
            .map(|(link_text, url)| RawLinkRow { link_text, url })
            .collect();

        Ok((rows, ratings))
    }

    pub fn write_skincare(&self, records: &[SkincareIngredientRecord]) -> Result<PathBuf> {
        let flag = |t: SkinType| -> Vec<i64> {
            records.iter().map(|r| r.skin_types.get(t) as i64).collect()
        };

        let mut df = df!(
            "Label" => records.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            "Brand" => records.iter().map(|r| r.brand.as_str()).collect::<Vec<_>>(),
            "Name" => records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Price" => records.iter().map(|r| r.price).collect::<Vec<_>>(),
            "Rank" => records.iter().map(|r| r.rank).collect::<Vec<_>>(),
            "Ingredients" => records.iter().map(|r| r.ingredients.as_str()).collect::<Vec<_>>(),
            "Combination" => flag(SkinType::Combination),
            "Dry" => flag(SkinType::Dry),
            "Normal" => flag(SkinType::Normal),
            "Oily" => flag(SkinType::Oily),
            "Sensitive" => flag(SkinType::Sensitive),
        )?;

        let path = self.config.cleaned_path(SKINCARE_CLEANED_FILE);
        write_table(&path, &mut df)?;
        Ok(path)
    }

    pub fn read_skincare(&self) -> Result<Vec<SkincareIngredientRecord>> {
        let path = self.config.cleaned_path(SKINCARE_CLEANED_FILE);
        let df = read_table(&path)?;

        let labels = string_column(&df, "Label")?;
        let brands = string_column(&df, "Brand")?;
        let names = string_column(&df, "Name")?;
        let prices = string_column(&df, "Price")?;
        let ranks = string_column(&df, "Rank")?;
        let ingredients = string_column(&df, "Ingredients")?;
        let flags = skin_type_columns(&df)?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let skin_types = match parse_skin_types(&flags, row) {
                Ok(skin_types) => skin_types,
                Err(e) => {
                    warn!("{}", SkinWizError::malformed("skincare", row, e));
                    continue;
                }
            };

            records.push(SkincareIngredientRecord {
                label: text(&labels[row]),
                brand: text(&brands[row]),
                name: text(&names[row]),
                price: prices[row].as_deref().and_then(coerce_number),
                rank: ranks[row].as_deref().and_then(coerce_number),
                ingredients: text(&ingredients[row]),
                skin_types,
            });
        }

        info!("Loaded {} skincare records from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn write_banned(&self, records: &[BannedIngredientRecord]) -> Result<PathBuf> {
        let mut df = df!(
            "Name" => records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Restriction(s)" => records.iter().map(|r| r.restriction.as_str()).collect::<Vec<_>>(),
        )?;

        let path = self.config.cleaned_path(BANNED_CLEANED_FILE);
        write_table(&path, &mut df)?;
        Ok(path)
    }

    pub fn read_banned(&self) -> Result<Vec<BannedIngredientRecord>> {
        let df = read_table(&self.config.cleaned_path(BANNED_CLEANED_FILE))?;
        let names = string_column(&df, "Name")?;
        let restrictions = string_column(&df, "Restriction(s)")?;

        Ok(names
            .into_iter()
            .zip(restrictions)
            .map(|(name, restriction)| BannedIngredientRecord {
                name: name.unwrap_or_default(),
                restriction: restriction.unwrap_or_default(),
            })
            .collect())
    }

    pub fn write_amazon(&self, records: &[AmazonListingRecord]) -> Result<PathBuf> {
        let mut df = df!(
            "Product" => records.iter().map(|r| r.product.as_str()).collect::<Vec<_>>(),
            "Review Count" => records.iter().map(|r| r.review_count as i64).collect::<Vec<_>>(),
            "Price" => records.iter().map(|r| r.price.as_str()).collect::<Vec<_>>(),
            "URL" => records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            "Rating" => records.iter().map(|r| r.rating).collect::<Vec<_>>(),
        )?;

        let path = self.config.cleaned_path(AMAZON_CLEANED_FILE);
        write_table(&path, &mut df)?;
        Ok(path)
    }

    pub fn read_amazon(&self) -> Result<Vec<AmazonListingRecord>> {
        let path = self.config.cleaned_path(AMAZON_CLEANED_FILE);
        let df = read_table(&path)?;

        let products = string_column(&df, "Product")?;
        let review_counts = string_column(&df, "Review Count")?;
        let prices = string_column(&df, "Price")?;
        let urls = string_column(&df, "URL")?;
        let ratings = string_column(&df, "Rating")?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let parsed = (|| {
                let review_count = review_counts[row]
                    .as_deref()
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .ok_or("review count")?;
                let rating = ratings[row]
                    .as_deref()
                    .and_then(coerce_number)
                    .ok_or("rating")?;
                let product = products[row].clone().ok_or("product")?;
                let price = prices[row].clone().ok_or("price")?;
                Ok::<_, &str>((product, review_count, price, rating))
            })();

            match parsed {
                Ok((product, review_count, price, rating)) => records.push(AmazonListingRecord {
                    product,
                    review_count,
                    price,
                    url: text(&urls[row]),
                    rating,
                }),
                Err(field) => {
                    warn!("{}", SkinWizError::malformed("amazon", row, format!("bad {}", field)));
                }
            }
        }

        info!("Loaded {} listings from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn write_merged(&self, records: &[MergedProductRecord]) -> Result<PathBuf> {
        let skin = |t: SkinType| -> Vec<i64> {
            records.iter().map(|r| r.skin_types.get(t) as i64).collect()
        };
        let benefit = |b: Benefit| -> Vec<i64> {
            records.iter().map(|r| r.benefits.get(b) as i64).collect()
        };

        let mut df = df!(
            "Label" => records.iter().map(|r| r.label.as_str()).collect::<Vec<_>>(),
            "Brand" => records.iter().map(|r| r.brand.as_str()).collect::<Vec<_>>(),
            "Name" => records.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            "Rank" => records.iter().map(|r| r.rank).collect::<Vec<_>>(),
            "Ingredients" => records.iter().map(|r| r.ingredients.as_str()).collect::<Vec<_>>(),
            "Combination" => skin(SkinType::Combination),
            "Dry" => skin(SkinType::Dry),
            "Normal" => skin(SkinType::Normal),
            "Oily" => skin(SkinType::Oily),
            "Sensitive" => skin(SkinType::Sensitive),
            "Brand_Name" => records.iter().map(|r| r.brand_name.as_str()).collect::<Vec<_>>(),
            "Product" => records.iter().map(|r| r.product.as_str()).collect::<Vec<_>>(),
            "Review Count" => records.iter().map(|r| r.review_count as i64).collect::<Vec<_>>(),
            "Price" => records.iter().map(|r| r.price).collect::<Vec<_>>(),
            "URL" => records.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(),
            "Rating" => records.iter().map(|r| r.rating).collect::<Vec<_>>(),
            "SPF" => records.iter().map(|r| r.spf as i64).collect::<Vec<_>>(),
            "Acne" => benefit(Benefit::Acne),
            "Brightening" => benefit(Benefit::Brightening),
            "Hydration" => benefit(Benefit::Hydration),
            "Anti_Aging" => benefit(Benefit::AntiAging),
        )?;

        let path = self.config.merged_path.clone();
        write_table(&path, &mut df)?;
        Ok(path)
    }

    /// Loads the merged table; rows with a non-numeric rating or price, or
    /// unreadable flags, are dropped.
    pub fn load_merged(&self) -> Result<Vec<MergedProductRecord>> {
        load_merged_from(&self.config.merged_path)
    }
}

pub fn load_merged_from(path: &Path) -> Result<Vec<MergedProductRecord>> {
    let df = read_table(path)?;

    let labels = string_column(&df, "Label")?;
    let brands = string_column(&df, "Brand")?;
    let names = string_column(&df, "Name")?;
    let ranks = string_column(&df, "Rank")?;
    let ingredients = string_column(&df, "Ingredients")?;
    let brand_names = string_column(&df, "Brand_Name")?;
    let products = string_column(&df, "Product")?;
    let review_counts = string_column(&df, "Review Count")?;
    let prices = string_column(&df, "Price")?;
    let urls = string_column(&df, "URL")?;
    let ratings = string_column(&df, "Rating")?;
    let spfs = string_column(&df, "SPF")?;
    let skin_flags = skin_type_columns(&df)?;
    let benefit_flags = Benefit::ALL
        .into_iter()
        .map(|b| string_column(&df, b.column()))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(df.height());
    let mut failed_count = 0;

    for row in 0..df.height() {
        let parsed = (|| -> Result<MergedProductRecord, String> {
            let rating = ratings[row]
                .as_deref()
                .and_then(coerce_number)
                .ok_or_else(|| format!("rating {:?}", ratings[row]))?;
            let price = parse_price(prices[row].as_deref().unwrap_or_default())
                .map_err(|e| e.to_string())?;
            let review_count = review_counts[row]
                .as_deref()
                .and_then(coerce_number)
                .filter(|v| *v >= 0.0)
                .ok_or_else(|| format!("review count {:?}", review_counts[row]))?;
            let spf = spfs[row]
                .as_deref()
                .and_then(coerce_number)
                .filter(|v| *v >= 0.0)
                .ok_or_else(|| format!("SPF {:?}", spfs[row]))?;

            let skin_types = parse_skin_types(&skin_flags, row)?;
            let mut benefits = BenefitFlags::default();
            for (benefit, column) in Benefit::ALL.into_iter().zip(&benefit_flags) {
                benefits.set(benefit, parse_flag(&column[row], benefit.column())?);
            }

            Ok(MergedProductRecord {
                label: text(&labels[row]),
                brand: text(&brands[row]),
                name: text(&names[row]),
                rank: ranks[row].as_deref().and_then(coerce_number),
                ingredients: text(&ingredients[row]),
                skin_types,
                brand_name: text(&brand_names[row]),
                product: text(&products[row]),
                review_count: review_count as u64,
                price,
                url: text(&urls[row]),
                rating,
                spf: spf.min(f64::from(u32::MAX)) as u32,
                benefits,
            })
        })();

        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                failed_count += 1;
                warn!("{}", SkinWizError::malformed("merged", row, reason));
            }
        }
    }

    info!(
        "Loaded {} merged records from {} ({} dropped)",
        records.len(),
        path.display(),
        failed_count
    );

    Ok(records)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Every column is read as text; typing happens per record.
fn read_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(df)
}

fn write_table(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

/// Cells as owned text; blank cells become `None`.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Missing column {:?}", name))?;
    let values = column.str()?;

    Ok(values
        .into_iter()
        .map(|v| v.filter(|s| !s.trim().is_empty()).map(str::to_string))
        .collect())
}

fn skin_type_columns(df: &DataFrame) -> Result<Vec<Vec<Option<String>>>> {
    SkinType::ALL
        .into_iter()
        .map(|t| string_column(df, t.column()))
        .collect()
}

fn parse_skin_types(columns: &[Vec<Option<String>>], row: usize) -> Result<SkinTypeFlags, String> {
    let mut flags = SkinTypeFlags::default();
    for (skin_type, column) in SkinType::ALL.into_iter().zip(columns) {
        flags.set(skin_type, parse_flag(&column[row], skin_type.column())?);
    }
    Ok(flags)
}

fn parse_flag(value: &Option<String>, column: &str) -> Result<bool, String> {
    value
        .as_deref()
        .and_then(coerce_number)
        .map(|v| v != 0.0)
        .ok_or_else(|| format!("{} flag is {:?}", column, value))
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CsvStore {
        CsvStore::new(DatasetConfig::from_root(dir.path()))
    }

    fn merged(name: &str, price: f64) -> MergedProductRecord {
        MergedProductRecord {
            label: "moisturizer".into(),
            brand: "cerave".into(),
            name: name.into(),
            rank: None,
            ingredients: "water, glycerin, ceramide np".into(),
            skin_types: SkinTypeFlags {
                dry: true,
                sensitive: true,
                ..Default::default()
            },
            brand_name: format!("cerave {}", name),
            product: format!("CeraVe {} 16 oz, \"Daily\"", name),
            review_count: 4200,
            price,
            url: "https://www.amazon.com/dp/B00".into(),
            rating: 4.7,
            spf: 30,
            benefits: BenefitFlags {
                hydration: true,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_merged_table_survives_disk() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let records = vec![merged("cream", 9.5), merged("lotion", 14.0)];

        let path = store.write_merged(&records).unwrap();
        assert!(path.ends_with("merged/merged_data.csv"));

        let loaded = store.load_merged().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_rows_with_bad_rating_are_dropped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_merged(&[merged("cream", 9.5)]).unwrap();

        let path = &store.config().merged_path;
        let content = fs::read_to_string(path).unwrap();
        let extra = content
            .lines()
            .nth(1)
            .unwrap()
            .replace(",4.7,", ",not rated,");
        fs::write(path, format!("{}{}\n", content, extra)).unwrap();

        let loaded = store.load_merged().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_spf_cells_fold_and_saturate() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_merged(&[merged("cream", 9.5)]).unwrap();

        let path = &store.config().merged_path;
        let content = fs::read_to_string(path).unwrap();
        let row = content.lines().nth(1).unwrap();
        let full_width = row.replace(",4.7,30,", ",4.7,３０,");
        let oversized = row.replace(",4.7,30,", ",4.7,99999999999,");
        fs::write(path, format!("{}{}\n{}\n", content, full_width, oversized)).unwrap();

        let spfs: Vec<u32> = store.load_merged().unwrap().iter().map(|r| r.spf).collect();
        assert_eq!(spfs, [30, 30, u32::MAX]);
    }

    #[test]
    fn test_skincare_row_with_bad_flag_is_dropped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let record = SkincareIngredientRecord {
            label: "Cleanser".into(),
            brand: "Tatcha".into(),
            name: "The Rice Wash".into(),
            price: Some(38.0),
            rank: Some(4.2),
            ingredients: "Water, Glycerin".into(),
            skin_types: SkinTypeFlags {
                oily: true,
                ..Default::default()
            },
        };
        let path = store.write_skincare(&[record.clone()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let bad = content
            .lines()
            .nth(1)
            .unwrap()
            .replace(",0,0,0,1,0", ",0,yes,0,1,0");
        fs::write(&path, format!("{}{}\n", content, bad)).unwrap();

        assert_eq!(store.read_skincare().unwrap(), vec![record]);
    }

    #[test]
    fn test_cleaned_tables_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let skincare = vec![SkincareIngredientRecord {
            label: "Cleanser".into(),
            brand: "Tatcha".into(),
            name: "The Rice Wash".into(),
            price: Some(38.0),
            rank: None,
            ingredients: "Water, Glycerin".into(),
            skin_types: SkinTypeFlags {
                oily: true,
                ..Default::default()
            },
        }];
        let banned = vec![BannedIngredientRecord {
            name: "Mercury".into(),
            restriction: "Not permitted for all products".into(),
        }];
        let listings = vec![AmazonListingRecord {
            product: "Tatcha The Rice Wash".into(),
            review_count: 1520,
            price: "$40.00".into(),
            url: "https://www.amazon.com/dp/B01".into(),
            rating: 4.6,
        }];

        store.write_skincare(&skincare).unwrap();
        store.write_banned(&banned).unwrap();
        store.write_amazon(&listings).unwrap();

        assert_eq!(store.read_skincare().unwrap(), skincare);
        assert_eq!(store.read_banned().unwrap(), banned);
        assert_eq!(store.read_amazon().unwrap(), listings);
    }
}
