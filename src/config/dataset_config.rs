use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const SKINCARE_RAW_FILE: &str = "openml_dataset_43481.csv";
pub const BANNED_RAW_FILE: &str = "banned_skincare_ings.csv";
pub const AMAZON_RAW_FILE: &str = "amazon_data.csv";

pub const SKINCARE_CLEANED_FILE: &str = "skincare_ingredients.csv";
pub const BANNED_CLEANED_FILE: &str = "banned_skincare_ings.csv";
pub const AMAZON_CLEANED_FILE: &str = "amazon_data.csv";

/// Where the raw, cleaned and merged tables live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub raw_dir: PathBuf,
    pub cleaned_dir: PathBuf,
    pub merged_path: PathBuf,
    /// Environment variable that relocates all three under one root.
    pub env_dataset_dir: Option<String>,
}

impl DatasetConfig {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw_dir: root.join("raw"),
            cleaned_dir: root.join("cleaned"),
            merged_path: root.join("merged").join("merged_data.csv"),
            env_dataset_dir: None,
        }
    }

    pub fn raw_path(&self, file: &str) -> PathBuf {
        self.raw_dir.join(file)
    }

    pub fn cleaned_path(&self, file: &str) -> PathBuf {
        self.cleaned_dir.join(file)
    }

    pub fn apply_env_overrides(&mut self) {
        let var = self
            .env_dataset_dir
            .as_deref()
            .unwrap_or("SKIN_WIZ_DATASET_DIR");

        if let Ok(root) = env::var(var) {
            let env_dataset_dir = self.env_dataset_dir.take();
            *self = Self::from_root(root);
            self.env_dataset_dir = env_dataset_dir;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.merged_path.file_name().is_none() {
            return Err(anyhow::anyhow!(
                "Merged dataset path must name a file: {}",
                self.merged_path.display()
            ));
        }
        Ok(())
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self::from_root("datasets")
    }
}
