use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

static DEFAULT_CATEGORIES: Lazy<Vec<String>> = Lazy::new(|| {
    ["Food", "Housing", "Salary", "Transport", "Utilities"]
        .into_iter()
        .map(str::to_string)
        .collect()
});

/// Settings the host application hands the record repositories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Folder inside the vault holding the per-year documents.
    pub root: String,
    pub default_currency: String,
    pub default_account: String,
    /// Seeded into the category vocabulary alongside observed values.
    pub default_categories: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: "finance".into(),
            default_currency: "USD".into(),
            default_account: "Cash".into(),
            default_categories: DEFAULT_CATEGORIES.clone(),
        }
    }
}

impl VaultConfig {
    /// Reads a JSON config file, falling back to defaults when absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
