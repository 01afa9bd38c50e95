//! The document store the record repositories persist through.
//!
//! The host application owns the real vault; this trait is the minimal slice
//! of it the core consumes. Paths are vault-relative, `/`-separated strings.

pub mod file_vault;

pub use file_vault::FileVault;

use std::env;
use std::path::PathBuf;

use crate::errors::Result;

pub trait DocumentStore {
    /// Creates the folder if needed; succeeding on an existing folder.
    fn ensure_folder(&self, path: &str) -> Result<()>;

    /// Full text of the document. Fails with a storage error when absent.
    fn read_document(&self, path: &str) -> Result<String>;

    /// Overwrites the document's full text.
    fn write_document(&self, path: &str, text: &str) -> Result<()>;

    /// Creates a new document. Fails when one already exists at the path.
    fn create_document(&self, path: &str, initial_text: &str) -> Result<()>;

    fn document_exists(&self, path: &str) -> bool;
}

/// Deterministic location of a record kind's year document.
pub fn resolve_path(root: &str, file_stem: &str, year: i32) -> String {
    format!("{root}/{year}/{file_stem}.finance.md")
}

/// The folder holding a year's documents.
pub fn resolve_folder(root: &str, year: i32) -> String {
    format!("{root}/{year}")
}

const DEFAULT_DIR_NAME: &str = ".finvault";

/// Base directory for a standalone vault, defaulting to `~/.finvault`.
pub fn default_vault_root() -> PathBuf {
    if let Some(custom) = env::var_os("FINVAULT_HOME") {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_deterministic_per_kind_and_year() {
        assert_eq!(
            resolve_path("finance", "transactions", 2024),
            "finance/2024/transactions.finance.md"
        );
        assert_eq!(resolve_folder("finance", 2024), "finance/2024");
    }
}
