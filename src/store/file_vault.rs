use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, VaultError};

use super::{default_vault_root, DocumentStore};

const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed document store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileVault {
    base: PathBuf,
}

impl FileVault {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn new_default() -> Self {
        Self::new(default_vault_root())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    fn absolute(&self, path: &str) -> PathBuf {
        let mut absolute = self.base.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            absolute.push(segment);
        }
        absolute
    }
}

impl DocumentStore for FileVault {
    fn ensure_folder(&self, path: &str) -> Result<()> {
        ensure_dir(&self.absolute(path))
    }

    fn read_document(&self, path: &str) -> Result<String> {
        let absolute = self.absolute(path);
        if !absolute.exists() {
            return Err(VaultError::storage(format!("document `{path}` not found")));
        }
        Ok(fs::read_to_string(absolute)?)
    }

    fn write_document(&self, path: &str, text: &str) -> Result<()> {
        let absolute = self.absolute(path);
        if let Some(parent) = absolute.parent() {
            ensure_dir(parent)?;
        }
        let tmp = tmp_path(&absolute);
        let mut file = File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &absolute)?;
        debug!(path, "document written");
        Ok(())
    }

    fn create_document(&self, path: &str, initial_text: &str) -> Result<()> {
        let absolute = self.absolute(path);
        if absolute.exists() {
            return Err(VaultError::storage(format!(
                "document `{path}` already exists"
            )));
        }
        self.write_document(path, initial_text)
    }

    fn document_exists(&self, path: &str) -> bool {
        self.absolute(path).exists()
    }
}

pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault() -> (FileVault, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        (FileVault::new(temp.path()), temp)
    }

    #[test]
    fn write_then_read_round_trips() {
        let (vault, _guard) = vault();
        vault.ensure_folder("finance/2024").unwrap();
        vault
            .write_document("finance/2024/transactions.finance.md", "# 2024\n")
            .unwrap();
        let text = vault
            .read_document("finance/2024/transactions.finance.md")
            .unwrap();
        assert_eq!(text, "# 2024\n");
    }

    #[test]
    fn read_missing_document_is_a_storage_error() {
        let (vault, _guard) = vault();
        let err = vault.read_document("finance/2024/missing.md").unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let (vault, _guard) = vault();
        vault.create_document("finance/note.md", "first\n").unwrap();
        let err = vault
            .create_document("finance/note.md", "second\n")
            .unwrap_err();
        assert!(matches!(err, VaultError::Storage(_)));
        assert_eq!(vault.read_document("finance/note.md").unwrap(), "first\n");
    }

    #[test]
    fn ensure_folder_is_idempotent() {
        let (vault, _guard) = vault();
        vault.ensure_folder("finance/2024").unwrap();
        vault.ensure_folder("finance/2024").unwrap();
        assert!(vault.base_dir().join("finance/2024").is_dir());
    }
}
