use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn collect(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            if entry.file_type()?.is_dir() {
                Self::collect(&entry.path(), &rel, out)?;
            } else {
                out.push(rel);
            }
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    /// Writes go to a sibling temp file first so a failed run never leaves half a page behind.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = full_path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &full_path)?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.base_path.join(path).exists()
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();
        Self::collect(&self.base_path.join(dir), "", &mut files)?;
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents_and_lists_sorted() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        tokio_test::block_on(async {
            storage.write_file("docs/classes/session-2.html", b"b").await.unwrap();
            storage.write_file("docs/index.html", b"a").await.unwrap();

            assert!(storage.exists("docs/index.html").await);
            assert!(!storage.exists("docs/index.html.tmp").await);
            assert_eq!(storage.read_file("docs/index.html").await.unwrap(), b"a");

            let files = storage.list_files("docs").await.unwrap();
            assert_eq!(files, vec!["classes/session-2.html", "index.html"]);
        });
    }
}
