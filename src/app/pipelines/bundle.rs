use crate::core::{Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Zips the output directory into one archive for deployment.
pub struct BundlePipeline<S: Storage> {
    storage: S,
    source_dir: String,
    output_path: String,
}

impl<S: Storage> BundlePipeline<S> {
    pub fn new(storage: S, source_dir: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            storage,
            source_dir: source_dir.into(),
            output_path: output_path.into(),
        }
    }

    fn storage_path(&self, rel: &str) -> String {
        format!("{}/{}", self.source_dir.trim_end_matches('/'), rel)
    }
}

#[async_trait]
impl<S: Storage> Pipeline for BundlePipeline<S> {
    /// `(path inside the archive, contents)`, sorted by path.
    type Input = Vec<(String, Vec<u8>)>;
    type Output = Vec<u8>;

    fn name(&self) -> &str {
        "bundle"
    }

    async fn extract(&self) -> Result<Self::Input> {
        let mut entries = Vec::new();
        for rel in self.storage.list_files(&self.source_dir).await? {
            let path = self.storage_path(&rel);
            // The archive may live inside the directory it packs.
            if path == self.output_path || rel.ends_with(".tmp") {
                continue;
            }
            let data = self.storage.read_file(&path).await?;
            entries.push((rel, data));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        tracing::info!("🗂️ Bundling {} files from {}", entries.len(), self.source_dir);
        Ok(entries)
    }

    async fn transform(&self, entries: Self::Input) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in &entries {
            zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
            zip.write_all(data)?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    async fn load(&self, archive: Vec<u8>) -> Result<String> {
        self.storage.write_file(&self.output_path, &archive).await?;
        tracing::debug!("Archive is {} bytes", archive.len());
        Ok(self.output_path.clone())
    }
}
