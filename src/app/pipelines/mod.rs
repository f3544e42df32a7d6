pub mod bundle;
pub mod check;
pub mod fetch;
pub mod homepage;
pub mod prices;
pub mod router;
pub mod scrape;
pub mod site;
pub mod status;

pub use bundle::BundlePipeline;
pub use check::CheckPipeline;
pub use fetch::FetchPipeline;
pub use homepage::HomepagePipeline;
pub use prices::PricePipeline;
pub use router::RouterPipeline;
pub use scrape::ScrapePipeline;
pub use site::{SitePipeline, SiteTargets};
pub use status::StatusPipeline;

use crate::core::files;
use crate::core::Storage;
use crate::utils::error::Result;
use serde::Serialize;

/// A rendered file waiting to be written, keyed by its path under the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: String,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn text(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: text.into().into_bytes(),
        }
    }

    /// Pretty JSON with a trailing newline, same as `files::write_json`.
    pub fn json<T: Serialize + ?Sized>(path: impl Into<String>, value: &T) -> Result<Self> {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        Ok(Self::text(path, json))
    }
}

pub(crate) async fn write_artifacts<S: Storage>(storage: &S, artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        tracing::debug!("📝 Writing {} ({} bytes)", artifact.path, artifact.contents.len());
        storage.write_file(&artifact.path, &artifact.contents).await?;
    }
    Ok(())
}

/// The template file when it exists, else the built-in copy.
pub(crate) async fn template_or_default<S: Storage>(
    storage: &S,
    path: &str,
    default: &'static str,
) -> Result<String> {
    if storage.exists(path).await {
        files::read_text(storage, path).await
    } else {
        tracing::debug!("No template at {}, using the built-in one", path);
        Ok(default.to_string())
    }
}
