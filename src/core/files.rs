//! Storage helpers shared by the pipelines.

use crate::core::Storage;
use crate::utils::error::{Result, SiteError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Reads a required input; a missing file is reported as such rather than as a raw I/O error.
pub async fn read_text<S: Storage>(storage: &S, path: &str) -> Result<String> {
    if !storage.exists(path).await {
        return Err(SiteError::MissingInputError {
            path: path.to_string(),
        });
    }
    let bytes = storage.read_file(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn read_json<S: Storage, T: DeserializeOwned>(storage: &S, path: &str) -> Result<T> {
    let text = read_text(storage, path).await?;
    Ok(serde_json::from_str(&text)?)
}

/// Pretty JSON with a trailing newline.
pub async fn write_json<S: Storage, T: Serialize + ?Sized>(
    storage: &S,
    path: &str,
    value: &T,
) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    storage.write_file(path, json.as_bytes()).await
}

pub async fn write_text<S: Storage>(storage: &S, path: &str, text: &str) -> Result<()> {
    storage.write_file(path, text.as_bytes()).await
}
