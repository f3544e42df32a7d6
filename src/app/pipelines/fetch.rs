use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Downloads the live schedule page into the snapshot path.
pub struct FetchPipeline<S: Storage> {
    storage: S,
    client: Client,
    url: String,
    snapshot_path: String,
}

impl<S: Storage> FetchPipeline<S> {
    pub fn new(storage: S, config: &SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.prices.user_agent.as_str())
            .timeout(Duration::from_secs(config.prices.timeout_seconds))
            .build()?;

        Ok(Self {
            storage,
            client,
            url: config.enrollware.schedule_url.clone(),
            snapshot_path: config.paths.snapshot.clone(),
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl<S: Storage> Pipeline for FetchPipeline<S> {
    type Input = String;
    type Output = String;

    fn name(&self) -> &str {
        "fetch"
    }

    async fn extract(&self) -> Result<String> {
        tracing::info!("🌐 GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        tracing::debug!("Response status: {}", response.status());
        let body = response.error_for_status()?.text().await?;
        Ok(body)
    }

    async fn transform(&self, html: String) -> Result<String> {
        let lower = html.to_lowercase();
        if !lower.contains("enrpanel") && !lower.contains("enroll?id=") && !lower.contains("enroll.aspx?id=") {
            tracing::warn!("⚠️ {} has no schedule panels or enroll links", self.url);
        }
        Ok(html)
    }

    async fn load(&self, html: String) -> Result<String> {
        files::write_text(&self.storage, &self.snapshot_path, &html).await?;
        tracing::info!("💾 Saved {} bytes", html.len());
        Ok(self.snapshot_path.clone())
    }
}
