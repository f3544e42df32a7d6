use super::{template_or_default, write_artifacts, Artifact};
use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Storage};
use crate::render::router_lander::{render_router_lander, RouterConfig, DEFAULT_TEMPLATE};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use std::collections::BTreeSet;

const TEMPLATE: &str = "router_lander.html";

/// `landers.config.json` → `landers/<slug>/index.html`.
pub struct RouterPipeline<S: Storage> {
    storage: S,
    config: SiteConfig,
    landers_path: String,
}

impl<S: Storage> RouterPipeline<S> {
    pub fn new(storage: S, config: SiteConfig) -> Self {
        let landers_path = config.landers.router_config.clone();
        Self {
            storage,
            config,
            landers_path,
        }
    }

    pub fn with_landers_config(mut self, path: impl Into<String>) -> Self {
        self.landers_path = path.into();
        self
    }
}

#[async_trait]
impl<S: Storage> Pipeline for RouterPipeline<S> {
    type Input = (RouterConfig, String);
    type Output = Vec<Artifact>;

    fn name(&self) -> &str {
        "router-landers"
    }

    async fn extract(&self) -> Result<(RouterConfig, String)> {
        let landers: RouterConfig = files::read_json(&self.storage, &self.landers_path).await?;
        let template = template_or_default(
            &self.storage,
            &self.config.template_path(TEMPLATE),
            DEFAULT_TEMPLATE,
        )
        .await?;
        Ok((landers, template))
    }

    async fn transform(&self, input: (RouterConfig, String)) -> Result<Vec<Artifact>> {
        let (landers, template) = input;
        if landers.landers.is_empty() {
            tracing::warn!("⚠️ {} lists no landers", self.landers_path);
        }

        let mut seen = BTreeSet::new();
        let mut artifacts = Vec::with_capacity(landers.landers.len());
        for lander in &landers.landers {
            let (path, html) = render_router_lander(
                &template,
                lander,
                &self.config.site,
                &self.config.enrollware.schedule_url,
            )?;
            if !seen.insert(path.clone()) {
                return Err(SiteError::ValidationError {
                    message: format!("duplicate lander slug '{}'", lander.slug.trim()),
                });
            }
            tracing::info!("🧭 Rendered {}", path);
            artifacts.push(Artifact::text(self.config.output_path(&path), html));
        }
        Ok(artifacts)
    }

    async fn load(&self, artifacts: Vec<Artifact>) -> Result<String> {
        write_artifacts(&self.storage, &artifacts).await?;
        Ok(self.config.output_path("landers"))
    }
}
