use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Storage};
use crate::render::homepage::build_homepage;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Snapshot schedule panel spliced into the homepage base template.
pub struct HomepagePipeline<S: Storage> {
    storage: S,
    snapshot_path: String,
    template_path: String,
    output_path: String,
    link_rewrites: BTreeMap<String, String>,
}

impl<S: Storage> HomepagePipeline<S> {
    pub fn new(storage: S, config: &SiteConfig) -> Self {
        Self {
            storage,
            snapshot_path: config.paths.snapshot.clone(),
            template_path: config.homepage.template.clone(),
            output_path: config.homepage.output.clone(),
            link_rewrites: config.homepage.link_rewrites.clone(),
        }
    }

    pub fn with_template(mut self, path: impl Into<String>) -> Self {
        self.template_path = path.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<String>) -> Self {
        self.output_path = path.into();
        self
    }
}

#[async_trait]
impl<S: Storage> Pipeline for HomepagePipeline<S> {
    type Input = (String, String);
    type Output = String;

    fn name(&self) -> &str {
        "homepage"
    }

    async fn extract(&self) -> Result<(String, String)> {
        // No built-in fallback for the base page.
        let template = files::read_text(&self.storage, &self.template_path).await?;
        let snapshot = files::read_text(&self.storage, &self.snapshot_path).await?;
        Ok((template, snapshot))
    }

    async fn transform(&self, input: (String, String)) -> Result<String> {
        let (template, snapshot) = input;
        build_homepage(&template, &snapshot, &self.link_rewrites)
    }

    async fn load(&self, page: String) -> Result<String> {
        files::write_text(&self.storage, &self.output_path, &page).await?;
        Ok(self.output_path.clone())
    }
}
