use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Schedule, Storage};
use crate::scrape::{parse_snapshot, ScrapeContext};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

/// Snapshot HTML → `schedule.json`.
pub struct ScrapePipeline<S: Storage> {
    storage: S,
    config: SiteConfig,
    snapshot_path: String,
    schedule_path: String,
    now: DateTime<Utc>,
}

impl<S: Storage> ScrapePipeline<S> {
    pub fn new(storage: S, config: SiteConfig) -> Self {
        let snapshot_path = config.paths.snapshot.clone();
        let schedule_path = config.paths.schedule_json.clone();
        Self {
            storage,
            config,
            snapshot_path,
            schedule_path,
            now: Utc::now(),
        }
    }

    pub fn with_snapshot(mut self, path: impl Into<String>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<String>) -> Self {
        self.schedule_path = path.into();
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn context(&self) -> Result<ScrapeContext> {
        let base = &self.config.enrollware.base_url;
        let base_url = Url::parse(base).map_err(|e| SiteError::InvalidConfigValueError {
            field: "enrollware.base_url".to_string(),
            value: base.clone(),
            reason: e.to_string(),
        })?;

        Ok(ScrapeContext {
            base_url,
            tz: self.config.timezone(),
            now: self.now,
            source: self.snapshot_path.clone(),
        })
    }
}

#[async_trait]
impl<S: Storage> Pipeline for ScrapePipeline<S> {
    type Input = String;
    type Output = Schedule;

    fn name(&self) -> &str {
        "scrape"
    }

    async fn extract(&self) -> Result<String> {
        tracing::info!("📄 Reading snapshot {}", self.snapshot_path);
        files::read_text(&self.storage, &self.snapshot_path).await
    }

    async fn transform(&self, html: String) -> Result<Schedule> {
        let schedule = parse_snapshot(&html, &self.context()?);

        if schedule.sessions.is_empty() {
            tracing::warn!("⚠️ No sessions found in {}", self.snapshot_path);
        }

        let problems = schedule.integrity_errors();
        if !problems.is_empty() {
            return Err(SiteError::ValidationError {
                message: problems.join("; "),
            });
        }

        tracing::info!(
            "📅 Parsed {} sections, {} courses, {} sessions from {} panels",
            schedule.sections.len(),
            schedule.courses.len(),
            schedule.sessions.len(),
            schedule.meta.panel_count
        );
        Ok(schedule)
    }

    async fn load(&self, schedule: Schedule) -> Result<String> {
        files::write_json(&self.storage, &self.schedule_path, &schedule).await?;
        Ok(self.schedule_path.clone())
    }
}
