use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Storage};
use crate::transform::status::{FileInfo, GithubInfo, StatusReport};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Writes `status.json` describing the snapshot and schedule files.
pub struct StatusPipeline<S: Storage> {
    storage: S,
    snapshot_path: String,
    schedule_path: String,
    output_path: String,
    soft: bool,
    github: GithubInfo,
    now: DateTime<Utc>,
}

impl<S: Storage> StatusPipeline<S> {
    pub fn new(storage: S, config: &SiteConfig) -> Self {
        Self {
            storage,
            snapshot_path: config.paths.snapshot.clone(),
            schedule_path: config.paths.schedule_json.clone(),
            output_path: config.output_path("data/status.json"),
            soft: false,
            github: GithubInfo::from_env(),
            now: Utc::now(),
        }
    }

    pub fn with_output(mut self, path: impl Into<String>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Missing or empty inputs are reported but do not fail the run.
    pub fn soft(mut self, soft: bool) -> Self {
        self.soft = soft;
        self
    }

    pub fn with_github(mut self, github: GithubInfo) -> Self {
        self.github = github;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    async fn read_optional(&self, path: &str) -> Result<Option<Vec<u8>>> {
        if self.storage.exists(path).await {
            Ok(Some(self.storage.read_file(path).await?))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl<S: Storage> Pipeline for StatusPipeline<S> {
    type Input = (Option<Vec<u8>>, Option<Vec<u8>>);
    type Output = StatusReport;

    fn name(&self) -> &str {
        "status"
    }

    async fn extract(&self) -> Result<Self::Input> {
        let snapshot = self.read_optional(&self.snapshot_path).await?;
        let schedule = self.read_optional(&self.schedule_path).await?;
        Ok((snapshot, schedule))
    }

    async fn transform(&self, input: Self::Input) -> Result<StatusReport> {
        let (snapshot, schedule) = input;
        Ok(StatusReport::new(
            FileInfo::from_contents(snapshot.as_deref()),
            FileInfo::from_contents(schedule.as_deref()),
            self.github.clone(),
            self.now,
        ))
    }

    async fn load(&self, report: StatusReport) -> Result<String> {
        files::write_json(&self.storage, &self.output_path, &report).await?;

        let line = report.summary_line();
        println!("{}", line);
        if report.is_ok() || self.soft {
            Ok(self.output_path.clone())
        } else {
            Err(SiteError::ValidationError { message: line })
        }
    }
}
