use crate::core::files;
use crate::core::{Pipeline, Schedule, Storage};
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;

/// Integrity report over an existing `schedule.json`. Writes nothing.
pub struct CheckPipeline<S: Storage> {
    storage: S,
    schedule_path: String,
}

impl<S: Storage> CheckPipeline<S> {
    pub fn new(storage: S, schedule_path: impl Into<String>) -> Self {
        Self {
            storage,
            schedule_path: schedule_path.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> Pipeline for CheckPipeline<S> {
    type Input = Schedule;
    type Output = Schedule;

    fn name(&self) -> &str {
        "check"
    }

    async fn extract(&self) -> Result<Schedule> {
        files::read_json(&self.storage, &self.schedule_path).await
    }

    async fn transform(&self, schedule: Schedule) -> Result<Schedule> {
        let problems = schedule.integrity_errors();
        for problem in &problems {
            tracing::error!("❌ {}", problem);
        }
        if !problems.is_empty() {
            return Err(SiteError::ValidationError {
                message: format!(
                    "{} integrity problem(s) in {}: {}",
                    problems.len(),
                    self.schedule_path,
                    problems.join("; ")
                ),
            });
        }

        if schedule.meta.session_count != schedule.sessions.len() {
            tracing::warn!(
                "⚠️ meta.session_count is {} but {} sessions are listed",
                schedule.meta.session_count,
                schedule.sessions.len()
            );
        }
        Ok(schedule)
    }

    async fn load(&self, schedule: Schedule) -> Result<String> {
        Ok(format!(
            "{}: {} sections, {} courses, {} sessions OK",
            self.schedule_path,
            schedule.sections.len(),
            schedule.courses.len(),
            schedule.sessions.len()
        ))
    }
}
