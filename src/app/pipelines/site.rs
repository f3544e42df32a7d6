use super::{template_or_default, write_artifacts, Artifact};
use crate::config::toml_config::SiteConfig;
use crate::core::files;
use crate::core::{Pipeline, Schedule, Storage};
use crate::render::class_lander::{self, LanderSettings};
use crate::render::course_image;
use crate::render::schedule_page::{self, ScheduleOptions};
use crate::transform::courses::build_courses_file;
use crate::transform::csv_export::sessions_csv;
use crate::transform::descriptions::build_descriptions;
use crate::transform::legacy::to_legacy;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const SCHEDULE_TEMPLATE: &str = "schedule_page_template.html";
const LANDER_TEMPLATE: &str = "class_lander.html";

/// Which optional outputs `site` renders.
#[derive(Debug, Clone, Copy)]
pub struct SiteTargets {
    pub landers: bool,
    pub images: bool,
}

impl Default for SiteTargets {
    fn default() -> Self {
        Self {
            landers: true,
            images: true,
        }
    }
}

pub struct SiteInput {
    pub schedule: Schedule,
    pub schedule_template: String,
    pub lander_template: String,
}

/// `schedule.json` → schedule page, session landers, course tiles and data files.
pub struct SitePipeline<S: Storage> {
    storage: S,
    config: SiteConfig,
    targets: SiteTargets,
    now: DateTime<Utc>,
}

impl<S: Storage> SitePipeline<S> {
    pub fn new(storage: S, config: SiteConfig) -> Self {
        Self {
            storage,
            config,
            targets: SiteTargets::default(),
            now: Utc::now(),
        }
    }

    pub fn with_targets(mut self, targets: SiteTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn data_files(&self, schedule: &Schedule) -> Result<Vec<Artifact>> {
        let out = |rel: &str| self.config.output_path(rel);
        let courses = build_courses_file(schedule, &self.config.paths.schedule_json, self.now);
        let descriptions = build_descriptions(&courses.courses, &out("data/courses.json"));

        Ok(vec![
            Artifact::json(out("data/schedule-legacy.json"), &to_legacy(schedule))?,
            Artifact::json(out("data/courses.json"), &courses)?,
            Artifact::json(out("data/course-descriptions.json"), &descriptions)?,
            Artifact {
                path: out("data/sessions.csv"),
                contents: sessions_csv(schedule)?,
            },
        ])
    }
}

#[async_trait]
impl<S: Storage> Pipeline for SitePipeline<S> {
    type Input = SiteInput;
    type Output = Vec<Artifact>;

    fn name(&self) -> &str {
        "site"
    }

    async fn extract(&self) -> Result<SiteInput> {
        let schedule = files::read_json(&self.storage, &self.config.paths.schedule_json).await?;
        let schedule_template = template_or_default(
            &self.storage,
            &self.config.template_path(SCHEDULE_TEMPLATE),
            schedule_page::DEFAULT_TEMPLATE,
        )
        .await?;
        let lander_template = template_or_default(
            &self.storage,
            &self.config.template_path(LANDER_TEMPLATE),
            class_lander::DEFAULT_TEMPLATE,
        )
        .await?;

        Ok(SiteInput {
            schedule,
            schedule_template,
            lander_template,
        })
    }

    async fn transform(&self, input: SiteInput) -> Result<Vec<Artifact>> {
        let schedule = &input.schedule;
        let tz = self.config.timezone();
        let mut artifacts = Vec::new();

        let page = schedule_page::render_schedule_page(
            &input.schedule_template,
            schedule,
            &ScheduleOptions {
                max_per_course: self.config.schedule.max_sessions_per_course,
                hide_past: self.config.schedule.hide_past_sessions,
                tz,
                now: self.now,
            },
        )?;
        artifacts.push(Artifact::text(self.config.output_path("schedule.html"), page));

        if self.targets.landers {
            let settings = LanderSettings {
                site: &self.config.site,
                enrollware_schedule_url: &self.config.enrollware.schedule_url,
                tz,
                now: self.now,
                future_sessions_limit: self.config.landers.future_sessions_limit,
                other_classes_limit: self.config.landers.other_classes_limit,
            };
            let landers = class_lander::render_all(&input.lander_template, schedule, &settings);
            tracing::info!("🧾 Rendered {} session landers", landers.len());
            artifacts.extend(
                landers
                    .into_iter()
                    .map(|(path, html)| Artifact::text(self.config.output_path(&path), html)),
            );
        }

        if self.targets.images {
            let images = course_image::render_all(schedule);
            tracing::info!("🖼️ Rendered {} course images", images.len());
            artifacts.extend(
                images
                    .into_iter()
                    .map(|(path, svg)| Artifact::text(self.config.output_path(&path), svg)),
            );
        }

        artifacts.extend(self.data_files(schedule)?);
        Ok(artifacts)
    }

    async fn load(&self, artifacts: Vec<Artifact>) -> Result<String> {
        write_artifacts(&self.storage, &artifacts).await?;
        tracing::info!("📦 Wrote {} files", artifacts.len());
        Ok(self.config.paths.output_dir.clone())
    }
}
