use crate::domain::model::{Course, Schedule};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursesMeta {
    pub source_schedule: String,
    pub generated_at: String,
    pub course_count: usize,
}

/// `courses.json`: course records without sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursesFile {
    pub meta: CoursesMeta,
    pub courses: Vec<Course>,
}

pub fn build_courses_file(schedule: &Schedule, source_schedule: &str, now: DateTime<Utc>) -> CoursesFile {
    CoursesFile {
        meta: CoursesMeta {
            source_schedule: source_schedule.to_string(),
            generated_at: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            course_count: schedule.courses.len(),
        },
        courses: schedule.courses.clone(),
    }
}
