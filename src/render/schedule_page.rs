use crate::domain::model::{Schedule, Session};
use crate::render::{escape_html, session_start};
use crate::utils::error::{Result, SiteError};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;

pub const COURSE_BLOCKS_MARKER: &str = "<!--COURSE_BLOCKS-->";
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/schedule_page_template.html");

const NO_DATES: &str = "<li>No upcoming public dates are currently listed for this class.</li>";

#[derive(Debug, Clone)]
pub struct ScheduleOptions {
    pub max_per_course: usize,
    pub hide_past: bool,
    pub tz: Tz,
    pub now: DateTime<Utc>,
}

/// Lander page for a session, relative to the output root.
pub fn lander_href(session_id: u64) -> String {
    format!("classes/session-{}.html", session_id)
}

fn summary(session: &Session, tz: Tz) -> String {
    let start = session_start(session, tz)
        .map(|dt| dt.format("%a %b %-d, %Y · %-I:%M %p").to_string())
        .unwrap_or_else(|| session.start_text.clone());

    let parts: Vec<&str> = [
        start.as_str(),
        session.location.as_str(),
        session.price.as_deref().unwrap_or_default().trim(),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .collect();

    if parts.is_empty() {
        "(details coming soon)".to_string()
    } else {
        parts.join(" · ")
    }
}

fn render_item(session: &Session, id: u64, tz: Tz) -> String {
    format!(
        "<li><a href=\"{}\">{}</a> &nbsp; <a href=\"{}\" rel=\"nofollow\">[Book via Enrollware]</a></li>",
        lander_href(id),
        escape_html(&summary(session, tz)),
        escape_html(session.register_url())
    )
}

/// One `<section class="course-block">` per course that has sessions, ordered by title.
pub fn render_course_blocks(schedule: &Schedule, opts: &ScheduleOptions) -> String {
    let mut by_course: HashMap<&str, Vec<&Session>> = HashMap::new();
    for session in &schedule.sessions {
        by_course.entry(session.course_id.as_str()).or_default().push(session);
    }

    let mut courses: Vec<_> = schedule
        .courses
        .iter()
        .filter(|c| by_course.contains_key(c.id.as_str()))
        .collect();
    courses.sort_by_key(|c| c.title.to_lowercase());

    let mut blocks = Vec::with_capacity(courses.len());
    for course in courses {
        let mut sessions = by_course.remove(course.id.as_str()).unwrap_or_default();
        sessions.sort_by_key(|s| (s.start_ms.is_none(), s.start_ms));

        let items: Vec<String> = sessions
            .into_iter()
            .filter(|s| {
                !opts.hide_past
                    || session_start(s, opts.tz).map_or(true, |start| start.with_timezone(&Utc) >= opts.now)
            })
            .filter_map(|s| s.id.map(|id| (s, id)))
            .take(opts.max_per_course)
            .map(|(s, id)| render_item(s, id, opts.tz))
            .collect();

        let items = if items.is_empty() {
            NO_DATES.to_string()
        } else {
            items.join("\n    ")
        };

        tracing::debug!("Rendering course block {} '{}'", course.id, course.title);
        blocks.push(format!(
            "<section class=\"course-block\" id=\"course-{}\">\n  <h2>{}</h2>\n  <ul>\n    {}\n  </ul>\n</section>\n",
            escape_html(&course.id),
            escape_html(&course.title),
            items
        ));
    }

    tracing::info!("🧱 Built {} course blocks", blocks.len());
    blocks.join("\n")
}

pub fn render_schedule_page(template: &str, schedule: &Schedule, opts: &ScheduleOptions) -> Result<String> {
    if !template.contains(COURSE_BLOCKS_MARKER) {
        return Err(SiteError::TemplateError {
            message: format!("schedule template is missing {}", COURSE_BLOCKS_MARKER),
        });
    }
    Ok(template.replacen(COURSE_BLOCKS_MARKER, &render_course_blocks(schedule, opts), 1))
}
