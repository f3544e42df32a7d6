//! One landing page per scheduled session.

use crate::config::toml_config::SiteInfo;
use crate::domain::model::{Course, Schedule, Session};
use crate::render::course_image;
use crate::render::{escape_html, fill, long_date, session_start, tel_href, TimeStatus};
use crate::transform::descriptions::{short_description, strip_html};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/class_lander.html");

const NO_DATE: &str = "Date/time to be arranged";
const NO_LOCATION: &str = "Exact class address provided in your confirmation email.";

pub struct LanderSettings<'a> {
    pub site: &'a SiteInfo,
    pub enrollware_schedule_url: &'a str,
    pub tz: Tz,
    pub now: DateTime<Utc>,
    pub future_sessions_limit: usize,
    pub other_classes_limit: usize,
}

pub fn lander_path(session_id: u64) -> String {
    format!("classes/session-{}.html", session_id)
}

pub fn more_times_label(status: TimeStatus, has_future_sibling: bool) -> &'static str {
    match (status, has_future_sibling) {
        (TimeStatus::Unknown, _) => "See other times and options",
        (TimeStatus::Future, true) => "More times?",
        (TimeStatus::Future, false) => "See other times?",
        (TimeStatus::Past, _) => "Registration closed. See other times?",
    }
}

fn tagline(course: &Course, site: &SiteInfo) -> String {
    let text = short_description(&strip_html(&course.description_html));
    if text.is_empty() {
        format!("{} with {} in {}.", course.title, site.name, site.service_area)
    } else {
        text
    }
}

fn hero_image(course: &Course, site: &SiteInfo) -> String {
    match &course.course_number {
        Some(n) => format!("../{}", course_image::image_path(n)),
        None => site.default_image.clone(),
    }
}

fn date_text(session: &Session, tz: Tz) -> String {
    session_start(session, tz)
        .map(|dt| long_date(&dt))
        .unwrap_or_else(|| NO_DATE.to_string())
}

fn location_text(session: &Session) -> &str {
    if session.location.is_empty() {
        NO_LOCATION
    } else {
        &session.location
    }
}

fn future_sorted<'a>(sessions: impl Iterator<Item = &'a Session>, now: DateTime<Utc>) -> Vec<&'a Session> {
    let mut future: Vec<&Session> = sessions
        .filter(|s| TimeStatus::of(s, now) == TimeStatus::Future)
        .collect();
    future.sort_by_key(|s| s.start_ms);
    future
}

fn render_future_sessions(others: &[&Session], settings: &LanderSettings) -> String {
    if others.is_empty() {
        return "<p>No additional dates are currently scheduled for this class. Please check back soon.</p>"
            .to_string();
    }

    let items: Vec<String> = others
        .iter()
        .take(settings.future_sessions_limit)
        .map(|s| {
            let register = if s.register_url().is_empty() {
                settings.enrollware_schedule_url
            } else {
                s.register_url()
            };
            format!(
                "<li class=\"periscope-item\">\n  <div class=\"periscope-main\">\n    <div class=\"periscope-date\">{}</div>\n    <div class=\"periscope-location\">{}</div>\n  </div>\n  <div class=\"periscope-cta\"><a href=\"{}\" class=\"btn-secondary\">Register</a></div>\n</li>",
                escape_html(&date_text(s, settings.tz)),
                escape_html(location_text(s)),
                escape_html(register)
            )
        })
        .collect();

    format!("<ul class=\"periscope-list\">\n{}\n</ul>", items.join("\n"))
}

fn render_other_classes(schedule: &Schedule, course: &Course, settings: &LanderSettings) -> String {
    let others: Vec<&Course> = schedule
        .courses
        .iter()
        .filter(|c| c.id != course.id)
        .take(settings.other_classes_limit)
        .collect();

    if others.is_empty() {
        return "<p>Explore our full CPR schedule for more options.</p>".to_string();
    }

    let cards: Vec<String> = others
        .into_iter()
        .map(|other| {
            let next = future_sorted(schedule.sessions_for(&other.id), settings.now)
                .into_iter()
                .find_map(|s| s.id);
            let (href, label) = match next {
                Some(id) => (format!("./session-{}.html", id), "See upcoming dates"),
                None => ("../schedule.html".to_string(), "See schedule"),
            };
            format!(
                "<article class=\"other-class-card\">\n  <h3>{}</h3>\n  <p>{}</p>\n  <a href=\"{}\" class=\"btn-ghost\">{}</a>\n</article>",
                escape_html(&other.title),
                escape_html(&tagline(other, settings.site)),
                escape_html(&href),
                label
            )
        })
        .collect();

    format!("<div class=\"other-classes-grid\">\n{}\n</div>", cards.join("\n"))
}

pub fn render_session_lander(
    template: &str,
    schedule: &Schedule,
    session: &Session,
    course: &Course,
    settings: &LanderSettings,
) -> String {
    let site = settings.site;
    let status = TimeStatus::of(session, settings.now);

    let enroll_url = if session.register_url().is_empty() {
        settings.enrollware_schedule_url
    } else {
        session.register_url()
    };
    let schedule_url = session
        .schedule_url
        .as_deref()
        .or(course.schedule_url.as_deref())
        .unwrap_or(settings.enrollware_schedule_url);

    let (cta_label, cta_href, show_banner) = match status {
        TimeStatus::Future => ("Register for this class", enroll_url, false),
        TimeStatus::Past => ("See other times for this class", schedule_url, true),
        TimeStatus::Unknown => ("See class options and schedule", schedule_url, false),
    };

    let siblings = future_sorted(
        schedule
            .sessions_for(&course.id)
            .filter(|s| !std::ptr::eq(*s, session)),
        settings.now,
    );

    let price_row = session
        .price
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<div><strong>Price:</strong> {}</div>", escape_html(p)))
        .unwrap_or_default();

    fill(
        template,
        &[
            ("SITE_NAME", escape_html(&site.name)),
            ("LEGAL_NAME", escape_html(&site.legal_name)),
            ("HOME_URL", escape_html(&site.home_url)),
            ("PHONE", escape_html(&site.phone)),
            ("PHONE_TEL", escape_html(&tel_href(&site.phone))),
            ("EMAIL", escape_html(&site.email)),
            ("ENROLLWARE_SCHEDULE_URL", escape_html(settings.enrollware_schedule_url)),
            ("COURSE_TITLE", escape_html(&course.title)),
            ("TAGLINE", escape_html(&tagline(course, site))),
            ("DATE", escape_html(&date_text(session, settings.tz))),
            ("LOCATION", escape_html(location_text(session))),
            ("PRICE_ROW", price_row),
            ("CTA_HREF", escape_html(cta_href)),
            ("CTA_LABEL", escape_html(cta_label)),
            ("START_ISO", escape_html(session.start_iso.as_deref().unwrap_or_default())),
            ("ENROLL_URL", escape_html(enroll_url)),
            ("SCHEDULE_URL", escape_html(schedule_url)),
            ("STATUS", status.as_str().to_string()),
            ("PAST_BANNER_DISPLAY", if show_banner { "flex" } else { "none" }.to_string()),
            ("HERO_IMAGE", escape_html(&hero_image(course, site))),
            (
                "MORE_TIMES_LABEL",
                escape_html(more_times_label(status, !siblings.is_empty())),
            ),
            ("FUTURE_SESSIONS", render_future_sessions(&siblings, settings)),
            ("OTHER_CLASSES", render_other_classes(schedule, course, settings)),
        ],
    )
}

/// `(path, html)` for every session that has an id and a known course.
pub fn render_all(template: &str, schedule: &Schedule, settings: &LanderSettings) -> Vec<(String, String)> {
    schedule
        .sessions
        .iter()
        .filter_map(|session| {
            let id = session.id?;
            let course = schedule.course(&session.course_id)?;
            Some((
                lander_path(id),
                render_session_lander(template, schedule, session, course, settings),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Brand, ClassType, ScheduleMeta};
    use chrono::TimeZone;

    fn course(id: &str, title: &str, number: Option<&str>) -> Course {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            title_html: String::new(),
            section_id: "bls".to_string(),
            brand: Brand::from_title(title),
            family: ClassType::from_title(title),
            course_number: number.map(str::to_string),
            schedule_url: number.map(|n| format!("https://x.enrollware.com/schedule#ct{}", n)),
            first_seen_index: 0,
            description_html: String::new(),
        }
    }

    fn session(id: u64, course_id: &str, start_iso: Option<&str>) -> Session {
        Session {
            id: Some(id),
            course_id: course_id.to_string(),
            title: String::new(),
            start_text: String::new(),
            start_iso: start_iso.map(str::to_string),
            start_ms: start_iso
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.timestamp_millis()),
            is_past: None,
            location: String::new(),
            url: format!("https://x.enrollware.com/enroll?id={}", id),
            register_url: format!("https://x.enrollware.com/enroll?id={}", id),
            schedule_url: None,
            price: None,
        }
    }

    fn schedule() -> Schedule {
        Schedule {
            meta: ScheduleMeta {
                source: "t".to_string(),
                fetched_at: "t".to_string(),
                panel_count: 2,
                session_count: 4,
            },
            sections: vec![],
            courses: vec![
                course("ct1", "AHA BLS Provider", Some("1")),
                course("ct2", "Heartsaver CPR AED", None),
            ],
            sessions: vec![
                session(100, "ct1", Some("2025-12-29T09:00:00-05:00")),
                session(101, "ct1", Some("2025-11-03T09:00:00-05:00")),
                session(102, "ct1", None),
                session(200, "ct2", Some("2026-01-10T10:00:00-05:00")),
            ],
        }
    }

    fn site() -> SiteInfo {
        SiteInfo::default()
    }

    fn settings(site: &SiteInfo) -> LanderSettings<'_> {
        LanderSettings {
            site,
            enrollware_schedule_url: "https://x.enrollware.com/schedule",
            tz: chrono_tz::America::New_York,
            now: Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap(),
            future_sessions_limit: 5,
            other_classes_limit: 4,
        }
    }

    fn page_for(id: u64) -> String {
        let schedule = schedule();
        let site = site();
        render_all(DEFAULT_TEMPLATE, &schedule, &settings(&site))
            .into_iter()
            .find(|(path, _)| path == &lander_path(id))
            .map(|(_, html)| html)
            .unwrap()
    }

    #[test]
    fn test_more_times_labels() {
        assert_eq!(more_times_label(TimeStatus::Unknown, true), "See other times and options");
        assert_eq!(more_times_label(TimeStatus::Future, true), "More times?");
        assert_eq!(more_times_label(TimeStatus::Future, false), "See other times?");
        assert_eq!(more_times_label(TimeStatus::Past, true), "Registration closed. See other times?");
    }

    #[test]
    fn test_future_session_page() {
        let html = page_for(100);
        assert!(html.contains("data-status-initial=\"future\""));
        assert!(html.contains(">Register for this class</a>"));
        assert!(html.contains("href=\"https://x.enrollware.com/enroll?id=100\""));
        assert!(html.contains("Monday, December 29, 2025 at 9:00 AM"));
        assert!(html.contains(NO_LOCATION));
        assert!(html.contains("style=\"display: none;\""));
        // Only the past and undated siblings remain, neither is upcoming.
        assert!(html.contains("<h2 id=\"more-times-heading\">See other times?</h2>"));
        assert!(html.contains("No additional dates are currently scheduled"));
        assert!(html.contains("src=\"../assets/images/course/1.svg\""));
        assert!(html.contains("href=\"./session-200.html\" class=\"btn-ghost\">See upcoming dates"));
        assert!(html.contains("href=\"tel:+19103955193\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_past_session_page() {
        let html = page_for(101);
        assert!(html.contains("data-status-initial=\"past\""));
        assert!(html.contains("href=\"https://x.enrollware.com/schedule#ct1\""));
        assert!(html.contains(">See other times for this class</a>"));
        assert!(html.contains("style=\"display: flex;\""));
        assert!(html.contains("Registration closed. See other times?</h2>"));
        assert!(html.contains("<div class=\"periscope-date\">Monday, December 29, 2025 at 9:00 AM</div>"));
    }

    #[test]
    fn test_unknown_session_page() {
        let html = page_for(102);
        assert!(html.contains("data-status-initial=\"unknown\""));
        assert!(html.contains(NO_DATE));
        assert!(html.contains(">See class options and schedule</a>"));
        assert!(html.contains("See other times and options</h2>"));
    }

    #[test]
    fn test_course_without_number_uses_default_image_and_escapes() {
        let mut schedule = schedule();
        schedule.courses[1].title = "Heartsaver <CPR> & AED".to_string();
        let site = site();
        let pages = render_all(DEFAULT_TEMPLATE, &schedule, &settings(&site));
        assert_eq!(pages.len(), 4);

        let (_, html) = pages.iter().find(|(p, _)| p == "classes/session-200.html").unwrap();
        assert!(html.contains("src=\"/images/910cpr-default-class.jpg\""));
        assert!(html.contains("<h1>Heartsaver &lt;CPR&gt; &amp; AED</h1>"));
        assert!(html.contains("Heartsaver &lt;CPR&gt; &amp; AED with 910 CPR in Wilmington"));
    }
}
