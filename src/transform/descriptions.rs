use crate::domain::model::Course;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const MAX_SHORT_LEN: usize = 260;

const TITLE_DETAIL_SEPARATOR: &str = " — ";

fn script_or_style() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>|<style[^>]*>.*?</style>").unwrap())
}

fn block_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</(?:p|li|div|h[1-6])>").unwrap())
}

fn any_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionsMeta {
    pub generated_from: String,
    pub note: String,
    pub course_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDescription {
    pub course_id: String,
    pub family: String,
    #[serde(rename = "certBody")]
    pub cert_body: String,
    #[serde(rename = "deliveryMode")]
    pub delivery_mode: String,
    pub title: String,
    pub detail: String,
    #[serde(rename = "shortDescription")]
    pub short_description: String,
    #[serde(rename = "htmlDescription")]
    pub html_description: String,
}

/// `course-descriptions.json`: copy for marketing pages, no dates or session ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptionsFile {
    pub meta: DescriptionsMeta,
    pub courses: Vec<CourseDescription>,
}

/// Plain text from description HTML: scripts dropped, block ends become spaces.
pub fn strip_html(html: &str) -> String {
    let text = script_or_style().replace_all(html, "");
    let text = block_break().replace_all(&text, " ");
    let text = any_tag().replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts at `MAX_SHORT_LEN` characters, backing up to the last space, and appends `...`.
pub fn short_description(text: &str) -> String {
    if text.chars().count() <= MAX_SHORT_LEN {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_SHORT_LEN).collect();
    if let Some(space) = cut.rfind(' ') {
        cut.truncate(space);
    }
    cut.push_str("...");
    cut
}

pub fn delivery_mode(title: &str) -> &'static str {
    let t = title.to_lowercase();
    if ["heartcode", "online", "blended", "skills"]
        .iter()
        .any(|k| t.contains(k))
    {
        "Blended"
    } else {
        "Classroom"
    }
}

pub fn describe(course: &Course) -> CourseDescription {
    let detail = course
        .title
        .split_once(TITLE_DETAIL_SEPARATOR)
        .map(|(_, d)| d.trim().to_string())
        .unwrap_or_default();

    CourseDescription {
        course_id: course.id.clone(),
        family: course.family.to_string(),
        cert_body: course.brand.to_string(),
        delivery_mode: delivery_mode(&course.title).to_string(),
        title: course.title.clone(),
        detail,
        short_description: short_description(&strip_html(&course.description_html)),
        html_description: course.description_html.clone(),
    }
}

pub fn build_descriptions(courses: &[Course], generated_from: &str) -> DescriptionsFile {
    let records: Vec<CourseDescription> = courses.iter().map(describe).collect();
    DescriptionsFile {
        meta: DescriptionsMeta {
            generated_from: generated_from.to_string(),
            note: "Description-only export. Dates and session_ids intentionally excluded."
                .to_string(),
            course_count: records.len(),
        },
        courses: records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Brand, ClassType};

    fn course(title: &str, description_html: &str) -> Course {
        Course {
            id: "ct42".to_string(),
            title: title.to_string(),
            title_html: String::new(),
            section_id: "bls".to_string(),
            brand: Brand::from_title(title),
            family: ClassType::from_title(title),
            course_number: Some("42".to_string()),
            schedule_url: None,
            first_seen_index: 0,
            description_html: description_html.to_string(),
        }
    }

    #[test]
    fn test_strip_html() {
        let html = "<style>p{}</style><p>Learn&nbsp;CPR</p><ul><li>AED</li><li>Choking</li></ul>Done<br/>now<script>x()</script>";
        assert_eq!(strip_html(html), "Learn CPR AED Choking Done now");
    }

    #[test]
    fn test_short_description_cuts_on_word_boundary() {
        let text = "word ".repeat(80);
        let short = short_description(text.trim());
        assert!(short.ends_with("word..."));
        assert!(short.chars().count() <= MAX_SHORT_LEN + 3);

        assert_eq!(short_description("Short and sweet."), "Short and sweet.");
    }

    #[test]
    fn test_describe_splits_title_detail() {
        let record = describe(&course(
            "AHA BLS Provider — HeartCode Skills Session",
            "<p>Skills check only.</p>",
        ));
        assert_eq!(record.detail, "HeartCode Skills Session");
        assert_eq!(record.title, "AHA BLS Provider — HeartCode Skills Session");
        assert_eq!(record.delivery_mode, "Blended");
        assert_eq!(record.cert_body, "AHA");
        assert_eq!(record.family, "BLS");
        assert_eq!(record.short_description, "Skills check only.");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["certBody"], "AHA");
        assert_eq!(json["htmlDescription"], "<p>Skills check only.</p>");
    }

    #[test]
    fn test_classroom_course_without_detail() {
        let file = build_descriptions(&[course("Heartsaver CPR AED", "")], "courses.json");
        assert_eq!(file.meta.course_count, 1);
        assert_eq!(file.courses[0].detail, "");
        assert_eq!(file.courses[0].delivery_mode, "Classroom");
        assert_eq!(file.courses[0].short_description, "");
    }
}
