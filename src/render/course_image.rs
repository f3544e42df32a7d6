//! 800×450 SVG course tiles.

use crate::domain::model::Schedule;
use crate::render::escape_html;
use crate::scrape::links::course_number_from_url;
use std::collections::BTreeMap;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;
const BAR_HEIGHT: u32 = 70;
const LABEL_FONT_SIZE: usize = 52;
const MIN_LABEL_FONT_SIZE: usize = 26;
/// Characters that fit at full size across the label box.
const LABEL_FULL_SIZE_CHARS: usize = 24;

const FALLBACK_LABEL: &str = "CPR / First Aid";

const LOCATION_KEYWORDS: [&str; 8] = [
    "wilmington",
    "shipyard",
    "jacksonville",
    "burgaw",
    "holly ridge",
    "myrtle beach",
    "nc",
    "sc",
];

const BODY_ABBREVIATIONS: [(&str, &str); 4] = [
    ("American Heart Association", "AHA"),
    ("American Heart Assoc.", "AHA"),
    ("American Red Cross", "ARC"),
    ("Red Cross", "ARC"),
];

pub fn image_path(course_number: &str) -> String {
    format!("assets/images/course/{}.svg", course_number)
}

/// Course number → first non-empty title, courses first, then sessions.
pub fn course_titles(schedule: &Schedule) -> BTreeMap<String, String> {
    let mut titles = BTreeMap::new();

    let from_courses = schedule.courses.iter().filter_map(|c| {
        let number = c
            .course_number
            .clone()
            .or_else(|| c.schedule_url.as_deref().and_then(course_number_from_url))?;
        Some((number, c.title.as_str()))
    });
    let from_sessions = schedule.sessions.iter().filter_map(|s| {
        let number = s
            .schedule_url
            .as_deref()
            .and_then(course_number_from_url)
            .or_else(|| course_number_from_url(&s.url))?;
        Some((number, s.title.as_str()))
    });

    for (number, title) in from_courses.chain(from_sessions) {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() || title.trim().is_empty() {
            continue;
        }
        titles.entry(digits).or_insert_with(|| title.to_string());
    }

    titles
}

fn replace_ignore_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_lowercase();
    let needle_lower = needle.to_lowercase();
    // Lower-casing can change byte lengths outside ASCII; leave such titles alone.
    if lower.len() != haystack.len() {
        return haystack.replace(needle, replacement);
    }
    match lower.find(&needle_lower) {
        Some(at) => format!(
            "{}{}{}",
            &haystack[..at],
            replacement,
            &haystack[at + needle.len()..]
        ),
        None => haystack.to_string(),
    }
}

/// `American Heart Association BLS Provider - Wilmington, NC` → `AHA BLS Provider`.
pub fn clean_course_label(raw_title: &str) -> String {
    let title = raw_title.trim();
    if title.is_empty() {
        return FALLBACK_LABEL.to_string();
    }

    let normalized = title.replace(['—', '–'], "-");
    let mut parts: Vec<&str> = normalized.split('-').map(str::trim).collect();
    if parts.len() > 1 {
        if let Some(last) = parts.last() {
            let last_lower = last.to_lowercase();
            let words: Vec<&str> = last_lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|w| !w.is_empty())
                .collect();
            let padded = format!(" {} ", words.join(" "));
            let looks_like_place = last.contains(',')
                || LOCATION_KEYWORDS
                    .iter()
                    .any(|kw| padded.contains(&format!(" {} ", kw)));
            if looks_like_place {
                parts.pop();
            }
        }
    }

    let mut base = parts.join(" - ");
    for (long, short) in BODY_ABBREVIATIONS {
        base = replace_ignore_case(&base, long, short);
    }
    let base = base.replace('|', "/");
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");

    if base.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        base
    }
}

fn label_font_size(label: &str) -> usize {
    let len = label.chars().count();
    if len <= LABEL_FULL_SIZE_CHARS {
        LABEL_FONT_SIZE
    } else {
        (LABEL_FONT_SIZE * LABEL_FULL_SIZE_CHARS / len).max(MIN_LABEL_FONT_SIZE)
    }
}

pub fn render_course_svg(course_number: &str, label: &str) -> String {
    let label_y = BAR_HEIGHT + 40 + 70;
    let number_y = BAR_HEIGHT + 40 + 170;
    let footer_y = HEIGHT - 45;

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <rect x="1.5" y="1.5" width="{bw}" height="{bh}" fill="#f3f7fc" stroke="#b4c4d6" stroke-width="3"/>
  <rect x="0" y="0" width="{w}" height="{bar}" fill="#105c87"/>
  <g font-family="Arial, Helvetica, sans-serif" text-anchor="middle" dominant-baseline="middle">
    <text x="{cx}" y="{bar_y}" font-size="24" fill="#ffffff">910CPR • CPR &amp; Medical Training</text>
    <text x="{cx}" y="{label_y}" font-size="{label_size}" font-weight="bold" fill="#141414">{label}</text>
    <text x="{cx}" y="{number_y}" font-size="24" fill="#505050">Course # {number}</text>
    <text x="{cx}" y="{footer_y}" font-size="20" fill="#505050">Class dates and registration at 910CPR.com</text>
  </g>
</svg>
"##,
        w = WIDTH,
        h = HEIGHT,
        bw = WIDTH - 3,
        bh = HEIGHT - 3,
        bar = BAR_HEIGHT,
        cx = WIDTH / 2,
        bar_y = BAR_HEIGHT / 2,
        label_y = label_y,
        label_size = label_font_size(label),
        label = escape_html(label),
        number_y = number_y,
        number = escape_html(course_number),
        footer_y = footer_y,
    )
}

/// `(path, svg)` per known course number.
pub fn render_all(schedule: &Schedule) -> Vec<(String, String)> {
    course_titles(schedule)
        .into_iter()
        .map(|(number, title)| {
            let label = clean_course_label(&title);
            (image_path(&number), render_course_svg(&number, &label))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Brand, ClassType, Course, ScheduleMeta, Session};

    #[test]
    fn test_clean_course_label() {
        assert_eq!(clean_course_label("AHA BLS Provider - Wilmington"), "AHA BLS Provider");
        assert_eq!(
            clean_course_label("American Heart Association ACLS — NC - Shipyard Blvd, Wilmington"),
            "AHA ACLS - NC"
        );
        assert_eq!(clean_course_label("American Red Cross Adult First Aid|CPR|AED"), "ARC Adult First Aid/CPR/AED");
        assert_eq!(clean_course_label("Heartsaver CPR AED - Skills Session"), "Heartsaver CPR AED - Skills Session");
        assert_eq!(clean_course_label("   "), FALLBACK_LABEL);
    }

    #[test]
    fn test_long_labels_shrink() {
        assert_eq!(label_font_size("AHA BLS Provider"), LABEL_FONT_SIZE);
        assert!(label_font_size("AHA Heartsaver Pediatric First Aid CPR AED Blended") < LABEL_FONT_SIZE);
        assert_eq!(label_font_size(&"x".repeat(200)), MIN_LABEL_FONT_SIZE);
    }

    #[test]
    fn test_course_titles_from_courses_then_sessions() {
        let schedule = Schedule {
            meta: ScheduleMeta {
                source: "t".to_string(),
                fetched_at: "t".to_string(),
                panel_count: 1,
                session_count: 1,
            },
            sections: vec![],
            courses: vec![Course {
                id: "ct209811".to_string(),
                title: "AHA BLS Provider".to_string(),
                title_html: String::new(),
                section_id: "bls".to_string(),
                brand: Brand::Aha,
                family: ClassType::Bls,
                course_number: Some("209811".to_string()),
                schedule_url: None,
                first_seen_index: 0,
                description_html: String::new(),
            }],
            sessions: vec![Session {
                id: Some(1),
                course_id: "other".to_string(),
                title: "PALS Provider".to_string(),
                start_text: String::new(),
                start_iso: None,
                start_ms: None,
                is_past: None,
                location: String::new(),
                url: "https://x.enrollware.com/enroll?id=1".to_string(),
                register_url: String::new(),
                schedule_url: Some("https://x.enrollware.com/schedule?course=300".to_string()),
                price: None,
            }],
        };

        let titles = course_titles(&schedule);
        assert_eq!(titles.len(), 2);
        assert_eq!(titles["209811"], "AHA BLS Provider");
        assert_eq!(titles["300"], "PALS Provider");

        let images = render_all(&schedule);
        assert_eq!(images[0].0, "assets/images/course/209811.svg");
        assert!(images[0].1.contains(">AHA BLS Provider</text>"));
        assert!(images[0].1.contains("Course # 209811"));
        assert!(images[0].1.contains("width=\"800\" height=\"450\""));
    }
}
