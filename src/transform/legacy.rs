use crate::domain::model::{ClassType, LegacySession, Schedule};
use std::collections::HashMap;

/// Flattens the schedule into the feed the old client-side widget reads.
/// The widget filters its own date window, so every session is kept.
pub fn to_legacy(schedule: &Schedule) -> Vec<LegacySession> {
    let titles: HashMap<&str, &str> = schedule
        .courses
        .iter()
        .map(|c| (c.id.as_str(), c.title.as_str()))
        .collect();

    schedule
        .sessions
        .iter()
        .map(|s| {
            let title = titles
                .get(s.course_id.as_str())
                .copied()
                .filter(|t| !t.is_empty())
                .or_else(|| Some(s.title.as_str()).filter(|t| !t.is_empty()))
                .unwrap_or("Untitled")
                .to_string();

            LegacySession {
                id: s.id,
                class_type: ClassType::from_title(&title),
                title,
                start: s.start_iso.clone(),
                end: None,
                location: s.location.clone(),
                instructor: None,
                seats: None,
                url: s.url.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Brand, Course, ScheduleMeta, Session};

    fn session(id: u64, course_id: &str, title: &str) -> Session {
        Session {
            id: Some(id),
            course_id: course_id.to_string(),
            title: title.to_string(),
            start_text: String::new(),
            start_iso: Some("2025-12-29T09:00:00-05:00".to_string()),
            start_ms: None,
            is_past: None,
            location: "Wilmington".to_string(),
            url: format!("https://x.enrollware.com/enroll?id={}", id),
            register_url: String::new(),
            schedule_url: None,
            price: None,
        }
    }

    #[test]
    fn test_titles_fall_back_from_course_to_session_to_untitled() {
        let schedule = Schedule {
            meta: ScheduleMeta {
                source: "t".to_string(),
                fetched_at: "t".to_string(),
                panel_count: 1,
                session_count: 3,
            },
            sections: vec![],
            courses: vec![Course {
                id: "ct1".to_string(),
                title: "AHA ACLS Provider".to_string(),
                title_html: String::new(),
                section_id: "acls".to_string(),
                brand: Brand::Aha,
                family: ClassType::Acls,
                course_number: Some("1".to_string()),
                schedule_url: None,
                first_seen_index: 0,
                description_html: String::new(),
            }],
            sessions: vec![
                session(1, "ct1", "ignored"),
                session(2, "missing", "Heartsaver CPR AED"),
                session(3, "missing", ""),
            ],
        };

        let legacy = to_legacy(&schedule);
        assert_eq!(legacy.len(), 3);
        assert_eq!(legacy[0].title, "AHA ACLS Provider");
        assert_eq!(legacy[0].class_type, ClassType::Acls);
        assert_eq!(legacy[1].class_type, ClassType::Heartsaver);
        assert_eq!(legacy[2].title, "Untitled");
        assert_eq!(legacy[2].class_type, ClassType::Other);

        let json = serde_json::to_value(&legacy[0]).unwrap();
        assert_eq!(json["classType"], "ACLS");
        assert_eq!(json["start"], "2025-12-29T09:00:00-05:00");
        assert!(json["end"].is_null());
        assert!(json["seats"].is_null());
    }
}
