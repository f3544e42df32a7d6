use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Certifying body guessed from a course title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Brand {
    #[serde(rename = "AHA")]
    Aha,
    #[serde(rename = "Red Cross")]
    RedCross,
    #[serde(rename = "HSI")]
    Hsi,
    #[default]
    Other,
}

impl Brand {
    pub fn from_title(title: &str) -> Self {
        let x = title.to_lowercase();
        if x.starts_with("arc") || x.contains("american red cross") || x.contains("arc -") {
            Brand::RedCross
        } else if x.contains("hsi") {
            Brand::Hsi
        } else if x.contains("aha") || x.contains("american heart") {
            Brand::Aha
        } else {
            Brand::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Aha => "AHA",
            Brand::RedCross => "Red Cross",
            Brand::Hsi => "HSI",
            Brand::Other => "Other",
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class family, also the `classType` of the legacy frontend feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClassType {
    #[serde(rename = "ACLS")]
    Acls,
    #[serde(rename = "PALS")]
    Pals,
    #[serde(rename = "BLS")]
    Bls,
    Heartsaver,
    #[serde(rename = "HSI")]
    Hsi,
    #[default]
    Other,
}

impl ClassType {
    /// Order matters: "BLS" appears inside most ACLS/PALS titles.
    pub fn from_title(title: &str) -> Self {
        let t = title.to_lowercase();
        if t.contains("acls") {
            ClassType::Acls
        } else if t.contains("pals") {
            ClassType::Pals
        } else if t.contains("bls") {
            ClassType::Bls
        } else if t.contains("heartsaver") {
            ClassType::Heartsaver
        } else if t.contains("hsi") {
            ClassType::Hsi
        } else {
            ClassType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Acls => "ACLS",
            ClassType::Pals => "PALS",
            ClassType::Bls => "BLS",
            ClassType::Heartsaver => "Heartsaver",
            ClassType::Hsi => "HSI",
            ClassType::Other => "Other",
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub title_html: String,
    pub section_id: String,
    #[serde(default)]
    pub brand: Brand,
    #[serde(default)]
    pub family: ClassType,
    #[serde(default)]
    pub course_number: Option<String>,
    #[serde(default)]
    pub schedule_url: Option<String>,
    pub first_seen_index: usize,
    #[serde(default)]
    pub description_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<u64>,
    pub course_id: String,
    pub title: String,
    #[serde(default)]
    pub start_text: String,
    #[serde(default)]
    pub start_iso: Option<String>,
    #[serde(default)]
    pub start_ms: Option<i64>,
    #[serde(default)]
    pub is_past: Option<bool>,
    #[serde(default)]
    pub location: String,
    pub url: String,
    #[serde(default)]
    pub register_url: String,
    #[serde(default)]
    pub schedule_url: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
}

impl Session {
    pub fn register_url(&self) -> &str {
        if self.register_url.is_empty() {
            &self.url
        } else {
            &self.register_url
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMeta {
    pub source: String,
    pub fetched_at: String,
    pub panel_count: usize,
    pub session_count: usize,
}

/// Contents of `schedule.json`: sections, courses and sessions keyed by course id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub meta: ScheduleMeta,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl Schedule {
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn sessions_for<'a>(&'a self, course_id: &'a str) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions.iter().filter(move |s| s.course_id == course_id)
    }

    /// Structural checks run after every scrape and by the `check` command.
    pub fn integrity_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (i, section) in self.sections.iter().enumerate() {
            if section.index != i {
                errors.push(format!(
                    "Section '{}' has index {} but is at position {}",
                    section.id, section.index, i
                ));
            }
        }

        let mut course_ids = HashSet::new();
        for course in &self.courses {
            if !course_ids.insert(course.id.as_str()) {
                errors.push(format!("Course id '{}' is used more than once", course.id));
            }
        }

        for session in &self.sessions {
            if self.course(&session.course_id).is_none() {
                errors.push(format!(
                    "Session {} has unknown course_id {}",
                    session.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                    session.course_id
                ));
            }
        }

        errors
    }
}

/// One row of the flat feed the legacy client-side schedule widget reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySession {
    pub id: Option<u64>,
    #[serde(rename = "classType")]
    pub class_type: ClassType,
    pub title: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: String,
    pub instructor: Option<String>,
    pub seats: Option<u32>,
    pub url: String,
}
