use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn enroll_id() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // enroll?id=123, enroll.aspx?id=123, /enroll?x=y&id=123
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|[/'"(\s])(enroll(?:\.aspx)?)\?[^"'\s]*?\bid=(\d+)"#).unwrap()
    })
}

fn course_anchor() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)#ct(\d+)").unwrap())
}

fn course_param() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[?&]course=(\d+)").unwrap())
}

/// An enrollment link found somewhere in the snapshot, rebuilt without extra query noise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollLink {
    pub session_id: u64,
    pub relative: String,
}

impl EnrollLink {
    pub fn resolve(&self, base: &Url) -> String {
        base.join(&self.relative)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}{}", base, self.relative))
    }
}

pub fn find_enroll_link(text: &str) -> Option<EnrollLink> {
    let caps = enroll_id().captures(text)?;
    let session_id = caps[2].parse().ok()?;
    Some(EnrollLink {
        session_id,
        relative: format!("{}?id={}", &caps[1], &caps[2]),
    })
}

/// Digits of the first `#ct######` fragment in `text`.
pub fn course_number_in(text: &str) -> Option<String> {
    course_anchor().captures(text).map(|c| c[1].to_string())
}

/// Course number from a schedule or filter URL: `#ct209811` or `?course=209811`.
pub fn course_number_from_url(url: &str) -> Option<String> {
    course_number_in(url).or_else(|| course_param().captures(url).map(|c| c[1].to_string()))
}

pub fn schedule_url(base: &Url, course_number: &str) -> Option<String> {
    base.join(&format!("schedule#ct{}", course_number))
        .ok()
        .map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://coastalcprtraining.enrollware.com/").unwrap()
    }

    #[test]
    fn test_find_enroll_link_variants() {
        let link = find_enroll_link("enroll?id=12345").unwrap();
        assert_eq!(link.session_id, 12345);
        assert_eq!(link.relative, "enroll?id=12345");

        let link = find_enroll_link("/enroll.aspx?x=y&id=777").unwrap();
        assert_eq!(link.relative, "enroll.aspx?id=777");

        let link = find_enroll_link("window.location='enroll?id=42&ret=1'").unwrap();
        assert_eq!(link.session_id, 42);

        assert!(find_enroll_link("schedule#ct209811").is_none());
        assert!(find_enroll_link("reenroll?id=5").is_none());
    }

    #[test]
    fn test_resolve_against_base() {
        let link = find_enroll_link("https://coastalcprtraining.enrollware.com/enroll?id=9").unwrap();
        assert_eq!(
            link.resolve(&base()),
            "https://coastalcprtraining.enrollware.com/enroll?id=9"
        );
    }

    #[test]
    fn test_course_numbers() {
        assert_eq!(course_number_in("schedule#ct209811").as_deref(), Some("209811"));
        assert_eq!(
            course_number_from_url("https://x.enrollware.com/schedule?location=3&course=55").as_deref(),
            Some("55")
        );
        assert_eq!(course_number_from_url("https://x.enrollware.com/enroll?id=1"), None);
        assert_eq!(
            schedule_url(&base(), "209811").as_deref(),
            Some("https://coastalcprtraining.enrollware.com/schedule#ct209811")
        );
    }
}
