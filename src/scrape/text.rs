use regex::Regex;
use std::sync::OnceLock;

const SECTION_HINTS: [&str; 8] = [
    "healthcare provider: bls",
    "healthcare provider: acls",
    "healthcare provider: pals",
    "healthcare provider: asls",
    "cpr / aed & first aid",
    "cpr / aed only",
    "instructor programs",
    "other programs",
];

/// Longest text an element may carry and still count as a section heading.
const MAX_HEADER_LEN: usize = 80;

pub const OTHER_PROGRAMS: &str = "Other Programs";

fn place_hint() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)Wilmington|Burgaw|Jacksonville|Shipyard|Sound Rd|Hinton Ave|Gum Branch|Merlot|Wright St",
        )
        .unwrap()
    })
}

fn nc_tail() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bNC\b\s*[-–]\s*.+$").unwrap())
}

fn tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

/// Collapses runs of whitespace (including `&nbsp;`) to single spaces and trims.
pub fn normspace(s: &str) -> String {
    s.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-case ASCII slug: runs of anything that is not `[a-z0-9]` become one `-`.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for ch in s.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else {
            pending_dash = true;
        }
    }
    out
}

pub fn strip_tags(html: &str) -> String {
    tag().replace_all(html, "").into_owned()
}

pub fn is_section_header(text: &str) -> bool {
    let x = text.trim().to_lowercase();
    if x.is_empty() || x.len() > MAX_HEADER_LEN {
        return false;
    }
    SECTION_HINTS.iter().any(|h| x.starts_with(h))
}

/// Section title guessed from a course title when the page has no headings.
pub fn section_title_from_course(title: &str) -> &'static str {
    let guess = title.to_lowercase();
    if guess.contains("acls") {
        "Healthcare Provider: ACLS"
    } else if guess.contains("pals") {
        "Healthcare Provider: PALS"
    } else if guess.contains("bls") {
        "Healthcare Provider: BLS"
    } else if guess.contains("heartsaver") || guess.contains("first aid") {
        "CPR / AED & First Aid"
    } else {
        OTHER_PROGRAMS
    }
}

pub fn section_id_from_title(title: &str) -> String {
    let x = title.to_lowercase();
    let id = if x.contains("acls") {
        "acls"
    } else if x.contains("pals") {
        "pals"
    } else if x.contains("asls") {
        "asls"
    } else if x.contains("bls") {
        "bls"
    } else if x.contains("instructor") {
        "instructor"
    } else if x.contains("aed only") {
        "cpr"
    } else if x.contains("first aid") {
        "faid"
    } else {
        "other"
    };
    id.to_string()
}

/// Location text from the row around an enroll link: an `NC - ...` tail, else a known place name.
pub fn location_from_context(context: &str) -> Option<String> {
    if let Some(m) = nc_tail().find(context) {
        return Some(normspace(m.as_str()));
    }
    place_hint().find(context).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normspace() {
        assert_eq!(normspace("  BLS \n\t Provider\u{a0} "), "BLS Provider");
        assert_eq!(normspace(""), "");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("AHA BLS Provider - Wilmington"), "aha-bls-provider-wilmington");
        assert_eq!(slug("--Heartsaver® CPR/AED!"), "heartsaver-cpr-aed");
        assert_eq!(slug("***"), "");
    }

    #[test]
    fn test_section_header_detection() {
        assert!(is_section_header("Healthcare Provider: BLS"));
        assert!(is_section_header("  CPR / AED & First Aid (Heartsaver, ARC)"));
        assert!(!is_section_header("AHA BLS Provider"));
        let container = format!("Healthcare Provider: BLS {}", "course ".repeat(30));
        assert!(!is_section_header(&container));
    }

    #[test]
    fn test_section_ids() {
        assert_eq!(section_id_from_title("Healthcare Provider: BLS"), "bls");
        assert_eq!(section_id_from_title("Healthcare Provider: ACLS"), "acls");
        assert_eq!(section_id_from_title("CPR / AED & First Aid"), "faid");
        assert_eq!(section_id_from_title("CPR / AED Only"), "cpr");
        assert_eq!(section_id_from_title("Instructor Programs"), "instructor");
        assert_eq!(section_id_from_title(OTHER_PROGRAMS), "other");
    }

    #[test]
    fn test_section_title_from_course() {
        assert_eq!(section_title_from_course("AHA BLS Provider"), "Healthcare Provider: BLS");
        assert_eq!(section_title_from_course("Heartsaver First Aid CPR AED"), "CPR / AED & First Aid");
        assert_eq!(section_title_from_course("Babysitter Training"), OTHER_PROGRAMS);
    }

    #[test]
    fn test_location_from_context() {
        assert_eq!(
            location_from_context("Sat 1/10/2026 9:00 AM NC - Wilmington, 4018 Shipyard Blvd").as_deref(),
            Some("NC - Wilmington, 4018 Shipyard Blvd")
        );
        assert_eq!(
            location_from_context("Mon Jan 12 6:00 PM at our Burgaw office").as_deref(),
            Some("Burgaw")
        );
        assert_eq!(location_from_context("Mon Jan 12 6:00 PM"), None);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>AHA</b> BLS <i>Provider</i>"), "AHA BLS Provider");
    }
}
