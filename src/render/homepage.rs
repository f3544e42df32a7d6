//! Homepage rebuilt from a saved base page plus the snapshot's live schedule panel.

use crate::utils::error::{Result, SiteError};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const PANEL_PLACEHOLDER: &str = "{{SCHEDULE_PANEL}}";

fn sched_panel() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("div#maincontent_schedPanel").unwrap())
}

fn enrmain() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("#enrmain").unwrap())
}

fn body() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("body").unwrap())
}

fn schedule_root_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<div\b[^>]*\bid\s*=\s*["']schedule-root["'][^>]*>"#).unwrap()
    })
}

fn div_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<div\b[^>]*>|</div\s*>").unwrap())
}

/// The whole `#maincontent_schedPanel` element, else `#enrmain`, else the body contents.
pub fn extract_schedule_panel(snapshot: &str) -> Result<String> {
    let doc = Html::parse_document(snapshot);

    if let Some(panel) = doc.select(sched_panel()).next() {
        return Ok(panel.html());
    }
    if let Some(main) = doc.select(enrmain()).next() {
        tracing::warn!("⚠️ No #maincontent_schedPanel in snapshot, using #enrmain");
        return Ok(main.html());
    }
    if let Some(body) = doc.select(body()).next() {
        let inner = body.inner_html();
        if !inner.trim().is_empty() {
            tracing::warn!("⚠️ No schedule panel in snapshot, using the whole <body>");
            return Ok(inner);
        }
    }

    Err(SiteError::ScrapeError {
        message: "snapshot has no #maincontent_schedPanel, #enrmain or <body> content".to_string(),
    })
}

/// Puts the panel at `{{SCHEDULE_PANEL}}`, else replaces the contents of `<div id="schedule-root">`.
pub fn splice_panel(template: &str, panel: &str) -> Result<String> {
    if template.contains(PANEL_PLACEHOLDER) {
        return Ok(template.replacen(PANEL_PLACEHOLDER, panel, 1));
    }

    let open = schedule_root_open()
        .find(template)
        .ok_or_else(|| SiteError::TemplateError {
            message: format!(
                "homepage template has neither {} nor <div id=\"schedule-root\">",
                PANEL_PLACEHOLDER
            ),
        })?;

    let mut depth = 1usize;
    for tag in div_tag().find_iter(&template[open.end()..]) {
        if tag.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                let close = open.end() + tag.start();
                return Ok(format!(
                    "{}\n{}\n{}",
                    &template[..open.end()],
                    panel,
                    &template[close..]
                ));
            }
        } else if !tag.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    Err(SiteError::TemplateError {
        message: "<div id=\"schedule-root\"> is never closed".to_string(),
    })
}

/// Applies prefix rewrites in key order.
pub fn rewrite_links(html: &str, rewrites: &BTreeMap<String, String>) -> String {
    rewrites
        .iter()
        .fold(html.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

pub fn build_homepage(template: &str, snapshot: &str, rewrites: &BTreeMap<String, String>) -> Result<String> {
    let panel = extract_schedule_panel(snapshot)?;
    let page = splice_panel(template, &panel)?;
    Ok(rewrite_links(&page, rewrites))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = include_str!("../../templates/index-base.html");

    const SNAPSHOT: &str = r#"<html><body>
<div id="header">Enrollware</div>
<div id="maincontent_schedPanel"><div id="enraccordion"><div class="enrpanel">BLS</div></div></div>
</body></html>"#;

    fn rewrites() -> BTreeMap<String, String> {
        crate::config::toml_config::HomepageConfig::default().link_rewrites
    }

    #[test]
    fn test_extract_prefers_sched_panel() {
        let panel = extract_schedule_panel(SNAPSHOT).unwrap();
        assert!(panel.starts_with("<div id=\"maincontent_schedPanel\">"));
        assert!(!panel.contains("header"));
    }

    #[test]
    fn test_extract_falls_back_to_enrmain_then_body() {
        let panel = extract_schedule_panel(r#"<div id="enrmain"><p>x</p></div><p>y</p>"#).unwrap();
        assert_eq!(panel, "<div id=\"enrmain\"><p>x</p></div>");

        let panel = extract_schedule_panel("<p>only body</p>").unwrap();
        assert_eq!(panel, "<p>only body</p>");

        assert!(extract_schedule_panel("").is_err());
    }

    #[test]
    fn test_splice_replaces_schedule_root_contents() {
        let template = r#"<main><div id="schedule-root" class="wide"><div class="old"><p>stale</p></div><br/></div><footer>f</footer></main>"#;
        let page = splice_panel(template, "<div>NEW</div>").unwrap();
        assert_eq!(
            page,
            "<main><div id=\"schedule-root\" class=\"wide\">\n<div>NEW</div>\n</div><footer>f</footer></main>"
        );
    }

    #[test]
    fn test_splice_placeholder_and_errors() {
        assert_eq!(splice_panel("<p>{{SCHEDULE_PANEL}}</p>", "X").unwrap(), "<p>X</p>");
        assert!(matches!(
            splice_panel("<p>nothing</p>", "X"),
            Err(SiteError::TemplateError { .. })
        ));
        assert!(splice_panel("<div id='schedule-root'><div>", "X").is_err());
    }

    #[test]
    fn test_link_rewrites() {
        let html = r#"<a href="https://coastalcprtraining.com/a">a</a><a href="https://www.coastalcprtraining.com/b">b</a>"#;
        assert_eq!(
            rewrite_links(html, &rewrites()),
            r#"<a href="http://coastalcprtraining.com/a">a</a><a href="http://coastalcprtraining.com/b">b</a>"#
        );
    }

    #[test]
    fn test_build_homepage_from_default_template() {
        let page = build_homepage(BASE, SNAPSHOT, &rewrites()).unwrap();
        assert!(page.contains("<div class=\"enrpanel\">BLS</div>"));
        assert!(!page.contains(PANEL_PLACEHOLDER));
    }
}
