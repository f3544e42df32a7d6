//! "Pick a format, pick a location" landers that deep-link into Enrollware's schedule filter.

use crate::config::toml_config::SiteInfo;
use crate::render::{escape_html, fill, tel_href};
use crate::utils::error::{Result, SiteError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/router_lander.html");

const DEFAULT_SUBTITLE: &str = "Pick your option → pick your location → book";
const DEFAULT_INTRO: &str = "Choose the option that matches what you need, then book on Enrollware.";

/// `landers.config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub landers: Vec<RouterLander>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterLander {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default, rename = "enrollwareBase")]
    pub enrollware_base: Option<String>,
    #[serde(default)]
    pub formats: Vec<Format>,
    /// Location id → location; file order is the on-page button order.
    #[serde(default)]
    pub locations: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Location id → Enrollware course id; ids may be numbers or strings in the file.
    #[serde(default, rename = "courseByLocation")]
    pub course_by_location: Map<String, Value>,
    /// Anything else the page script reads (badges, notes) passes through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What the page script reads as `CONFIG`.
#[derive(Debug, Serialize)]
struct ScriptConfig<'a> {
    #[serde(rename = "enrollwareBase")]
    enrollware_base: &'a str,
    formats: &'a [Format],
    locations: &'a Map<String, Value>,
}

pub fn normalize_slug(raw: &str) -> Result<String> {
    let slug = raw.trim().to_lowercase();
    if slug.is_empty() {
        return Err(SiteError::ValidationError {
            message: "router lander slug is empty".to_string(),
        });
    }
    if slug.contains(['/', '\\']) || slug.contains("..") {
        return Err(SiteError::ValidationError {
            message: format!("router lander slug '{}' must be a single path segment", raw),
        });
    }
    Ok(slug)
}

/// Keeps `</script>` inside JSON strings from closing the script element.
fn script_safe_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Returns `(landers/<slug>/index.html, html)`.
pub fn render_router_lander(
    template: &str,
    lander: &RouterLander,
    site: &SiteInfo,
    default_enrollware_base: &str,
) -> Result<(String, String)> {
    let slug = normalize_slug(&lander.slug)?;
    let enrollware_base = lander
        .enrollware_base
        .as_deref()
        .unwrap_or(default_enrollware_base);

    let config_json = script_safe_json(&ScriptConfig {
        enrollware_base,
        formats: &lander.formats,
        locations: &lander.locations,
    })?;

    let description = lander
        .description
        .clone()
        .unwrap_or_else(|| format!("{} – {}", lander.title, site.name));

    let html = fill(
        template,
        &[
            ("SITE_NAME", escape_html(&site.name)),
            ("PHONE", escape_html(&site.phone)),
            ("PHONE_TEL", escape_html(&tel_href(&site.phone))),
            ("ENROLLWARE_SCHEDULE_URL", escape_html(default_enrollware_base)),
            ("TITLE", escape_html(&lander.title)),
            ("DESCRIPTION", escape_html(&description)),
            (
                "SUBTITLE",
                escape_html(lander.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE)),
            ),
            (
                "INTRO",
                escape_html(lander.intro.as_deref().unwrap_or(DEFAULT_INTRO)),
            ),
            ("CONFIG_JSON", config_json),
        ],
    );

    Ok((format!("landers/{}/index.html", slug), html))
}
