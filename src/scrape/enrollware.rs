use crate::domain::model::{
    Brand, ClassType, Course, Schedule, ScheduleMeta, Section, Session,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use super::dates::parse_start;
use super::links::{self, EnrollLink};
use super::text::{
    is_section_header, location_from_context, normspace, section_id_from_title,
    section_title_from_course, slug, strip_tags,
};
use super::ScrapeContext;

/// Longest start text kept when it has to come from a whole row.
const MAX_ROW_START_TEXT: usize = 140;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        fn $name() -> &'static Selector {
            static SELECTOR: OnceLock<Selector> = OnceLock::new();
            SELECTOR.get_or_init(|| Selector::parse($css).unwrap())
        }
    };
}

selector!(accordion_panels, "#maincontent_sched #enraccordion div.enrpanel");
selector!(any_panel, "div.enrpanel");
selector!(heading_trigger, ".enrpanel-heading .enrpanel-title a.enrtrigger, .enrpanel-heading a");
selector!(title_fallback, ".enrpanel-title, .enrtitle, h2, h3");
selector!(course_anchor, "a[name^=\"ct\"]");
selector!(linked_anchor, "a[href]");
selector!(panel_body, ".enrpanel-body");
selector!(class_list, "ul.enrclass-list");
selector!(span, "span");

fn is_panel(el: &ElementRef) -> bool {
    el.value().name() == "div" && el.value().classes().any(|c| c == "enrpanel")
}

fn text_of(el: &ElementRef) -> String {
    normspace(&el.text().collect::<Vec<_>>().join(" "))
}

fn inside_panel(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_panel(&a))
}

/// Enclosing list item or table row, else the parent element.
fn row_of<'a>(el: &ElementRef<'a>, tags: &[&str]) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| tags.contains(&a.value().name()))
        .or_else(|| el.parent().and_then(ElementRef::wrap))
}

/// Builds the schedule while enforcing first-seen ordering and de-duplication.
struct ScheduleBuilder<'c> {
    ctx: &'c ScrapeContext,
    sections: Vec<Section>,
    section_by_title: HashMap<String, usize>,
    courses: Vec<Course>,
    course_by_title: HashMap<String, usize>,
    sessions: Vec<Session>,
    seen_urls: HashSet<String>,
}

struct CourseDraft {
    id: String,
    title: String,
    title_html: String,
    section_title: String,
    course_number: Option<String>,
    description_html: String,
}

impl<'c> ScheduleBuilder<'c> {
    fn new(ctx: &'c ScrapeContext) -> Self {
        Self {
            ctx,
            sections: Vec::new(),
            section_by_title: HashMap::new(),
            courses: Vec::new(),
            course_by_title: HashMap::new(),
            sessions: Vec::new(),
            seen_urls: HashSet::new(),
        }
    }

    fn section(&mut self, title: &str) -> String {
        let key = title.to_lowercase();
        if let Some(&i) = self.section_by_title.get(&key) {
            return self.sections[i].id.clone();
        }

        let mut id = section_id_from_title(title);
        if self.sections.iter().any(|s| s.id == id) {
            id = format!("{}-{}", id, self.sections.len());
        }
        let index = self.sections.len();
        self.sections.push(Section {
            id: id.clone(),
            title: title.to_string(),
            index,
        });
        self.section_by_title.insert(key, index);
        id
    }

    /// Returns the id of the course with this title, creating it on first sight.
    fn course(&mut self, draft: CourseDraft) -> String {
        let key = draft.title.to_lowercase();
        if let Some(&i) = self.course_by_title.get(&key) {
            let existing = &mut self.courses[i];
            if !draft.description_html.is_empty() {
                existing.description_html = draft.description_html;
            }
            if existing.course_number.is_none() && draft.course_number.is_some() {
                existing.schedule_url = draft
                    .course_number
                    .as_deref()
                    .and_then(|n| links::schedule_url(&self.ctx.base_url, n));
                existing.course_number = draft.course_number;
            }
            return existing.id.clone();
        }

        let section_id = self.section(&draft.section_title);
        let index = self.courses.len();
        // Distinct titles can slug to the same id ("BLS Provider", "BLS-Provider").
        let id = if self.courses.iter().any(|c| c.id == draft.id) {
            format!("{}-{}", draft.id, index)
        } else {
            draft.id
        };
        let schedule_url = draft
            .course_number
            .as_deref()
            .and_then(|n| links::schedule_url(&self.ctx.base_url, n));

        self.courses.push(Course {
            id: id.clone(),
            brand: Brand::from_title(&draft.title),
            family: ClassType::from_title(&draft.title),
            title: draft.title,
            title_html: draft.title_html,
            section_id,
            course_number: draft.course_number,
            schedule_url,
            first_seen_index: index,
            description_html: draft.description_html,
        });
        self.course_by_title.insert(key, index);
        id
    }

    fn push_session(
        &mut self,
        course_id: &str,
        link: &EnrollLink,
        start_candidates: &[&str],
        start_text: String,
        location: String,
    ) {
        let url = link.resolve(&self.ctx.base_url);
        if !self.seen_urls.insert(url.clone()) {
            tracing::debug!("Skipping duplicate enroll link {}", url);
            return;
        }

        let start = start_candidates
            .iter()
            .find_map(|text| parse_start(text, self.ctx.tz, self.ctx.now));
        if start.is_none() {
            tracing::debug!("No parseable start for session {}: '{}'", link.session_id, start_text);
        }

        let (title, schedule_url) = self
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| (c.title.clone(), c.schedule_url.clone()))
            .unwrap_or_default();

        self.sessions.push(Session {
            id: Some(link.session_id),
            course_id: course_id.to_string(),
            title,
            start_text,
            start_iso: start.as_ref().map(|s| s.iso()),
            start_ms: start.as_ref().map(|s| s.millis()),
            is_past: start.as_ref().map(|s| s.is_past(self.ctx.now)),
            location,
            url: url.clone(),
            register_url: url,
            schedule_url,
            price: None,
        });
    }

    fn finish(self, panel_count: usize) -> Schedule {
        Schedule {
            meta: ScheduleMeta {
                source: self.ctx.source.clone(),
                fetched_at: self.ctx.now.to_rfc3339(),
                panel_count,
                session_count: self.sessions.len(),
            },
            sections: self.sections,
            courses: self.courses,
            sessions: self.sessions,
        }
    }
}

pub fn parse_snapshot(html: &str, ctx: &ScrapeContext) -> Schedule {
    let doc = Html::parse_document(html);

    let mut panels: Vec<ElementRef> = doc.select(accordion_panels()).collect();
    if panels.is_empty() {
        panels = doc.select(any_panel()).collect();
    }
    tracing::info!("🔎 Found {} enrpanel blocks", panels.len());

    let mut builder = ScheduleBuilder::new(ctx);

    if panels.is_empty() {
        scrape_loose_links(&doc, &mut builder);
        return builder.finish(0);
    }

    for (panel, header) in panels_with_headers(&doc, &panels) {
        scrape_panel(panel, header.as_deref(), &mut builder);
    }

    let count = panels.len();
    builder.finish(count)
}

/// Pairs every panel with the nearest section heading before it in document order.
fn panels_with_headers<'a>(
    doc: &'a Html,
    panels: &[ElementRef<'a>],
) -> Vec<(ElementRef<'a>, Option<String>)> {
    let mut current: Option<String> = None;
    let mut out = Vec::with_capacity(panels.len());

    for el in doc.root_element().descendants().filter_map(ElementRef::wrap) {
        if panels.contains(&el) {
            out.push((el, current.clone()));
            continue;
        }
        if is_panel(&el) || inside_panel(&el) {
            continue;
        }
        let text = text_of(&el);
        if is_section_header(&text) {
            current = Some(text);
        }
    }

    out
}

fn panel_title(panel: &ElementRef) -> (String, String) {
    let trigger = panel.select(heading_trigger()).next();
    let title_html = trigger
        .map(|t| t.inner_html().trim().to_string())
        .unwrap_or_default();

    let from_value = panel
        .value()
        .attr("value")
        .map(|v| normspace(&strip_tags(v)))
        .filter(|t| !t.is_empty());

    let title = from_value
        .or_else(|| trigger.map(|t| text_of(&t)).filter(|t| !t.is_empty()))
        .or_else(|| {
            panel
                .select(title_fallback())
                .map(|el| text_of(&el))
                .find(|t| !t.is_empty())
        })
        .unwrap_or_default();

    let title_html = if title_html.is_empty() { title.clone() } else { title_html };
    (title, title_html)
}

/// `ct######` anchor digits, else the first `#ct######` in hrefs, attributes, then raw markup.
fn panel_course_number(panel: &ElementRef, anchor_name: Option<&str>) -> Option<String> {
    if let Some(digits) = anchor_name
        .and_then(|n| n.get(2..))
        .filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit()))
    {
        return Some(digits.to_string());
    }

    panel
        .select(linked_anchor())
        .filter_map(|a| a.value().attr("href"))
        .find_map(links::course_number_in)
        .or_else(|| {
            panel
                .descendants()
                .filter_map(ElementRef::wrap)
                .flat_map(|el| el.value().attrs().map(|(_, v)| v).collect::<Vec<_>>())
                .find_map(links::course_number_in)
        })
        .or_else(|| links::course_number_in(&panel.html()))
}

fn panel_description(panel: &ElementRef) -> String {
    let Some(body) = panel.select(panel_body()).next() else {
        return String::new();
    };
    let mut html = body.inner_html();
    for list in body.select(class_list()) {
        html = html.replacen(&list.html(), "", 1);
    }
    html.trim().to_string()
}

/// Every enroll link in the panel: anchor hrefs first, then any attribute (onclick, data-*).
fn panel_enroll_links<'a>(panel: &ElementRef<'a>) -> Vec<(EnrollLink, ElementRef<'a>)> {
    let mut found: Vec<(EnrollLink, ElementRef<'a>)> = Vec::new();
    let mut seen = HashSet::new();

    for a in panel.select(linked_anchor()) {
        if let Some(link) = a.value().attr("href").and_then(links::find_enroll_link) {
            if seen.insert(link.relative.clone()) {
                found.push((link, a));
            }
        }
    }

    for el in panel.descendants().filter_map(ElementRef::wrap) {
        for (_, value) in el.value().attrs() {
            if let Some(link) = links::find_enroll_link(value) {
                if seen.insert(link.relative.clone()) {
                    found.push((link, el));
                }
            }
        }
    }

    found
}

fn scrape_panel(panel: ElementRef, header: Option<&str>, builder: &mut ScheduleBuilder) {
    let (title, title_html) = panel_title(&panel);
    if title.is_empty() {
        tracing::debug!("Skipping enrpanel without a title");
        return;
    }

    let anchor_name = panel
        .select(course_anchor())
        .next()
        .and_then(|a| a.value().attr("name"))
        .map(str::to_string);
    let course_number = panel_course_number(&panel, anchor_name.as_deref());

    let id = anchor_name
        .clone()
        .or_else(|| course_number.as_ref().map(|n| format!("ct{}", n)))
        .unwrap_or_else(|| {
            let s = slug(&title);
            if s.is_empty() {
                format!("course-{}", builder.courses.len())
            } else {
                s
            }
        });

    let section_title = header
        .map(str::to_string)
        .unwrap_or_else(|| section_title_from_course(&title).to_string());

    let course_id = builder.course(CourseDraft {
        id,
        title,
        title_html,
        section_title,
        course_number,
        description_html: panel_description(&panel),
    });

    for (link, el) in panel_enroll_links(&panel) {
        let full_text = text_of(&el);
        let span_text = el
            .select(span())
            .next()
            .map(|s| text_of(&s))
            .filter(|t| !t.is_empty());
        let start_text = match &span_text {
            Some(loc) => normspace(&full_text.replacen(loc.as_str(), "", 1)),
            None => full_text,
        };

        let row = row_of(&el, &["li", "tr"]);
        let row_text = row.map(|r| text_of(&r)).unwrap_or_default();

        let location = span_text
            .or_else(|| {
                row.and_then(|r| r.select(span()).next())
                    .map(|s| text_of(&s))
                    .filter(|t| !t.is_empty())
            })
            .or_else(|| location_from_context(&row_text))
            .unwrap_or_default();

        let data_start = el.value().attr("data-start").unwrap_or_default();
        builder.push_session(
            &course_id,
            &link,
            &[data_start, &start_text, &row_text],
            start_text.clone(),
            location,
        );
    }
}

/// Snapshots without enrpanel markup: every enroll link in the page becomes a session.
fn scrape_loose_links(doc: &Html, builder: &mut ScheduleBuilder) {
    for a in doc.select(linked_anchor()) {
        let Some(link) = a.value().attr("href").and_then(links::find_enroll_link) else {
            continue;
        };

        let anchor_text = text_of(&a);
        let row_text = row_of(&a, &["li", "tr", "div", "section", "article"])
            .map(|r| text_of(&r))
            .unwrap_or_default();

        let title = a
            .value()
            .attr("title")
            .map(normspace)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                let rest = normspace(&row_text.replacen(&anchor_text, "", 1));
                (!rest.is_empty()).then_some(rest)
            })
            .unwrap_or_else(|| anchor_text.clone());
        if title.is_empty() {
            continue;
        }

        let start_text = if anchor_text.is_empty() {
            row_text.chars().take(MAX_ROW_START_TEXT).collect()
        } else {
            anchor_text
        };
        let location = location_from_context(&row_text).unwrap_or_default();

        let id = {
            let s = slug(&title);
            if s.is_empty() {
                format!("course-{}", builder.courses.len())
            } else {
                s
            }
        };
        let course_id = builder.course(CourseDraft {
            id,
            section_title: section_title_from_course(&title).to_string(),
            title_html: title.clone(),
            title,
            course_number: None,
            description_html: String::new(),
        });

        let data_start = a.value().attr("data-start").unwrap_or_default();
        builder.push_session(
            &course_id,
            &link,
            &[data_start, &start_text, &row_text],
            start_text.clone(),
            location,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use url::Url;

    fn ctx() -> ScrapeContext {
        ScrapeContext {
            base_url: Url::parse("https://coastalcprtraining.enrollware.com/").unwrap(),
            tz: chrono_tz::America::New_York,
            now: Utc.with_ymd_and_hms(2025, 12, 1, 12, 0, 0).unwrap(),
            source: "test.html".to_string(),
        }
    }

    const PANELS: &str = r##"
<html><body>
<div id="maincontent_sched"><div id="enraccordion">
  <h3 class="enrsection">Healthcare Provider: BLS</h3>
  <div class="enrpanel" id="enrpanel101">
    <div class="enrpanel-heading"><div class="enrpanel-title">
      <a class="enrtrigger" href="#"><b>AHA BLS Provider</b> - Wilmington</a>
    </div></div>
    <a name="ct209811"></a>
    <div class="enrpanel-body">
      <p>Hands-on BLS skills for healthcare providers.</p>
      <ul class="enrclass-list">
        <li><a href="enroll?id=5001">Monday, December 29, 2025 at 9:00 AM <span>NC - Wilmington, 4018 Shipyard Blvd</span></a></li>
        <li><a href="/enroll.aspx?id=5002&amp;ret=1">Monday, November 3, 2025 at 6:00 PM</a> Burgaw office</li>
        <li><a href="enroll?id=5001">Monday, December 29, 2025 at 9:00 AM</a></li>
      </ul>
    </div>
  </div>
  <h3>CPR / AED &amp; First Aid</h3>
  <div class="enrpanel" id="enrpanel202">
    <div class="enrpanel-heading"><div class="enrpanel-title">
      <a class="enrtrigger" href="#">Heartsaver First Aid CPR AED</a>
    </div></div>
    <div class="enrpanel-body">
      <ul class="enrclass-list">
        <li><button onclick="window.location='enroll?id=6001'">Register</button> Sat 1/10/2026 10:00 AM</li>
      </ul>
      <a href="schedule#ct300100">All dates</a>
    </div>
  </div>
  <div class="enrpanel" id="enrpanel303">
    <div class="enrpanel-body"><ul class="enrclass-list"><li><a href="enroll?id=7001">TBA</a></li></ul></div>
  </div>
</div></div>
</body></html>
"##;

    #[test]
    fn test_panels_become_courses_and_sessions() {
        let schedule = parse_snapshot(PANELS, &ctx());

        assert_eq!(schedule.meta.panel_count, 3);
        assert_eq!(schedule.sections.len(), 2);
        assert_eq!(schedule.sections[0].id, "bls");
        assert_eq!(schedule.sections[1].id, "faid");
        assert_eq!(schedule.sections[1].index, 1);

        // The untitled third panel is skipped.
        assert_eq!(schedule.courses.len(), 2);
        let bls = &schedule.courses[0];
        assert_eq!(bls.id, "ct209811");
        assert_eq!(bls.title, "AHA BLS Provider - Wilmington");
        assert_eq!(bls.title_html, "<b>AHA BLS Provider</b> - Wilmington");
        assert_eq!(bls.brand, Brand::Aha);
        assert_eq!(bls.family, ClassType::Bls);
        assert_eq!(bls.course_number.as_deref(), Some("209811"));
        assert_eq!(
            bls.schedule_url.as_deref(),
            Some("https://coastalcprtraining.enrollware.com/schedule#ct209811")
        );
        assert!(bls.description_html.contains("Hands-on BLS skills"));
        assert!(!bls.description_html.contains("enrclass-list"));

        let heartsaver = &schedule.courses[1];
        assert_eq!(heartsaver.id, "ct300100");
        assert_eq!(heartsaver.section_id, "faid");
        assert_eq!(heartsaver.family, ClassType::Heartsaver);
    }

    #[test]
    fn test_session_fields() {
        let schedule = parse_snapshot(PANELS, &ctx());
        assert_eq!(schedule.sessions.len(), 3);
        assert_eq!(schedule.meta.session_count, 3);

        let first = &schedule.sessions[0];
        assert_eq!(first.id, Some(5001));
        assert_eq!(first.course_id, "ct209811");
        assert_eq!(first.url, "https://coastalcprtraining.enrollware.com/enroll?id=5001");
        assert_eq!(first.start_text, "Monday, December 29, 2025 at 9:00 AM");
        assert_eq!(first.start_iso.as_deref(), Some("2025-12-29T09:00:00-05:00"));
        assert_eq!(first.is_past, Some(false));
        assert_eq!(first.location, "NC - Wilmington, 4018 Shipyard Blvd");

        let second = &schedule.sessions[1];
        assert_eq!(second.url, "https://coastalcprtraining.enrollware.com/enroll.aspx?id=5002");
        assert_eq!(second.is_past, Some(true));
        assert_eq!(second.location, "Burgaw");

        let onclick = &schedule.sessions[2];
        assert_eq!(onclick.id, Some(6001));
        assert_eq!(onclick.course_id, "ct300100");
        assert_eq!(onclick.start_iso.as_deref(), Some("2026-01-10T10:00:00-05:00"));
        assert_eq!(onclick.title, "Heartsaver First Aid CPR AED");

        assert!(schedule.integrity_errors().is_empty());
    }

    #[test]
    fn test_loose_links_fallback() {
        let html = r#"
<table>
  <tr><td>ARC Adult First Aid/CPR/AED</td><td><a href="https://coastalcprtraining.enrollware.com/enroll?id=8801">Tue Jan 13 9:00 AM</a></td><td>Jacksonville</td></tr>
  <tr><td><a title="PALS Provider" href="enroll?id=8802">2026-02-03T08:00</a></td></tr>
  <tr><td><a href="/other-page">Not a session</a></td></tr>
</table>"#;
        let schedule = parse_snapshot(html, &ctx());

        assert_eq!(schedule.meta.panel_count, 0);
        assert_eq!(schedule.sessions.len(), 2);
        assert_eq!(schedule.courses.len(), 2);

        let arc = &schedule.courses[0];
        assert_eq!(arc.title, "ARC Adult First Aid/CPR/AED Jacksonville");
        assert_eq!(arc.brand, Brand::RedCross);
        assert_eq!(schedule.sessions[0].location, "Jacksonville");
        assert_eq!(schedule.sessions[0].start_iso.as_deref(), Some("2026-01-13T09:00:00-05:00"));

        let pals = &schedule.courses[1];
        assert_eq!(pals.id, "pals-provider");
        assert_eq!(pals.section_id, "pals");
        assert_eq!(schedule.sessions[1].start_iso.as_deref(), Some("2026-02-03T08:00:00-05:00"));
        assert!(schedule.integrity_errors().is_empty());
    }

    #[test]
    fn test_loose_links_with_colliding_slugs_get_distinct_ids() {
        let html = r#"
<ul>
  <li><a title="BLS Provider" href="enroll?id=8901">2026-02-03T08:00</a></li>
  <li><a title="BLS-Provider" href="enroll?id=8902">2026-02-04T08:00</a></li>
</ul>"#;
        let schedule = parse_snapshot(html, &ctx());

        assert_eq!(schedule.courses.len(), 2);
        assert_eq!(schedule.courses[0].id, "bls-provider");
        assert_eq!(schedule.courses[1].id, "bls-provider-1");
        assert_eq!(schedule.sessions[1].course_id, "bls-provider-1");
        assert!(schedule.integrity_errors().is_empty());
    }

    #[test]
    fn test_empty_document() {
        let schedule = parse_snapshot("<html><body><p>Closed for the holidays</p></body></html>", &ctx());
        assert!(schedule.sessions.is_empty());
        assert!(schedule.courses.is_empty());
        assert_eq!(schedule.meta.fetched_at, "2025-12-01T12:00:00+00:00");
    }
}
