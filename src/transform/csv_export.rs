use crate::domain::model::Schedule;
use crate::utils::error::{Result, SiteError};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SessionRow<'a> {
    id: Option<u64>,
    course_id: &'a str,
    title: &'a str,
    start_iso: Option<&'a str>,
    location: &'a str,
    register_url: &'a str,
    price: Option<&'a str>,
}

/// One CSV row per session, in schedule order.
pub fn sessions_csv(schedule: &Schedule) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for s in &schedule.sessions {
        writer.serialize(SessionRow {
            id: s.id,
            course_id: &s.course_id,
            title: &s.title,
            start_iso: s.start_iso.as_deref(),
            location: &s.location,
            register_url: s.register_url(),
            price: s.price.as_deref(),
        })?;
    }
    writer.into_inner().map_err(|e| SiteError::ProcessingError {
        message: format!("Failed to finish sessions CSV: {}", e),
    })
}
