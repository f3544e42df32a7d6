//! Files derived from `schedule.json`.

pub mod courses;
pub mod csv_export;
pub mod descriptions;
pub mod legacy;
pub mod prices;
pub mod status;
