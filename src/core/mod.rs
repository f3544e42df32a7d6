pub mod etl;
pub mod files;

pub use crate::domain::model::{Course, Schedule, Section, Session};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
