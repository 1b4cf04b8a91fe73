//! Data models for the catalog
//!
//! `*Row` types map database rows, the plain types are the views handed to
//! callers, and `*Input` types carry admin write requests.

mod admin;
mod catalog;

pub use admin::*;
pub use catalog::*;

use chrono::{DateTime, Utc};

/// Dates leave the crate as `DD.MM.YYYY`
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format(DATE_FORMAT).to_string()
}
