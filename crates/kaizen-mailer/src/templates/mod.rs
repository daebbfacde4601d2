//! HTML email bodies.
//!
//! Templates only accept validated content (`kaizen_core::message`), whose
//! free text is already escaped. The app URL comes from config and is escaped
//! here before it lands in an `href`.

mod reminder;
mod report;

pub use reminder::{render_reminder, REMINDER_SUBJECT};
pub use report::{render_report, report_mood, ReportMood};

use kaizen_core::validate::escape_html;

/// Escaped base URL with any trailing slash removed.
fn link_base(app_url: &str) -> String {
    escape_html(app_url.trim_end_matches('/'))
}
