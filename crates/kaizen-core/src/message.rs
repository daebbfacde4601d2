use serde::{Deserialize, Serialize};

use crate::model::ReportPeriod;

/// A rendered email ready for the delivery provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Reminder fields after validation. Text is already HTML-escaped and
/// numbers are clamped, so templates can interpolate them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderContent {
    pub recipient: String,
    pub title: String,
    pub description: Option<String>,
    pub xp: i64,
    pub minutes: i64,
}

/// Report card fields after validation (escaped and clamped).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub recipient: String,
    pub period: ReportPeriod,
    pub completed_tasks: i64,
    pub total_tasks: i64,
    pub xp_earned: i64,
    pub xp_missed: i64,
    pub focus_minutes: i64,
    pub interrupted_sessions: i64,
    pub completion_rate: i64,
    pub top_insight: String,
}
