//! Records owned by the data store and the request bodies the senders accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KaizenError;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = KaizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(KaizenError::Store(format!("unknown task status '{other}'"))),
        }
    }
}

/// A user-authored task. Read-only from the notification core's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Estimated focus time in minutes.
    pub estimated_time: i64,
    pub xp: i64,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Pending with a due time strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.due_at.is_some_and(|due| due < now)
    }
}

/// How often a user wants a report card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Weekly,
    Monthly,
    None,
}

impl ReportFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::None => "none",
        }
    }

    /// The report period this frequency produces, if any.
    pub fn period(&self) -> Option<ReportPeriod> {
        match self {
            Self::Weekly => Some(ReportPeriod::Weekly),
            Self::Monthly => Some(ReportPeriod::Monthly),
            Self::None => None,
        }
    }
}

impl FromStr for ReportFrequency {
    type Err = KaizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "none" => Ok(Self::None),
            other => Err(KaizenError::Store(format!(
                "unknown report frequency '{other}'"
            ))),
        }
    }
}

/// Per-user notification settings. One row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub user_id: String,
    pub notification_email: Option<String>,
    pub email_notifications_enabled: bool,
    /// Stored for the client; the overdue scan does not read it.
    pub nudge_hours_after: i64,
    pub report_frequency: ReportFrequency,
    pub last_report_sent_at: Option<DateTime<Utc>>,
}

/// An overdue task joined with its owner's notification settings.
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueTask {
    pub task_id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub xp: i64,
    pub estimated_time: i64,
    pub due_at: DateTime<Utc>,
    pub user_email: Option<String>,
    pub notifications_enabled: bool,
}

impl OverdueTask {
    /// Build the reminder payload for this task, if the owner can be emailed.
    pub fn reminder_request(&self) -> Result<ReminderRequest, KaizenError> {
        let email = self.user_email.as_deref().unwrap_or("").trim();
        if email.is_empty() {
            return Err(KaizenError::Validation(
                "no notification email on file for task owner".to_string(),
            ));
        }
        if !self.notifications_enabled {
            return Err(KaizenError::Validation(
                "email notifications disabled for task owner".to_string(),
            ));
        }
        Ok(ReminderRequest {
            user_email: email.to_string(),
            task_title: Some(self.title.clone()),
            task_description: self.description.clone(),
            xp: self.xp,
            estimated_time: self.estimated_time,
        })
    }
}

/// Period covered by a report card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Capitalized label used in subjects ("Weekly", "Monthly").
    pub fn title(&self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `send-task-reminder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReminderRequest {
    pub user_email: String,
    #[serde(default)]
    pub task_title: Option<String>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub xp: i64,
    #[serde(default)]
    pub estimated_time: i64,
}

/// Body of `send-report-email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReportRequest {
    pub user_email: String,
    pub report_type: String,
    #[serde(default)]
    pub completed_tasks: i64,
    #[serde(default)]
    pub total_tasks: i64,
    #[serde(default)]
    pub xp_earned: i64,
    #[serde(default)]
    pub xp_missed: i64,
    #[serde(default)]
    pub focus_minutes: i64,
    #[serde(default)]
    pub interrupted_sessions: i64,
    #[serde(default)]
    pub completion_rate: i64,
    #[serde(default)]
    pub top_insight: String,
}
