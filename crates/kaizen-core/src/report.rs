//! Report-card eligibility and metric aggregation.
//!
//! Pure functions over store records; the due-checker job feeds them rows and
//! a single `now` so a run is evaluated against one consistent instant.

use chrono::{DateTime, Datelike, Duration, Months, Utc, Weekday};

use crate::model::{NotificationPreference, ReportPeriod, ReportRequest, Task, TaskStatus};

/// Minimum gap between two weekly reports (6 days).
pub const WEEKLY_COOLDOWN_HOURS: i64 = 144;
/// Minimum gap between two monthly reports (25 days).
pub const MONTHLY_COOLDOWN_HOURS: i64 = 600;

pub const INSIGHT_EXCELLENT: &str =
    "Amazing! You're completing most of your tasks. Keep this momentum going!";
pub const INSIGHT_GOOD: &str = "Good progress! Try breaking larger tasks into smaller milestones.";
pub const INSIGHT_LOW: &str = "Consider starting with your highest-energy tasks first.";
pub const INSIGHT_EMPTY: &str = "Start completing tasks to see personalized insights!";

/// Outcome of checking one preference row against the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Due(ReportPeriod),
    /// Reports are off or the row has no usable address.
    Disabled,
    /// Not Monday (weekly) or not the 1st (monthly).
    NotToday,
    /// A report went out too recently.
    CoolingDown { hours_since: i64 },
}

fn cooldown(period: ReportPeriod) -> Duration {
    match period {
        ReportPeriod::Weekly => Duration::hours(WEEKLY_COOLDOWN_HOURS),
        ReportPeriod::Monthly => Duration::hours(MONTHLY_COOLDOWN_HOURS),
    }
}

/// Decide whether `pref` should receive a report at `now` (UTC calendar).
pub fn eligibility(pref: &NotificationPreference, now: DateTime<Utc>) -> Eligibility {
    let has_email = pref
        .notification_email
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty());
    let period = match pref.report_frequency.period() {
        Some(p) if pref.email_notifications_enabled && has_email => p,
        _ => return Eligibility::Disabled,
    };

    let scheduled_today = match period {
        ReportPeriod::Weekly => now.weekday() == Weekday::Mon,
        ReportPeriod::Monthly => now.day() == 1,
    };
    if !scheduled_today {
        return Eligibility::NotToday;
    }

    if let Some(last) = pref.last_report_sent_at {
        let since = now - last;
        if since < cooldown(period) {
            return Eligibility::CoolingDown {
                hours_since: since.num_hours(),
            };
        }
    }

    Eligibility::Due(period)
}

/// Start of the aggregation window: `now - 7d` for weekly, 00:00 UTC on the
/// 1st of the previous month for monthly.
pub fn window_start(period: ReportPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        ReportPeriod::Weekly => now - Duration::days(7),
        ReportPeriod::Monthly => now
            .date_naive()
            .with_day(1)
            .and_then(|first| first.checked_sub_months(Months::new(1)))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .unwrap_or_else(|| now - Duration::days(31)),
    }
}

/// `round(100 * completed / total)`, or 0 when there are no tasks.
pub fn completion_rate(completed: usize, total: usize) -> i64 {
    if total == 0 {
        return 0;
    }
    // Integer form of round-half-up.
    ((200 * completed + total) / (2 * total)) as i64
}

/// Pick the headline insight for a completion rate.
pub fn top_insight(rate: i64) -> &'static str {
    if rate >= 80 {
        INSIGHT_EXCELLENT
    } else if rate >= 50 {
        INSIGHT_GOOD
    } else if rate > 0 {
        INSIGHT_LOW
    } else {
        INSIGHT_EMPTY
    }
}

/// Aggregates over one user's tasks in a report window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetrics {
    pub completed_tasks: i64,
    pub total_tasks: i64,
    pub xp_earned: i64,
    pub xp_missed: i64,
    pub focus_minutes: i64,
    /// Focus sessions are tracked on-device only, so this is always 0 here.
    pub interrupted_sessions: i64,
    pub completion_rate: i64,
    pub top_insight: &'static str,
}

impl ReportMetrics {
    /// Aggregate `tasks` (already filtered to the window) as of `now`.
    pub fn from_tasks(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let completed: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .collect();
        let abandoned = tasks.iter().filter(|t| t.is_overdue(now));

        let rate = completion_rate(completed.len(), tasks.len());
        Self {
            completed_tasks: completed.len() as i64,
            total_tasks: tasks.len() as i64,
            xp_earned: completed.iter().map(|t| t.xp).sum(),
            xp_missed: abandoned.map(|t| t.xp).sum(),
            focus_minutes: completed.iter().map(|t| t.estimated_time).sum(),
            interrupted_sessions: 0,
            completion_rate: rate,
            top_insight: top_insight(rate),
        }
    }

    /// Build the report sender payload.
    pub fn to_request(&self, email: &str, period: ReportPeriod) -> ReportRequest {
        ReportRequest {
            user_email: email.to_string(),
            report_type: period.as_str().to_string(),
            completed_tasks: self.completed_tasks,
            total_tasks: self.total_tasks,
            xp_earned: self.xp_earned,
            xp_missed: self.xp_missed,
            focus_minutes: self.focus_minutes,
            interrupted_sessions: self.interrupted_sessions,
            completion_rate: self.completion_rate,
            top_insight: self.top_insight.to_string(),
        }
    }
}
