//! Boundary validation for sender payloads.
//!
//! Every free-text field that ends up inside an email is HTML-escaped here,
//! and every number is clamped into a range the templates can render sanely.
//! Templates never see a raw request.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::KaizenError;
use crate::message::{ReminderContent, ReportContent};
use crate::model::{ReminderRequest, ReportPeriod, ReportRequest};

pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MAX_INSIGHT_LEN: usize = 500;

pub const TASK_XP_RANGE: (i64, i64) = (0, 1000);
pub const TASK_MINUTES_RANGE: (i64, i64) = (1, 480);
pub const REPORT_COUNT_RANGE: (i64, i64) = (0, 10_000);
pub const REPORT_XP_RANGE: (i64, i64) = (0, 1_000_000);
pub const REPORT_MINUTES_RANGE: (i64, i64) = (0, 100_000);
pub const PERCENT_RANGE: (i64, i64) = (0, 100);

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

/// Conservative email shape check: `local@domain.tld`, no whitespace, ≤255 chars.
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

/// Escape `& < > " '` so user text cannot inject markup.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn clamp(value: i64, (lo, hi): (i64, i64)) -> i64 {
    value.clamp(lo, hi)
}

/// Mask the local part of an address for logs: `alice@x.io` → `a***@x.io`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

fn check_email(email: &str) -> Result<String, KaizenError> {
    if !is_valid_email(email) {
        return Err(KaizenError::Validation("Invalid email address".to_string()));
    }
    Ok(email.to_string())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), KaizenError> {
    if value.chars().count() > max {
        return Err(KaizenError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate and sanitize a reminder request.
pub fn validate_reminder(req: &ReminderRequest) -> Result<ReminderContent, KaizenError> {
    let recipient = check_email(&req.user_email)?;

    let title = req.task_title.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() {
        return Err(KaizenError::Validation("taskTitle is required".to_string()));
    }
    check_len("taskTitle", title, MAX_TITLE_LEN)?;

    let description = match req.task_description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => {
            check_len("taskDescription", d, MAX_DESCRIPTION_LEN)?;
            Some(escape_html(d))
        }
        _ => None,
    };

    Ok(ReminderContent {
        recipient,
        title: escape_html(title),
        description,
        xp: clamp(req.xp, TASK_XP_RANGE),
        minutes: clamp(req.estimated_time, TASK_MINUTES_RANGE),
    })
}

/// Validate and sanitize a report request.
pub fn validate_report(req: &ReportRequest) -> Result<ReportContent, KaizenError> {
    let recipient = check_email(&req.user_email)?;

    let period = match req.report_type.as_str() {
        "weekly" => ReportPeriod::Weekly,
        "monthly" => ReportPeriod::Monthly,
        _ => {
            return Err(KaizenError::Validation(
                "reportType must be 'weekly' or 'monthly'".to_string(),
            ))
        }
    };

    let insight = req.top_insight.trim();
    check_len("topInsight", insight, MAX_INSIGHT_LEN)?;

    let total_tasks = clamp(req.total_tasks, REPORT_COUNT_RANGE);
    Ok(ReportContent {
        recipient,
        period,
        completed_tasks: clamp(req.completed_tasks, REPORT_COUNT_RANGE).min(total_tasks),
        total_tasks,
        xp_earned: clamp(req.xp_earned, REPORT_XP_RANGE),
        xp_missed: clamp(req.xp_missed, REPORT_XP_RANGE),
        focus_minutes: clamp(req.focus_minutes, REPORT_MINUTES_RANGE),
        interrupted_sessions: clamp(req.interrupted_sessions, REPORT_COUNT_RANGE),
        completion_rate: clamp(req.completion_rate, PERCENT_RANGE),
        top_insight: escape_html(insight),
    })
}
