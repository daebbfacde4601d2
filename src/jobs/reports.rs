//! Report due-checker: weekly and monthly report cards.

use super::batch::{run_batch, ItemOutcome};
use crate::notify::Notifier;
use chrono::{DateTime, Utc};
use kaizen_core::{
    error::KaizenError,
    model::NotificationPreference,
    report::{eligibility, window_start, Eligibility, ReportMetrics},
};
use kaizen_store::Store;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Response body of a due-check run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub success: bool,
    pub message: String,
    pub users_checked: usize,
    pub reports_sent: usize,
}

/// What happened for one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Sent,
    Skipped,
    /// Delivered, but the row was not stamped: another run stamped it
    /// first or the stamp write failed.
    SentUnstamped,
}

impl ReportOutcome {
    /// Whether an email went out, stamped or not.
    pub fn delivered(self) -> bool {
        matches!(self, Self::Sent | Self::SentUnstamped)
    }
}

async fn process(
    store: &Store,
    notifier: &Notifier,
    pref: &NotificationPreference,
    now: DateTime<Utc>,
) -> Result<ReportOutcome, KaizenError> {
    let period = match eligibility(pref, now) {
        Eligibility::Due(period) => period,
        other => {
            debug!("reports: skipping {}: {other:?}", pref.user_id);
            return Ok(ReportOutcome::Skipped);
        }
    };
    let Some(email) = pref.notification_email.as_deref() else {
        return Ok(ReportOutcome::Skipped);
    };

    let tasks = store
        .tasks_created_since(&pref.user_id, window_start(period, now))
        .await?;
    let metrics = ReportMetrics::from_tasks(&tasks, now);
    debug!(
        "reports: {} {period} metrics: {}/{} done, rate {}%",
        pref.user_id, metrics.completed_tasks, metrics.total_tasks, metrics.completion_rate
    );

    notifier
        .send_report(&metrics.to_request(email.trim(), period))
        .await?;

    match store
        .stamp_report_sent(&pref.user_id, pref.last_report_sent_at, now)
        .await
    {
        Ok(true) => Ok(ReportOutcome::Sent),
        Ok(false) => {
            warn!(
                "reports: {} report for {} sent but another run stamped it first",
                period, pref.user_id
            );
            Ok(ReportOutcome::SentUnstamped)
        }
        Err(e) => {
            warn!(
                "reports: {} report for {} sent but stamp failed: {e}",
                period, pref.user_id
            );
            Ok(ReportOutcome::SentUnstamped)
        }
    }
}

/// Check every subscriber at `now` and send the reports that are due.
///
/// Fails only when the subscriber query fails; per-user errors are logged
/// and leave that user unstamped so the next run can try again. Every
/// delivered report counts toward `reports_sent`, stamped or not.
pub async fn check_report_due(
    store: &Store,
    notifier: &Notifier,
    concurrency: usize,
    now: DateTime<Utc>,
) -> Result<ReportSummary, KaizenError> {
    let subscribers = store.report_subscribers().await?;
    let users_checked = subscribers.len();
    info!("reports: checking {users_checked} subscribers");

    let outcomes = run_batch(subscribers, concurrency, |pref| async move {
        let result = process(store, notifier, &pref, now).await;
        if let Err(ref e) = result {
            error!("reports: failed for user {}: {e}", pref.user_id);
        }
        ItemOutcome {
            key: pref.user_id,
            result,
        }
    })
    .await;

    let reports_sent = outcomes
        .iter()
        .filter(|o| matches!(o.result, Ok(outcome) if outcome.delivered()))
        .count();
    info!("reports: checked {users_checked} users, sent {reports_sent} reports");

    Ok(ReportSummary {
        success: true,
        message: format!("Checked {users_checked} users, sent {reports_sent} reports"),
        users_checked,
        reports_sent,
    })
}
