//! Overdue-task scanner: one reminder per pending task past its due time.

use super::batch::{run_batch, ItemOutcome};
use crate::notify::Notifier;
use chrono::{DateTime, Utc};
use kaizen_core::{error::KaizenError, model::OverdueTask};
use kaizen_store::Store;
use serde::Serialize;
use tracing::{info, warn};

/// Per-task delivery result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResult {
    pub task_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ItemOutcome<()>> for EmailResult {
    fn from(outcome: ItemOutcome<()>) -> Self {
        let success = outcome.is_ok();
        Self {
            task_id: outcome.key,
            success,
            error: outcome.result.err().map(|e| e.to_string()),
        }
    }
}

/// Response body of a scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueSummary {
    pub success: bool,
    pub overdue_tasks_count: usize,
    pub email_results: Vec<EmailResult>,
}

async fn remind(notifier: &Notifier, task: OverdueTask) -> ItemOutcome<()> {
    let result = match task.reminder_request() {
        Ok(req) => notifier.send_reminder(&req).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(ref e) = result {
        warn!("overdue: reminder for task {} not sent: {e}", task.task_id);
    }
    ItemOutcome {
        key: task.task_id,
        result,
    }
}

/// Scan for overdue tasks as of `now` and send each owner a reminder.
///
/// Fails only when the initial query fails; individual send failures are
/// reported in `email_results`.
pub async fn check_overdue_tasks(
    store: &Store,
    notifier: &Notifier,
    concurrency: usize,
    now: DateTime<Utc>,
) -> Result<OverdueSummary, KaizenError> {
    let tasks = store.overdue_tasks(now).await?;
    let count = tasks.len();
    info!("overdue: found {count} overdue tasks");

    let outcomes = run_batch(tasks, concurrency, |task| remind(notifier, task)).await;
    let email_results: Vec<EmailResult> = outcomes.into_iter().map(EmailResult::from).collect();

    let sent = email_results.iter().filter(|r| r.success).count();
    info!("overdue: {sent}/{count} reminders sent");

    Ok(OverdueSummary {
        success: true,
        overdue_tasks_count: count,
        email_results,
    })
}
