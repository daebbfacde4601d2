//! Task queries: the overdue scan and per-user report windows.

use super::{from_db_time, from_db_time_opt, to_db_time, Store};
use chrono::{DateTime, Utc};
use kaizen_core::error::KaizenError;
use kaizen_core::model::{OverdueTask, Task, TaskStatus};

/// (id, user_id, title, description, status, estimated_time, xp, due_at, created_at)
type TaskRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    i64,
    i64,
    Option<String>,
    String,
);

/// (id, user_id, title, description, xp, estimated_time, due_at, email, enabled)
type OverdueRow = (
    String,
    String,
    String,
    Option<String>,
    i64,
    i64,
    String,
    Option<String>,
    bool,
);

fn overdue_from_row(row: OverdueRow) -> Result<OverdueTask, KaizenError> {
    let (task_id, user_id, title, description, xp, estimated_time, due_at, email, enabled) = row;
    Ok(OverdueTask {
        task_id,
        user_id,
        title,
        description,
        xp,
        estimated_time,
        due_at: from_db_time(&due_at)?,
        user_email: email,
        notifications_enabled: enabled,
    })
}

fn task_from_row(row: TaskRow) -> Result<Task, KaizenError> {
    let (id, user_id, title, description, status, estimated_time, xp, due_at, created_at) = row;
    Ok(Task {
        id,
        user_id,
        title,
        description,
        status: status.parse()?,
        estimated_time,
        xp,
        due_at: from_db_time_opt(due_at)?,
        created_at: from_db_time(&created_at)?,
    })
}

impl Store {
    /// Insert or replace a task row.
    pub async fn insert_task(&self, task: &Task) -> Result<(), KaizenError> {
        self.bounded("insert task", async {
            sqlx::query(
                "INSERT OR REPLACE INTO tasks \
                 (id, user_id, title, description, status, estimated_time, xp, due_at, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&task.id)
            .bind(&task.user_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.estimated_time)
            .bind(task.xp)
            .bind(task.due_at.map(to_db_time))
            .bind(to_db_time(task.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| KaizenError::Store(format!("insert task failed: {e}")))?;
            Ok(())
        })
        .await
    }

    /// Every pending task whose due time is before `now`, joined with the
    /// owner's notification settings. Oldest due first.
    ///
    /// Tasks whose owner has no preference row are still returned (with no
    /// email), so the caller sees the complete overdue set.
    pub async fn overdue_tasks(&self, now: DateTime<Utc>) -> Result<Vec<OverdueTask>, KaizenError> {
        let rows: Vec<OverdueRow> = self
            .bounded("overdue scan", async {
                sqlx::query_as(
                    "SELECT t.id, t.user_id, t.title, t.description, t.xp, t.estimated_time, \
                            t.due_at, p.notification_email, \
                            COALESCE(p.email_notifications_enabled, 0) \
                     FROM tasks t \
                     LEFT JOIN notification_preferences p ON p.user_id = t.user_id \
                     WHERE t.status = ? AND t.due_at IS NOT NULL AND t.due_at < ? \
                     ORDER BY t.due_at ASC, t.id ASC",
                )
                .bind(TaskStatus::Pending.as_str())
                .bind(to_db_time(now))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| KaizenError::Store(format!("get overdue tasks failed: {e}")))
            })
            .await?;

        rows.into_iter().map(overdue_from_row).collect()
    }

    /// A user's tasks created at or after `since`.
    pub async fn tasks_created_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Task>, KaizenError> {
        let rows: Vec<TaskRow> = self
            .bounded("report window", async {
                sqlx::query_as(
                    "SELECT id, user_id, title, description, status, estimated_time, xp, \
                            due_at, created_at \
                     FROM tasks \
                     WHERE user_id = ? AND created_at >= ? \
                     ORDER BY created_at ASC",
                )
                .bind(user_id)
                .bind(to_db_time(since))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| KaizenError::Store(format!("get tasks for {user_id} failed: {e}")))
            })
            .await?;

        rows.into_iter().map(task_from_row).collect()
    }
}
