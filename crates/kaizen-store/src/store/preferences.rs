//! Notification preference reads and the report-sent stamp.

use super::{from_db_time_opt, to_db_time, Store};
use chrono::{DateTime, Utc};
use kaizen_core::error::KaizenError;
use kaizen_core::model::{NotificationPreference, ReportFrequency};
use tracing::debug;

/// (user_id, email, enabled, nudge_hours_after, report_frequency, last_report_sent_at)
type PreferenceRow = (String, Option<String>, bool, i64, String, Option<String>);

const PREFERENCE_COLUMNS: &str = "user_id, notification_email, email_notifications_enabled, \
     nudge_hours_after, report_frequency, last_report_sent_at";

fn preference_from_row(row: PreferenceRow) -> Result<NotificationPreference, KaizenError> {
    let (user_id, notification_email, enabled, nudge_hours_after, frequency, last_sent) = row;
    Ok(NotificationPreference {
        user_id,
        notification_email,
        email_notifications_enabled: enabled,
        nudge_hours_after,
        report_frequency: frequency.parse()?,
        last_report_sent_at: from_db_time_opt(last_sent)?,
    })
}

impl Store {
    /// Insert or update a user's preferences (keyed on `user_id`).
    pub async fn upsert_preference(
        &self,
        pref: &NotificationPreference,
    ) -> Result<(), KaizenError> {
        self.bounded("upsert preference", async {
            sqlx::query(
                "INSERT INTO notification_preferences \
                 (user_id, notification_email, email_notifications_enabled, nudge_hours_after, \
                  report_frequency, last_report_sent_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(user_id) DO UPDATE SET \
                   notification_email = excluded.notification_email, \
                   email_notifications_enabled = excluded.email_notifications_enabled, \
                   nudge_hours_after = excluded.nudge_hours_after, \
                   report_frequency = excluded.report_frequency, \
                   last_report_sent_at = excluded.last_report_sent_at, \
                   updated_at = excluded.updated_at",
            )
            .bind(&pref.user_id)
            .bind(&pref.notification_email)
            .bind(pref.email_notifications_enabled)
            .bind(pref.nudge_hours_after)
            .bind(pref.report_frequency.as_str())
            .bind(pref.last_report_sent_at.map(to_db_time))
            .bind(to_db_time(Utc::now()))
            .execute(&self.pool)
            .await
            .map_err(|e| KaizenError::Store(format!("upsert preference failed: {e}")))?;
            Ok(())
        })
        .await
    }

    /// Load one user's preferences.
    pub async fn get_preference(
        &self,
        user_id: &str,
    ) -> Result<Option<NotificationPreference>, KaizenError> {
        let sql =
            format!("SELECT {PREFERENCE_COLUMNS} FROM notification_preferences WHERE user_id = ?");
        let row: Option<PreferenceRow> = self
            .bounded("get preference", async {
                sqlx::query_as(&sql)
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| KaizenError::Store(format!("get preference failed: {e}")))
            })
            .await?;

        row.map(preference_from_row).transpose()
    }

    /// Users with email notifications on, a report cadence, and an address.
    pub async fn report_subscribers(&self) -> Result<Vec<NotificationPreference>, KaizenError> {
        let sql = format!(
            "SELECT {PREFERENCE_COLUMNS} FROM notification_preferences \
             WHERE email_notifications_enabled = 1 \
               AND report_frequency != ? \
               AND notification_email IS NOT NULL \
               AND trim(notification_email) != '' \
             ORDER BY user_id ASC"
        );
        let rows: Vec<PreferenceRow> = self
            .bounded("report subscribers", async {
                sqlx::query_as(&sql)
                    .bind(ReportFrequency::None.as_str())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| KaizenError::Store(format!("get report subscribers failed: {e}")))
            })
            .await?;

        rows.into_iter().map(preference_from_row).collect()
    }

    /// Stamp `last_report_sent_at = now`, but only if it still holds
    /// `previous` (the value read before sending).
    ///
    /// Returns `false` when another run advanced the stamp first.
    pub async fn stamp_report_sent(
        &self,
        user_id: &str,
        previous: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, KaizenError> {
        let result = self
            .bounded("stamp report", async {
                sqlx::query(
                    "UPDATE notification_preferences \
                     SET last_report_sent_at = ?, updated_at = ? \
                     WHERE user_id = ? AND last_report_sent_at IS ?",
                )
                .bind(to_db_time(now))
                .bind(to_db_time(now))
                .bind(user_id)
                .bind(previous.map(to_db_time))
                .execute(&self.pool)
                .await
                .map_err(|e| KaizenError::Store(format!("stamp report failed: {e}")))
            })
            .await?;

        let stamped = result.rows_affected() == 1;
        debug!("store: stamp report for {user_id}: {stamped}");
        Ok(stamped)
    }
}
