//! Shared fixtures for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use kaizen_core::{
    config::{MailerConfig, StoreConfig},
    error::KaizenError,
    message::OutgoingEmail,
    model::{NotificationPreference, ReportFrequency, Task, TaskStatus},
    traits::Mailer,
};
use kaizen_store::Store;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::notify::Notifier;

/// Mailer that records every email and fails for chosen recipients.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_for: Vec<String>,
}

impl RecordingMailer {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Value, KaizenError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        if email.to.iter().any(|t| self.fail_for.contains(t)) {
            return Err(KaizenError::Mailer("provider rejected message".into()));
        }
        Ok(json!({ "id": format!("msg-{}", sent.len()) }))
    }
}

pub fn notifier(mailer: Arc<RecordingMailer>) -> Notifier {
    Notifier::new(mailer, &MailerConfig::default())
}

pub async fn memory_store() -> Store {
    Store::new(&StoreConfig {
        db_path: ":memory:".to_string(),
        query_timeout_secs: 5,
    })
    .await
    .unwrap()
}

pub fn task(
    id: &str,
    user: &str,
    status: TaskStatus,
    xp: i64,
    due_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
) -> Task {
    Task {
        id: id.to_string(),
        user_id: user.to_string(),
        title: format!("Task {id}"),
        description: None,
        status,
        estimated_time: 30,
        xp,
        due_at,
        created_at,
    }
}

/// A pending task due at `due_at`, created a day earlier.
pub fn pending(id: &str, user: &str, due_at: DateTime<Utc>) -> Task {
    let created_at = due_at - Duration::days(1);
    task(id, user, TaskStatus::Pending, 10, Some(due_at), created_at)
}

pub fn preference(
    user: &str,
    email: &str,
    frequency: ReportFrequency,
    last_sent: Option<DateTime<Utc>>,
) -> NotificationPreference {
    NotificationPreference {
        user_id: user.to_string(),
        notification_email: Some(email.to_string()),
        email_notifications_enabled: true,
        nudge_hours_after: 24,
        report_frequency: frequency,
        last_report_sent_at: last_sent,
    }
}
