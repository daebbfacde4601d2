//! The two email senders: validate, render, deliver.
//!
//! Used both by the HTTP sender endpoints and in-process by the scheduled
//! jobs, so every path through here gets the same validation and escaping.

use kaizen_core::{
    config::MailerConfig,
    error::KaizenError,
    model::{ReminderRequest, ReportRequest},
    traits::Mailer,
    validate::{mask_email, validate_reminder, validate_report},
};
use kaizen_mailer::templates::{render_reminder, render_report};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Sends reminder and report emails through a [`Mailer`].
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    app_url: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, config: &MailerConfig) -> Self {
        Self {
            mailer,
            from: config.from.clone(),
            app_url: config.app_url.clone(),
        }
    }

    pub fn mailer_name(&self) -> &str {
        self.mailer.name()
    }

    /// Send an overdue-task reminder. One provider call on success, none on
    /// a validation error.
    pub async fn send_reminder(&self, req: &ReminderRequest) -> Result<Value, KaizenError> {
        let content = validate_reminder(req)?;
        let email = render_reminder(&content, &self.from, &self.app_url);
        let to = mask_email(&content.recipient);

        info!("notify: sending task reminder to {to}");
        match self.mailer.send(&email).await {
            Ok(resp) => {
                info!("notify: reminder delivered to {to}");
                Ok(resp)
            }
            Err(e) => {
                error!("notify: reminder to {to} failed: {e}");
                Err(e)
            }
        }
    }

    /// Send a weekly or monthly report card.
    pub async fn send_report(&self, req: &ReportRequest) -> Result<Value, KaizenError> {
        let content = validate_report(req)?;
        let email = render_report(&content, &self.from, &self.app_url);
        let to = mask_email(&content.recipient);

        info!("notify: sending {} report to {to}", content.period);
        match self.mailer.send(&email).await {
            Ok(resp) => {
                info!("notify: {} report delivered to {to}", content.period);
                Ok(resp)
            }
            Err(e) => {
                error!("notify: {} report to {to} failed: {e}", content.period);
                Err(e)
            }
        }
    }
}
