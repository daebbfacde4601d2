//! Resend transactional email provider.
//!
//! One `POST /emails` per message. No retries here: the scheduled trigger is
//! the only retry mechanism.

use async_trait::async_trait;
use kaizen_core::{
    config::MailerConfig, error::KaizenError, message::OutgoingEmail, traits::Mailer,
    validate::mask_email,
};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Resend API client.
pub struct ResendMailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Request body for `POST /emails`.
#[derive(Serialize)]
pub(crate) struct SendEmailRequest<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    pub subject: &'a str,
    pub html: &'a str,
}

impl<'a> From<&'a OutgoingEmail> for SendEmailRequest<'a> {
    fn from(email: &'a OutgoingEmail) -> Self {
        Self {
            from: &email.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        }
    }
}

impl ResendMailer {
    /// Create from config values. The HTTP client enforces `timeout_secs` per call.
    pub fn from_config(config: &MailerConfig) -> Result<Self, KaizenError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KaizenError::Config(format!("resend: failed to build client: {e}")))?;

        if config.api_key.is_empty() {
            warn!("resend: no API key configured, every send will be rejected upstream");
        }

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn name(&self) -> &str {
        "resend"
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Value, KaizenError> {
        let url = self.endpoint();
        let recipients: Vec<String> = email.to.iter().map(|t| mask_email(t)).collect();
        debug!("resend: POST {url} to={recipients:?}");
        let start = Instant::now();

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&SendEmailRequest::from(email))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KaizenError::Timeout(format!("resend request: {e}"))
                } else {
                    KaizenError::Mailer(format!("resend request failed: {e}"))
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(KaizenError::Mailer(format!(
                "resend returned {status}: {text}"
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| KaizenError::Mailer(format!("resend: failed to parse response: {e}")))?;

        let id = body.get("id").and_then(Value::as_str).unwrap_or("?");
        debug!(
            "resend: accepted in {}ms id={id}",
            start.elapsed().as_millis()
        );
        Ok(body)
    }
}
