use crate::{error::KaizenError, message::OutgoingEmail};
use async_trait::async_trait;
use serde_json::Value;

/// Email delivery provider.
///
/// The production implementation talks to a transactional email API; tests
/// substitute a recording fake.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Deliver one email. Returns the provider's response body verbatim.
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, KaizenError>;
}
