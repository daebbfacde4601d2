//! # kaizen-mailer
//!
//! HTML email templates and the transactional email providers that deliver them.

pub mod resend;
pub mod templates;

pub use resend::ResendMailer;
