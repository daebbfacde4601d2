//! Scheduled jobs, invoked by an external trigger (HTTP or CLI).

pub mod batch;
pub mod overdue;
pub mod reports;

pub use overdue::check_overdue_tasks;
pub use reports::check_report_due;
