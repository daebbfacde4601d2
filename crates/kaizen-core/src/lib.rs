//! # kaizen-core
//!
//! Core types, traits, configuration, validation, and error handling shared by
//! the notification service crates.

pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod report;
pub mod traits;
pub mod validate;

pub use config::shellexpand;
