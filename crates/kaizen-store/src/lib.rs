//! # kaizen-store
//!
//! Data access for the notification core (SQLite-backed).

pub mod store;

pub use store::Store;
