//! Storage abstraction for daylog.
//!
//! This module defines the `RecordBackend` trait, the two backends that
//! implement it, and the [`Store`] facade everything else goes through.
//!
//! ## Architecture
//!
//! - `sqlite`: the primary embedded store, one table keyed by date
//! - `fallback`: the degraded whole-blob JSON store
//! - `store`: the dual-mode facade with open retry and one-way downgrade
//!
//! Callers never pick a backend; they open a [`Store`] and let the
//! downgrade policy decide.

pub mod fallback;
pub mod sqlite;
pub mod store;
pub mod traits;

// Re-export public types
pub use fallback::JsonFileBackend;
pub use sqlite::SqliteBackend;
pub use store::{Store, StoreConfig, StoreMode};
pub use traits::RecordBackend;
