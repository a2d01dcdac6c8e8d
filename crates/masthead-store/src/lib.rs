//! `masthead-store` — SQLite persistence for posts and subscribers.
//!
//! A [`Store`] wraps one `rusqlite::Connection` behind a `Mutex`; the server
//! and the background publisher each open their own connection against the
//! same database file (WAL mode makes that safe). All timestamps are stored
//! as RFC3339 TEXT, which compares correctly both in SQL and lexicographic
//! order.

pub mod db;
pub mod error;
pub mod posts;
pub mod subscribers;
pub mod types;

pub use db::Store;
pub use error::{Result, StoreError};
pub use types::{NewPost, NewSubscriber, Post, PostUpdate, Subscriber};
