//! `masthead-core` — configuration, validation and shared helpers.
//!
//! Everything here is plain synchronous code with no I/O beyond reading the
//! config file; the other crates depend on this one and never the reverse.

pub mod config;
pub mod error;
pub mod slug;
pub mod validate;

pub use config::MastheadConfig;
pub use error::ConfigError;
pub use slug::slugify;
