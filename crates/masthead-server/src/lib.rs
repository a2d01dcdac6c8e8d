//! `masthead-server` — the HTTP API binary for the blog + newsletter.
//!
//! Exposed as a library so integration tests can assemble the router against
//! a throwaway database; `main.rs` is a thin wrapper around the same pieces.

pub mod app;
pub mod http;

pub use app::{build_router, AppState};
