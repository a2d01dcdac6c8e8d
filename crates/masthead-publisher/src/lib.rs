//! `masthead-publisher` — the scheduled-publish workflow.
//!
//! # Overview
//!
//! A [`Publisher`] scans for posts whose scheduled publish time has passed,
//! flips each to published, and announces it to the newsletter subscribers.
//! One invocation captures a single `now` cutoff, so a run has a consistent
//! due set and every post published in it carries the same `published_at`.
//!
//! Failure semantics are deliberately asymmetric:
//!
//! * a store failure (due query or publish update) aborts the run and
//!   surfaces to the caller — state is unknown and must not be papered over;
//! * a notification failure is logged and swallowed — email is a best-effort
//!   side channel and never blocks publishing or the remaining posts.
//!
//! There is no retry logic. The due set is recomputed from state every run,
//! so whatever was left undone is picked up next time.

pub mod error;
pub mod publisher;

pub use error::{PublishError, Result};
pub use publisher::Publisher;
