use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog post as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// UUID v4 string — primary key, immutable.
    pub id: String,
    pub title: String,
    pub content: String,
    /// Optional author-provided summary; the newsletter falls back to a
    /// truncated `content` when absent.
    pub excerpt: Option<String>,
    /// URL slug derived from the title; unique across all posts.
    pub slug: String,
    pub published: bool,
    /// When set (and in the past, and `published` is false) the post is due
    /// for the scheduled-publish run. Cleared on publish.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Set exactly once, when the post transitions to published.
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// The due predicate: unpublished with a schedule at or before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.published && self.scheduled_at.is_some_and(|at| at <= now)
    }
}

/// Fields for creating a post. The slug is derived by the caller so slug
/// conflicts can be reported before any write happens.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub slug: String,
    pub published: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Fields for a full post update (PUT semantics — every column rewritten
/// except `id`, `created_at` and a `published_at` that is already set).
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub slug: String,
    pub published: bool,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// A newsletter subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    /// UUID v4 string — primary key.
    pub id: String,
    /// Unique natural key.
    pub email: String,
    pub name: Option<String>,
    /// Only `subscribed = true` rows receive notifications.
    pub subscribed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: String,
    pub name: Option<String>,
}
