use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use masthead_core::config::SiteConfig;
use masthead_mail::{render, Email, Mailer};
use masthead_store::{Post, Store};

use crate::error::Result;

/// Drives scheduled publishing: due-post scan, publish flip, subscriber
/// notification. Owns its own [`Store`] connection so the loop never contends
/// with HTTP handlers for a statement.
pub struct Publisher {
    store: Store,
    mailer: Arc<dyn Mailer>,
    site: SiteConfig,
    interval: Duration,
}

impl Publisher {
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, site: SiteConfig, interval_secs: u64) -> Self {
        Self {
            store,
            mailer,
            site,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Publish every post that is due right now. Returns the number of posts
    /// published.
    ///
    /// `now` is captured once at entry: the due query, every `published_at`
    /// stamp, and the return-count semantics all use that single cutoff. A
    /// post becoming due mid-run waits for the next invocation.
    pub async fn process_scheduled(&self) -> Result<u32> {
        let now = Utc::now();
        let due = self.store.due_posts(now)?;
        if due.is_empty() {
            debug!("no scheduled posts due");
            return Ok(0);
        }

        let mut published = 0u32;
        for post in due {
            // A store failure here propagates and aborts the run: a failed
            // publish means unknown state and must surface to the caller.
            self.store.mark_published(&post.id, now)?;
            published += 1;
            info!(post_id = %post.id, slug = %post.slug, "published scheduled post");

            // Notification is best-effort: log and move on to the next post.
            if let Err(e) = self.notify(&post).await {
                warn!(post_id = %post.id, error = %e, "newsletter notification failed");
            }
        }

        info!(count = published, "scheduled publish run complete");
        Ok(published)
    }

    /// Announce `post` to all active subscribers with a single email.
    ///
    /// An empty subscriber set is a no-op: nothing is rendered and the
    /// transport is never called.
    pub async fn notify(&self, post: &Post) -> Result<()> {
        let subscribers = self.store.active_subscribers()?;
        if subscribers.is_empty() {
            debug!(post_id = %post.id, "no active subscribers, skipping notification");
            return Ok(());
        }

        let post_url = format!(
            "{}/posts/{}",
            self.site.base_url.trim_end_matches('/'),
            post.slug
        );
        let html = render::newsletter_html(&self.site.title, &post.title, &post.content, &post_url);
        let email = Email {
            to: subscribers.into_iter().map(|s| s.email).collect(),
            subject: render::newsletter_subject(&post.title),
            html,
            text: None,
        };

        self.mailer.send(&email).await?;
        info!(post_id = %post.id, "newsletter dispatched");
        Ok(())
    }

    /// Background loop: run `process_scheduled` every `interval` until
    /// `shutdown` broadcasts `true`. Tick errors are logged, never fatal.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "publisher loop started");

        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.process_scheduled().await {
                        error!("publish tick error: {e}");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("publisher loop shutting down");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use rusqlite::Connection;
    use uuid::Uuid;

    use masthead_mail::MailError;
    use masthead_store::{NewPost, NewSubscriber, PostUpdate, StoreError};

    /// Records every send; optionally fails each one.
    #[derive(Debug)]
    struct MockMailer {
        sent: Mutex<Vec<Email>>,
        fail: bool,
    }

    impl MockMailer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }

        fn sent(&self) -> Vec<Email> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for MockMailer {
        async fn send(&self, email: &Email) -> std::result::Result<(), MailError> {
            if self.fail {
                return Err(MailError::Api {
                    status: 500,
                    message: "provider down".to_string(),
                });
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    /// Shared-cache in-memory DB so a test can hold a second connection to
    /// the same data (e.g. to drop a table out from under the publisher).
    fn shared_db() -> (Store, Connection) {
        let uri = format!("file:{}?mode=memory&cache=shared", Uuid::new_v4());
        let side = Connection::open(&uri).unwrap();
        let store = Store::new(Connection::open(&uri).unwrap()).unwrap();
        (store, side)
    }

    fn publisher_with(mailer: Arc<MockMailer>) -> (Publisher, Connection) {
        let (store, side) = shared_db();
        let site = SiteConfig {
            base_url: "https://blog.example.com".to_string(),
            title: "My Newsletter".to_string(),
        };
        (Publisher::new(store, mailer, site, 60), side)
    }

    fn due_post(store: &Store, title: &str, slug: &str) -> Post {
        store
            .create_post(&NewPost {
                title: title.to_string(),
                content: "Scheduled content.".to_string(),
                excerpt: None,
                slug: slug.to_string(),
                published: false,
                scheduled_at: Some(Utc::now() - ChronoDuration::minutes(5)),
            })
            .unwrap()
    }

    fn subscribe(store: &Store, email: &str) {
        store
            .create_subscriber(&NewSubscriber {
                email: email.to_string(),
                name: None,
            })
            .unwrap();
    }

    #[tokio::test]
    async fn publishes_due_posts_and_notifies_all_subscribers() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(Arc::clone(&mailer));
        due_post(&publisher.store, "Post A", "post-a");
        due_post(&publisher.store, "Post B", "post-b");
        subscribe(&publisher.store, "one@example.com");
        subscribe(&publisher.store, "two@example.com");

        let count = publisher.process_scheduled().await.unwrap();
        assert_eq!(count, 2);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2, "one dispatch per post");
        for email in &sent {
            assert_eq!(email.to.len(), 2, "each dispatch addresses all subscribers");
            assert!(email.to.contains(&"one@example.com".to_string()));
            assert!(email.to.contains(&"two@example.com".to_string()));
        }
        assert!(sent.iter().any(|e| e.subject == "New Post: Post A"));
        assert!(sent.iter().any(|e| e.subject == "New Post: Post B"));
    }

    #[tokio::test]
    async fn published_posts_share_the_run_cutoff() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(mailer);
        let a = due_post(&publisher.store, "Post A", "post-a");
        let b = due_post(&publisher.store, "Post B", "post-b");

        publisher.process_scheduled().await.unwrap();

        let a = publisher.store.get_post(&a.id).unwrap();
        let b = publisher.store.get_post(&b.id).unwrap();
        assert!(a.published && b.published);
        assert!(a.scheduled_at.is_none() && b.scheduled_at.is_none());
        // One cutoff for the whole run, not per-post wall-clock time.
        assert_eq!(a.published_at.unwrap(), b.published_at.unwrap());
    }

    #[tokio::test]
    async fn future_and_already_published_posts_are_untouched() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(Arc::clone(&mailer));
        let store = &publisher.store;

        let future = store
            .create_post(&NewPost {
                title: "Future".to_string(),
                content: "c".to_string(),
                excerpt: None,
                slug: "future".to_string(),
                published: false,
                scheduled_at: Some(Utc::now() + ChronoDuration::hours(1)),
            })
            .unwrap();
        let live = store
            .create_post(&NewPost {
                title: "Live".to_string(),
                content: "c".to_string(),
                excerpt: None,
                slug: "live".to_string(),
                published: true,
                scheduled_at: None,
            })
            .unwrap();
        let live_published_at = store.get_post(&live.id).unwrap().published_at;

        let count = publisher.process_scheduled().await.unwrap();
        assert_eq!(count, 0);
        assert!(mailer.sent().is_empty());

        let future = store.get_post(&future.id).unwrap();
        assert!(!future.published);
        assert!(future.scheduled_at.is_some());
        assert_eq!(store.get_post(&live.id).unwrap().published_at, live_published_at);
    }

    #[tokio::test]
    async fn no_subscribers_means_no_dispatch_but_post_counts() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(Arc::clone(&mailer));
        due_post(&publisher.store, "Quiet", "quiet");

        let count = publisher.process_scheduled().await.unwrap();
        assert_eq!(count, 1);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn dispatch_failure_never_escapes_and_later_posts_still_process() {
        let mailer = MockMailer::new(true);
        let (publisher, _side) = publisher_with(mailer);
        let a = due_post(&publisher.store, "Post A", "post-a");
        let b = due_post(&publisher.store, "Post B", "post-b");
        subscribe(&publisher.store, "one@example.com");

        let count = publisher.process_scheduled().await.unwrap();
        assert_eq!(count, 2);
        assert!(publisher.store.get_post(&a.id).unwrap().published);
        assert!(publisher.store.get_post(&b.id).unwrap().published);
    }

    #[tokio::test]
    async fn due_query_failure_is_fatal_and_modifies_nothing() {
        let mailer = MockMailer::new(false);
        let (publisher, side) = publisher_with(Arc::clone(&mailer));
        side.execute_batch("DROP TABLE posts;").unwrap();

        let err = publisher.process_scheduled().await.unwrap_err();
        assert!(matches!(
            err,
            crate::PublishError::Store(StoreError::Database(_))
        ));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn subscriber_query_failure_only_kills_the_notify_attempt() {
        let mailer = MockMailer::new(false);
        let (publisher, side) = publisher_with(Arc::clone(&mailer));
        let post = due_post(&publisher.store, "Solo", "solo");
        side.execute_batch("DROP TABLE subscribers;").unwrap();

        let count = publisher.process_scheduled().await.unwrap();
        assert_eq!(count, 1);
        assert!(publisher.store.get_post(&post.id).unwrap().published);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(Arc::clone(&mailer));
        due_post(&publisher.store, "Once", "once");
        subscribe(&publisher.store, "one@example.com");

        assert_eq!(publisher.process_scheduled().await.unwrap(), 1);
        assert_eq!(publisher.process_scheduled().await.unwrap(), 0);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn notify_builds_canonical_url_from_slug() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(Arc::clone(&mailer));
        due_post(&publisher.store, "Linked", "linked-post");
        subscribe(&publisher.store, "one@example.com");

        publisher.process_scheduled().await.unwrap();
        let sent = mailer.sent();
        assert!(sent[0]
            .html
            .contains("https://blog.example.com/posts/linked-post"));
    }

    // PostUpdate is pulled in to keep the publish/update interaction honest:
    // an edit that re-schedules an already published post must not make it
    // due again.
    #[tokio::test]
    async fn published_post_cannot_become_due_again() {
        let mailer = MockMailer::new(false);
        let (publisher, _side) = publisher_with(mailer);
        let post = due_post(&publisher.store, "Once", "once");
        publisher.process_scheduled().await.unwrap();

        let edited = publisher
            .store
            .update_post(
                &post.id,
                &PostUpdate {
                    title: "Once".to_string(),
                    content: "edited".to_string(),
                    excerpt: None,
                    slug: "once".to_string(),
                    published: true,
                    scheduled_at: None,
                },
            )
            .unwrap();
        assert!(edited.published);
        assert_eq!(publisher.process_scheduled().await.unwrap(), 0);
    }
}
