use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tracing::debug;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{Result, StoreError};
use crate::types::{NewPost, Post, PostUpdate};

/// Raw row tuple; timestamps are converted after the statement is done.
type PostRow = (
    String,         // id
    String,         // title
    String,         // content
    Option<String>, // excerpt
    String,         // slug
    bool,           // published
    Option<String>, // scheduled_at
    Option<String>, // published_at
    String,         // created_at
    String,         // updated_at
);

const POST_COLUMNS: &str = "id, title, content, excerpt, slug, published,
                            scheduled_at, published_at, created_at, updated_at";

impl Store {
    /// Insert a new post. Fails with `SlugTaken` when the derived slug is
    /// already in use. A post created with `published = true` gets
    /// `published_at` stamped immediately.
    pub fn create_post(&self, new: &NewPost) -> Result<Post> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM posts WHERE slug = ?1",
                [&new.slug],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::SlugTaken {
                slug: new.slug.clone(),
            });
        }

        let id = Uuid::new_v4().to_string();
        let published_at = new.published.then_some(now);

        conn.execute(
            "INSERT INTO posts
             (id, title, content, excerpt, slug, published,
              scheduled_at, published_at, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?9)",
            rusqlite::params![
                id,
                new.title,
                new.content,
                new.excerpt,
                new.slug,
                new.published,
                new.scheduled_at.map(|dt| dt.to_rfc3339()),
                published_at.map(|dt| dt.to_rfc3339()),
                now_str,
            ],
        )?;

        debug!(post_id = %id, slug = %new.slug, "post created");

        Ok(Post {
            id,
            title: new.title.clone(),
            content: new.content.clone(),
            excerpt: new.excerpt.clone(),
            slug: new.slug.clone(),
            published: new.published,
            scheduled_at: new.scheduled_at,
            published_at,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a post by ID.
    pub fn get_post(&self, id: &str) -> Result<Post> {
        let conn = self.conn.lock().unwrap();
        let row: Option<PostRow> = conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                [id],
                row_to_tuple,
            )
            .optional()?;

        match row {
            Some(row) => tuple_to_post(row),
            None => Err(StoreError::PostNotFound { id: id.to_string() }),
        }
    }

    /// List posts, newest first. `published_only` restricts to published
    /// posts; `limit` caps the result size.
    pub fn list_posts(&self, published_only: bool, limit: Option<u32>) -> Result<Vec<Post>> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts
             {} ORDER BY created_at DESC LIMIT ?1",
            if published_only {
                "WHERE published = 1"
            } else {
                ""
            }
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<PostRow> = stmt
            .query_map([limit.map_or(-1_i64, i64::from)], row_to_tuple)?
            .collect::<rusqlite::Result<_>>()?;

        rows.into_iter().map(tuple_to_post).collect()
    }

    /// Rewrite a post's mutable columns. `published_at` is preserved once
    /// set; an unpublished→published flip stamps it with the current time.
    pub fn update_post(&self, id: &str, upd: &PostUpdate) -> Result<Post> {
        let existing = self.get_post(id)?;

        {
            let conn = self.conn.lock().unwrap();
            let now = Utc::now();

            // Reject the new slug when a *different* post owns it.
            let taken: Option<String> = conn
                .query_row(
                    "SELECT id FROM posts WHERE slug = ?1 AND id != ?2",
                    rusqlite::params![upd.slug, id],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                return Err(StoreError::SlugTaken {
                    slug: upd.slug.clone(),
                });
            }

            let published_at = match existing.published_at {
                Some(at) => Some(at),
                None if upd.published => Some(now),
                None => None,
            };

            conn.execute(
                "UPDATE posts SET title=?1, content=?2, excerpt=?3, slug=?4,
                        published=?5, scheduled_at=?6, published_at=?7, updated_at=?8
                 WHERE id=?9",
                rusqlite::params![
                    upd.title,
                    upd.content,
                    upd.excerpt,
                    upd.slug,
                    upd.published,
                    upd.scheduled_at.map(|dt| dt.to_rfc3339()),
                    published_at.map(|dt| dt.to_rfc3339()),
                    now.to_rfc3339(),
                    id,
                ],
            )?;
        }

        self.get_post(id)
    }

    /// Delete a post by ID. Returns `PostNotFound` if no row is deleted.
    pub fn delete_post(&self, id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::PostNotFound { id: id.to_string() });
        }
        debug!(post_id = %id, "post deleted");
        Ok(())
    }

    /// All unpublished posts whose schedule has arrived, oldest schedule
    /// first. The explicit ordering keeps publish runs deterministic.
    pub fn due_posts(&self, cutoff: DateTime<Utc>) -> Result<Vec<Post>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE published = 0 AND scheduled_at IS NOT NULL AND scheduled_at <= ?1
             ORDER BY scheduled_at ASC"
        ))?;
        let rows: Vec<PostRow> = stmt
            .query_map([cutoff.to_rfc3339()], row_to_tuple)?
            .collect::<rusqlite::Result<_>>()?;

        rows.into_iter().map(tuple_to_post).collect()
    }

    /// Flip a post to published: `published = true`, `published_at = cutoff`,
    /// schedule cleared. The cutoff is the single `now` captured at the start
    /// of a publish run, not per-post wall-clock time.
    pub fn mark_published(&self, id: &str, cutoff: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE posts SET published = 1, published_at = ?1,
                    scheduled_at = NULL, updated_at = ?1
             WHERE id = ?2",
            rusqlite::params![cutoff.to_rfc3339(), id],
        )?;
        if n == 0 {
            return Err(StoreError::PostNotFound { id: id.to_string() });
        }
        Ok(())
    }
}

fn row_to_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn tuple_to_post(row: PostRow) -> Result<Post> {
    let (id, title, content, excerpt, slug, published, scheduled_at, published_at, created_at, updated_at) =
        row;
    Ok(Post {
        id,
        title,
        content,
        excerpt,
        slug,
        published,
        scheduled_at: scheduled_at.as_deref().map(parse_ts).transpose()?,
        published_at: published_at.as_deref().map(parse_ts).transpose()?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rusqlite::Connection;

    fn store() -> Store {
        Store::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn draft(title: &str, slug: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: "Some content.".to_string(),
            excerpt: None,
            slug: slug.to_string(),
            published: false,
            scheduled_at: None,
        }
    }

    #[test]
    fn create_and_get_round_trip() {
        let store = store();
        let created = store.create_post(&draft("First", "first")).unwrap();
        let fetched = store.get_post(&created.id).unwrap();
        assert_eq!(fetched.title, "First");
        assert!(!fetched.published);
        assert!(fetched.published_at.is_none());
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let store = store();
        store.create_post(&draft("First", "first")).unwrap();
        let err = store.create_post(&draft("First again", "first")).unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken { .. }));
    }

    #[test]
    fn create_published_stamps_published_at() {
        let store = store();
        let mut new = draft("Live", "live");
        new.published = true;
        let post = store.create_post(&new).unwrap();
        assert!(post.published_at.is_some());
    }

    #[test]
    fn get_missing_post_is_not_found() {
        let err = store().get_post("no-such-id").unwrap_err();
        assert!(matches!(err, StoreError::PostNotFound { .. }));
    }

    #[test]
    fn list_filters_and_limits() {
        let store = store();
        let mut live = draft("Live", "live");
        live.published = true;
        store.create_post(&live).unwrap();
        store.create_post(&draft("Draft", "draft")).unwrap();

        assert_eq!(store.list_posts(false, None).unwrap().len(), 2);
        let published = store.list_posts(true, None).unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].slug, "live");
        assert_eq!(store.list_posts(false, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn update_preserves_published_at_once_set() {
        let store = store();
        let mut new = draft("Live", "live");
        new.published = true;
        let post = store.create_post(&new).unwrap();
        let first_published_at = post.published_at.unwrap();

        let updated = store
            .update_post(
                &post.id,
                &PostUpdate {
                    title: "Live (edited)".to_string(),
                    content: "New content.".to_string(),
                    excerpt: None,
                    slug: "live-edited".to_string(),
                    published: true,
                    scheduled_at: None,
                },
            )
            .unwrap();

        assert_eq!(updated.published_at.unwrap(), first_published_at);
        assert_eq!(updated.slug, "live-edited");
    }

    #[test]
    fn update_rejects_slug_owned_by_other_post() {
        let store = store();
        store.create_post(&draft("One", "one")).unwrap();
        let two = store.create_post(&draft("Two", "two")).unwrap();

        let err = store
            .update_post(
                &two.id,
                &PostUpdate {
                    title: "Two".to_string(),
                    content: "c".to_string(),
                    excerpt: None,
                    slug: "one".to_string(),
                    published: false,
                    scheduled_at: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::SlugTaken { .. }));
    }

    #[test]
    fn delete_missing_post_is_not_found() {
        let store = store();
        let post = store.create_post(&draft("Gone", "gone")).unwrap();
        store.delete_post(&post.id).unwrap();
        assert!(matches!(
            store.delete_post(&post.id).unwrap_err(),
            StoreError::PostNotFound { .. }
        ));
    }

    #[test]
    fn due_posts_matches_predicate_and_orders_by_schedule() {
        let store = store();
        let now = Utc::now();

        let mut early = draft("Early", "early");
        early.scheduled_at = Some(now - Duration::hours(2));
        let mut late = draft("Late", "late");
        late.scheduled_at = Some(now - Duration::hours(1));
        let mut future = draft("Future", "future");
        future.scheduled_at = Some(now + Duration::hours(1));
        let mut already = draft("Already", "already");
        already.published = true;
        already.scheduled_at = None;

        store.create_post(&late).unwrap();
        store.create_post(&early).unwrap();
        store.create_post(&future).unwrap();
        store.create_post(&already).unwrap();

        let due = store.due_posts(now).unwrap();
        let slugs: Vec<_> = due.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["early", "late"]);
    }

    #[test]
    fn mark_published_clears_schedule_and_uses_cutoff() {
        let store = store();
        let now = Utc::now();
        let mut new = draft("Due", "due");
        new.scheduled_at = Some(now - Duration::minutes(5));
        let post = store.create_post(&new).unwrap();

        let cutoff = now - Duration::seconds(1);
        store.mark_published(&post.id, cutoff).unwrap();

        let published = store.get_post(&post.id).unwrap();
        assert!(published.published);
        assert!(published.scheduled_at.is_none());
        // RFC3339 round-trip keeps sub-second precision
        assert_eq!(published.published_at.unwrap().to_rfc3339(), cutoff.to_rfc3339());
    }
}
