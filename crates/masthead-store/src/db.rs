use std::sync::Mutex;

use rusqlite::Connection;

use crate::error::Result;

/// Handle to the blog database.
///
/// Thread-safe: wraps the SQLite connection in a `Mutex`. Subsystems that run
/// on separate tasks (HTTP handlers vs. the publisher loop) each construct
/// their own `Store` over their own connection.
pub struct Store {
    pub(crate) conn: Mutex<Connection>,
}

impl Store {
    /// Wrap `conn`, running schema migrations if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Initialise the blog schema in `conn`.
///
/// Creates the `posts` and `subscribers` tables (idempotent) and an index on
/// `scheduled_at` so the due-post query stays efficient as the archive grows.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS posts (
            id           TEXT    NOT NULL PRIMARY KEY,
            title        TEXT    NOT NULL,
            content      TEXT    NOT NULL,
            excerpt      TEXT,
            slug         TEXT    NOT NULL UNIQUE,
            published    INTEGER NOT NULL DEFAULT 0,
            scheduled_at TEXT,               -- RFC3339 or NULL
            published_at TEXT,               -- RFC3339 or NULL
            created_at   TEXT    NOT NULL,
            updated_at   TEXT    NOT NULL
        ) STRICT;

        -- Efficient due-post polling: WHERE published = 0 AND scheduled_at <= ?
        CREATE INDEX IF NOT EXISTS idx_posts_scheduled_at
            ON posts (scheduled_at) WHERE published = 0;

        CREATE TABLE IF NOT EXISTS subscribers (
            id         TEXT    NOT NULL PRIMARY KEY,
            email      TEXT    NOT NULL UNIQUE,
            name       TEXT,
            subscribed INTEGER NOT NULL DEFAULT 1,
            created_at TEXT    NOT NULL,
            updated_at TEXT    NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
