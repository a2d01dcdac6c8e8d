use chrono::Utc;
use rusqlite::OptionalExtension;
use tracing::debug;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{Result, StoreError};
use crate::posts::parse_ts;
use crate::types::{NewSubscriber, Subscriber};

type SubscriberRow = (
    String,         // id
    String,         // email
    Option<String>, // name
    bool,           // subscribed
    String,         // created_at
    String,         // updated_at
);

const SUBSCRIBER_COLUMNS: &str = "id, email, name, subscribed, created_at, updated_at";

impl Store {
    /// Insert a new subscriber (subscribed by default). Fails with
    /// `EmailTaken` when the address already exists — callers that want the
    /// reactivation flow check [`find_subscriber`](Self::find_subscriber)
    /// first.
    pub fn create_subscriber(&self, new: &NewSubscriber) -> Result<Subscriber> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM subscribers WHERE email = ?1",
                [&new.email],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::EmailTaken {
                email: new.email.clone(),
            });
        }

        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO subscribers (id, email, name, subscribed, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?4)",
            rusqlite::params![id, new.email, new.name, now_str],
        )?;

        debug!(email = %new.email, "subscriber created");

        Ok(Subscriber {
            id,
            email: new.email.clone(),
            name: new.name.clone(),
            subscribed: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Look up a subscriber by email, subscribed or not.
    pub fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<SubscriberRow> = conn
            .query_row(
                &format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE email = ?1"),
                [email],
                row_to_tuple,
            )
            .optional()?;
        row.map(tuple_to_subscriber).transpose()
    }

    /// Re-activate an unsubscribed address. When `name` is given it replaces
    /// the stored one; otherwise the old name is kept.
    pub fn resubscribe(&self, email: &str, name: Option<&str>) -> Result<Subscriber> {
        {
            let conn = self.conn.lock().unwrap();
            let now_str = Utc::now().to_rfc3339();
            let n = conn.execute(
                "UPDATE subscribers
                 SET subscribed = 1, name = COALESCE(?1, name), updated_at = ?2
                 WHERE email = ?3",
                rusqlite::params![name, now_str, email],
            )?;
            if n == 0 {
                return Err(StoreError::SubscriberNotFound {
                    email: email.to_string(),
                });
            }
        }
        debug!(email = %email, "subscriber reactivated");
        self.find_subscriber(email)?
            .ok_or_else(|| StoreError::SubscriberNotFound {
                email: email.to_string(),
            })
    }

    /// All eligible notification recipients, newest first.
    pub fn active_subscribers(&self) -> Result<Vec<Subscriber>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers
             WHERE subscribed = 1 ORDER BY created_at DESC"
        ))?;
        let rows: Vec<SubscriberRow> = stmt
            .query_map([], row_to_tuple)?
            .collect::<rusqlite::Result<_>>()?;
        rows.into_iter().map(tuple_to_subscriber).collect()
    }

    /// Opt an address out of notifications.
    pub fn unsubscribe(&self, email: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let now_str = Utc::now().to_rfc3339();
        let n = conn.execute(
            "UPDATE subscribers SET subscribed = 0, updated_at = ?1 WHERE email = ?2",
            rusqlite::params![now_str, email],
        )?;
        if n == 0 {
            return Err(StoreError::SubscriberNotFound {
                email: email.to_string(),
            });
        }
        debug!(email = %email, "subscriber opted out");
        Ok(())
    }
}

fn row_to_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubscriberRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn tuple_to_subscriber(row: SubscriberRow) -> Result<Subscriber> {
    let (id, email, name, subscribed, created_at, updated_at) = row;
    Ok(Subscriber {
        id,
        email,
        name,
        subscribed,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}
