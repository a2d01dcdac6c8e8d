use thiserror::Error;

/// Errors that can occur within the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No post with the given ID exists.
    #[error("Post not found: {id}")]
    PostNotFound { id: String },

    /// Another post already owns this slug.
    #[error("A post with this title already exists (slug: {slug})")]
    SlugTaken { slug: String },

    /// The email address is already subscribed.
    #[error("Email is already subscribed: {email}")]
    EmailTaken { email: String },

    /// No subscriber with the given email exists.
    #[error("Subscriber not found: {email}")]
    SubscriberNotFound { email: String },

    /// A stored value could not be interpreted (e.g. a bad timestamp).
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
