use thiserror::Error;

/// Errors that can occur while dispatching mail.
#[derive(Debug, Error)]
pub enum MailError {
    /// The request never reached the provider (connect/timeout/TLS).
    #[error("Mail transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Mail API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The message had an empty recipient list.
    #[error("No recipients")]
    NoRecipients,

    /// The mailer is enabled but missing required settings.
    #[error("Mail configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MailError>;
