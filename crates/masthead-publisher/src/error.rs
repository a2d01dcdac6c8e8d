use thiserror::Error;

use masthead_mail::MailError;
use masthead_store::StoreError;

/// Errors surfaced by the publish workflow.
///
/// `Store` escapes `process_scheduled`; `Mail` only ever escapes `notify`,
/// whose caller logs and swallows it.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mail(#[from] MailError),
}

pub type Result<T> = std::result::Result<T, PublishError>;
