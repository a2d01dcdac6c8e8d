//! `masthead-mail` — outbound newsletter delivery.
//!
//! The [`Mailer`] trait is the seam between the publish workflow and the
//! actual transport. Two implementations ship here:
//!
//! | Impl          | Behaviour                                             |
//! |---------------|-------------------------------------------------------|
//! | [`HttpMailer`]| POSTs JSON to an HTTP mail provider (bearer auth)     |
//! | [`LogMailer`] | Logs the send and succeeds — the `enabled=false` mode |
//!
//! [`render`] builds the newsletter HTML body from a post title, a truncated
//! content excerpt and the canonical post URL.

pub mod error;
pub mod mailer;
pub mod render;
pub mod types;

pub use error::MailError;
pub use mailer::{mailer_from_config, HttpMailer, LogMailer, Mailer};
pub use types::Email;
