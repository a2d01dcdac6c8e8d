use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use masthead_core::config::MailConfig;

use crate::error::MailError;
use crate::types::Email;

/// Common interface for outbound mail transports.
///
/// Implementations must be `Send + Sync` so a single mailer can be shared
/// between the HTTP handlers and the background publisher task.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    /// Deliver a single message. Acceptance by the provider counts as
    /// success; per-recipient bounces are the provider's problem.
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Build the mailer the config asks for.
///
/// `enabled = false` gives a [`LogMailer`]; `enabled = true` requires
/// `api_url` and `api_token` and gives an [`HttpMailer`].
pub fn mailer_from_config(cfg: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    if !cfg.enabled {
        return Ok(Arc::new(LogMailer));
    }
    let api_url = cfg
        .api_url
        .clone()
        .ok_or_else(|| MailError::Config("mail.api_url is required when mail is enabled".into()))?;
    let api_token = cfg
        .api_token
        .clone()
        .ok_or_else(|| MailError::Config("mail.api_token is required when mail is enabled".into()))?;
    Ok(Arc::new(HttpMailer::new(
        api_url,
        api_token,
        cfg.from_name.clone(),
        cfg.from_email.clone(),
    )))
}

/// Sends through an HTTP mail provider (Postmark/Mailgun-style JSON API).
#[derive(Debug)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_token: String,
    from_name: String,
    from_email: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_token: String, from_name: String, from_email: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_token,
            from_name,
            from_email,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        let body = json!({
            "from": format!("{} <{}>", self.from_name, self.from_email),
            "to": email.to,
            "subject": email.subject,
            "html": email.html,
            "text": email.text,
        });

        debug!(recipients = email.to.len(), subject = %email.subject, "dispatching email");

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "mail API error");
            return Err(MailError::Api {
                status,
                message: text,
            });
        }

        info!(recipients = email.to.len(), subject = %email.subject, "email accepted by provider");
        Ok(())
    }
}

/// Development/default transport: logs the message and reports success.
#[derive(Debug)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        info!(
            recipients = email.to.len(),
            subject = %email.subject,
            "mail disabled — logging instead of sending"
        );
        Ok(())
    }
}
