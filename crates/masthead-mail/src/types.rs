use serde::{Deserialize, Serialize};

/// A single outbound message. One `Email` may address many recipients — the
/// newsletter sends one message per post, not one per subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    /// Optional plain-text alternative.
    pub text: Option<String>,
}
