use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a message. Only the two roles of a training exchange exist;
/// anything else is rejected at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parse a role string exactly as it appears in exported logs.
    pub fn parse(s: &str) -> Option<Self> {
        [Role::User, Role::Assistant]
            .into_iter()
            .find(|r| r.as_str() == s)
    }
}

/// A single decoded, validated log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Message {
            role,
            content: content.into(),
            timestamp,
        }
    }
}
