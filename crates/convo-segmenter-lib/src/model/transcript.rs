use serde::{Deserialize, Serialize};

use super::message::Role;

/// A run of same-role messages collapsed into one content blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// One training example: the merged turns of a single exchange.
///
/// Serializes as `{"messages": [...]}`, the shape expected by chat
/// fine-tuning loaders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub messages: Vec<Turn>,
}

impl Transcript {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
