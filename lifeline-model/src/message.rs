use chrono::{DateTime, Utc};

use crate::ids::MessageId;

/// One chat message tied to a ticket. Append-only; ordered by timestamp
/// ascending on read. `ticket_number` is a plain attribute, not an enforced
/// key relationship.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub ticket_number: String,
    pub sender: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewMessage {
    pub ticket_number: String,
    pub sender: String,
    pub message: String,
}
