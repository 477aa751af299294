use std::fmt;

/// Strongly typed id for tickets. Assigned by the store, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TicketId(pub i64);

impl TicketId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TicketId {
    fn from(raw: i64) -> Self {
        TicketId(raw)
    }
}

/// Strongly typed id for rescuer accounts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct RescuerId(pub i64);

impl RescuerId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RescuerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RescuerId {
    fn from(raw: i64) -> Self {
        RescuerId(raw)
    }
}

/// Strongly typed id for chat messages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl MessageId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(raw: i64) -> Self {
        MessageId(raw)
    }
}
