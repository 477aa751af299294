use chrono::{DateTime, Utc};

use crate::ids::{RescuerId, TicketId};
use crate::status::TicketStatus;

/// One reported incident requiring a response.
///
/// `ticket_number` is caller-supplied and used as the lookup key for status
/// polling and chat. The store does not guarantee it unique. `rescuer_id`
/// and `rescuer_name` are weak references: no foreign key, no cascade, and
/// the name is a denormalized copy taken at assignment time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub ticket_number: String,
    pub service_type: String,
    pub user_name: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub incident_details: String,
    pub rescuer_id: Option<RescuerId>,
    pub rescuer_name: Option<String>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for SOS submission. Everything except the dispatch fields is
/// immutable once stored.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NewTicket {
    pub ticket_number: String,
    pub service_type: String,
    pub user_name: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub incident_details: String,
}

/// What a caller sees when polling `GET /api/ticket/status/:ticket_number`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TicketStatusView {
    pub ticket_number: String,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescuer_name: Option<String>,
}
