//! Repository ports for the dispatch domain.
//!
//! Each aggregate gets its own port; [`DispatchStore`] combines them and adds
//! the one cross-entity operation (assignment) that must run inside a single
//! store transaction. Adapters: [`postgres::PostgresStore`] for production,
//! [`memory::MemoryStore`] for the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use lifeline_model::{
    ChatMessage, NewMessage, NewTicket, Rescuer, RescuerId, RescuerStatus, RescuerUpdate, Ticket,
    TicketId,
};

use crate::error::Result;

/// Rescuer row ready for insertion. The service hashes the password before
/// anything reaches a store, so adapters only ever see the PHC string.
#[derive(Debug, Clone)]
pub struct NewRescuerRecord {
    pub name: String,
    pub badge_id: String,
    pub callsign: String,
    pub phone: String,
    pub password_hash: String,
    pub image: Option<Vec<u8>>,
}

/// Profile plus stored credential hash, for login verification.
#[derive(Debug, Clone)]
pub struct RescuerCredentials {
    pub rescuer: Rescuer,
    pub password_hash: String,
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert_ticket(&self, new: NewTicket) -> Result<Ticket>;

    /// Non-SOLVED tickets, newest first.
    async fn list_open_tickets(&self) -> Result<Vec<Ticket>>;

    /// Lookup by the caller-visible ticket number. When the number is not
    /// unique the store returns the most recent ticket carrying it.
    async fn find_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>>;

    /// Set status to SOLVED unconditionally. Idempotent; does not touch the
    /// assigned rescuer.
    async fn mark_solved(&self, id: TicketId) -> Result<()>;
}

#[async_trait]
pub trait RescuerStore: Send + Sync {
    async fn insert_rescuer(&self, record: NewRescuerRecord) -> Result<Rescuer>;

    /// Partial update. A `None` image keeps the stored bytes; only a
    /// supplied image overwrites them.
    async fn update_rescuer(&self, id: RescuerId, update: RescuerUpdate) -> Result<Rescuer>;

    /// Hard delete. Tickets referencing the rescuer keep their stale
    /// rescuer_id/rescuer_name.
    async fn delete_rescuer(&self, id: RescuerId) -> Result<()>;

    /// Rescuers whose status is anything but off-duty.
    async fn list_on_duty(&self) -> Result<Vec<Rescuer>>;

    /// On-duty rescuers with a known position.
    async fn list_located(&self) -> Result<Vec<Rescuer>>;

    async fn find_by_badge(&self, badge_id: &str) -> Result<Option<RescuerCredentials>>;

    async fn set_status(&self, id: RescuerId, status: RescuerStatus) -> Result<()>;

    /// Persist coordinates and derive the status in one atomic store step:
    /// `responding` while the rescuer holds a DISPATCHED ticket, otherwise
    /// `available`. Returns the derived status.
    async fn update_location(&self, id: RescuerId, lat: f64, lon: f64) -> Result<RescuerStatus>;

    /// Stored profile image bytes, verbatim.
    async fn image_bytes(&self, id: RescuerId) -> Result<Option<Vec<u8>>>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_message(&self, new: NewMessage) -> Result<ChatMessage>;

    /// Messages for a ticket number, oldest first.
    async fn list_messages(&self, ticket_number: &str) -> Result<Vec<ChatMessage>>;
}

/// The full storage port for the dispatch state manager.
#[async_trait]
pub trait DispatchStore: TicketStore + RescuerStore + MessageStore {
    /// Atomically link a rescuer to a ticket: ticket gets the rescuer id,
    /// the denormalized name, and status DISPATCHED; the rescuer goes
    /// on-mission. All-or-nothing: a failure in either half leaves both
    /// rows untouched. Ids are caller-supplied and trusted, per the
    /// dispatcher UI contract.
    async fn assign_rescuer(
        &self,
        ticket_id: TicketId,
        rescuer_id: RescuerId,
        rescuer_name: &str,
    ) -> Result<()>;
}
