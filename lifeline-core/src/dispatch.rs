use std::sync::Arc;

use tracing::{info, warn};

use lifeline_model::{
    ChatMessage, NewMessage, NewRescuer, NewTicket, Rescuer, RescuerId, RescuerStatus,
    RescuerUpdate, Ticket, TicketId, TicketStatusView,
};

use crate::auth::AuthCrypto;
use crate::error::{DispatchError, Result};
use crate::store::{DispatchStore, NewRescuerRecord};

/// The dispatch state manager.
///
/// Owns the lifecycle of tickets and the status field of rescuers, and the
/// one multi-row transactional operation (assignment) that keeps both in
/// sync. Everything else is single-row bookkeeping delegated to the store.
pub struct DispatchService {
    store: Arc<dyn DispatchStore>,
    crypto: Arc<AuthCrypto>,
}

impl std::fmt::Debug for DispatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchService").finish_non_exhaustive()
    }
}

impl DispatchService {
    pub fn new(store: Arc<dyn DispatchStore>, crypto: Arc<AuthCrypto>) -> Self {
        Self { store, crypto }
    }

    // ---- Rescuer accounts ----

    /// Register a new rescuer. The password is hashed before the record is
    /// handed to the store; a duplicate badge surfaces as a conflict.
    pub async fn register_rescuer(&self, new: NewRescuer) -> Result<Rescuer> {
        if new.badge_id.trim().is_empty() {
            return Err(DispatchError::Validation("badge_id must not be empty".to_string()));
        }
        if new.password.is_empty() {
            return Err(DispatchError::Validation("password must not be empty".to_string()));
        }

        let password_hash = self
            .crypto
            .hash_password(&new.password)
            .map_err(|e| DispatchError::Storage(e.to_string()))?;

        let rescuer = self
            .store
            .insert_rescuer(NewRescuerRecord {
                name: new.name,
                badge_id: new.badge_id,
                callsign: new.callsign,
                phone: new.phone,
                password_hash,
                image: new.image,
            })
            .await?;

        info!("Registered rescuer {} (badge {})", rescuer.id, rescuer.badge_id);
        Ok(rescuer)
    }

    /// Partial profile update. A missing image leaves the stored bytes
    /// untouched; only a supplied image overwrites them.
    pub async fn update_rescuer(&self, id: RescuerId, update: RescuerUpdate) -> Result<Rescuer> {
        self.store.update_rescuer(id, update).await
    }

    /// Hard delete. Assignments referencing the rescuer are not retracted.
    pub async fn delete_rescuer(&self, id: RescuerId) -> Result<()> {
        self.store.delete_rescuer(id).await?;
        info!("Deleted rescuer {}", id);
        Ok(())
    }

    /// Verify credentials and force the rescuer back to `available`. The
    /// error never says whether the badge or the password was wrong.
    pub async fn login(&self, badge_id: &str, password: &str) -> Result<Rescuer> {
        let credentials = match self.store.find_by_badge(badge_id).await? {
            Some(credentials) => credentials,
            None => {
                warn!("Login failed for unknown badge");
                return Err(DispatchError::AuthFailed);
            }
        };

        if !self.crypto.verify_password(password, &credentials.password_hash) {
            warn!("Login failed for badge {}", badge_id);
            return Err(DispatchError::AuthFailed);
        }

        let rescuer_id = credentials.rescuer.id;
        self.store
            .set_status(rescuer_id, RescuerStatus::Available)
            .await?;
        info!("Rescuer {} logged in", rescuer_id);

        Ok(Rescuer {
            status: RescuerStatus::Available,
            ..credentials.rescuer
        })
    }

    /// Force `off-duty` unconditionally.
    pub async fn logout(&self, id: RescuerId) -> Result<()> {
        self.store.set_status(id, RescuerStatus::OffDuty).await?;
        info!("Rescuer {} logged out", id);
        Ok(())
    }

    /// Persist a position report and derive the rescuer's status from the
    /// presence of a DISPATCHED ticket. The store evaluates the derivation
    /// atomically, so a racing assignment cannot slip between the mission
    /// check and the write.
    pub async fn report_location(&self, id: RescuerId, lat: f64, lon: f64) -> Result<RescuerStatus> {
        self.store.update_location(id, lat, lon).await
    }

    pub async fn list_on_duty(&self) -> Result<Vec<Rescuer>> {
        self.store.list_on_duty().await
    }

    pub async fn list_located(&self) -> Result<Vec<Rescuer>> {
        self.store.list_located().await
    }

    /// Stored profile image bytes, verbatim. Not-found when the rescuer
    /// does not exist or never uploaded one.
    pub async fn rescuer_image(&self, id: RescuerId) -> Result<Vec<u8>> {
        self.store
            .image_bytes(id)
            .await?
            .ok_or_else(|| DispatchError::NotFound(format!("no image for rescuer {}", id)))
    }

    // ---- Tickets ----

    pub async fn create_ticket(&self, new: NewTicket) -> Result<Ticket> {
        let ticket = self.store.insert_ticket(new).await?;
        info!("Created ticket {} ({})", ticket.id, ticket.ticket_number);
        Ok(ticket)
    }

    pub async fn list_open_tickets(&self) -> Result<Vec<Ticket>> {
        self.store.list_open_tickets().await
    }

    pub async fn ticket_status(&self, ticket_number: &str) -> Result<TicketStatusView> {
        let ticket = self
            .store
            .find_ticket_by_number(ticket_number)
            .await?
            .ok_or_else(|| {
                DispatchError::NotFound(format!("ticket {} not found", ticket_number))
            })?;

        Ok(TicketStatusView {
            ticket_number: ticket.ticket_number,
            status: ticket.status,
            rescuer_name: ticket.rescuer_name,
        })
    }

    /// Atomically dispatch a rescuer to a ticket. Ticket and rescuer state
    /// change together or not at all; any store failure aborts the whole
    /// operation with no partial state observable. No guard checks the
    /// ticket's current status (see DESIGN.md).
    pub async fn assign(
        &self,
        ticket_id: TicketId,
        rescuer_id: RescuerId,
        rescuer_name: &str,
    ) -> Result<()> {
        self.store
            .assign_rescuer(ticket_id, rescuer_id, rescuer_name)
            .await
    }

    /// Mark a ticket SOLVED. Idempotent; the assigned rescuer stays
    /// on-mission until they log out or report a location with no active
    /// mission.
    pub async fn solve(&self, ticket_id: TicketId) -> Result<()> {
        self.store.mark_solved(ticket_id).await?;
        info!("Ticket {} solved", ticket_id);
        Ok(())
    }

    // ---- Chat ----

    pub async fn send_message(&self, new: NewMessage) -> Result<ChatMessage> {
        self.store.append_message(new).await
    }

    pub async fn messages(&self, ticket_number: &str) -> Result<Vec<ChatMessage>> {
        self.store.list_messages(ticket_number).await
    }
}
