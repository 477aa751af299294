use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use lifeline_model::{
    ChatMessage, MessageId, NewMessage, NewTicket, Rescuer, RescuerId, RescuerStatus,
    RescuerUpdate, Ticket, TicketId, TicketStatus,
};

use crate::error::{DispatchError, Result};
use crate::store::{
    DispatchStore, MessageStore, NewRescuerRecord, RescuerCredentials, RescuerStore, TicketStore,
};

#[derive(Debug, Clone)]
struct RescuerRow {
    rescuer: Rescuer,
    password_hash: String,
    image: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct Inner {
    tickets: BTreeMap<i64, Ticket>,
    rescuers: BTreeMap<i64, RescuerRow>,
    messages: Vec<ChatMessage>,
    next_ticket_id: i64,
    next_rescuer_id: i64,
    next_message_id: i64,
}

/// In-memory implementation of the dispatch storage ports.
///
/// Every operation runs under one lock, which gives the same atomicity the
/// Postgres adapter gets from transactions and single-statement updates.
/// `fail_next_write` injects a storage fault into the next mutating call so
/// tests can observe rollback behavior.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_next_write: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next mutating operation fail with a storage error before it
    /// touches any state.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn check_fault(&self) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(DispatchError::Storage("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn insert_ticket(&self, new: NewTicket) -> Result<Ticket> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        inner.next_ticket_id += 1;
        let ticket = Ticket {
            id: TicketId(inner.next_ticket_id),
            ticket_number: new.ticket_number,
            service_type: new.service_type,
            user_name: new.user_name,
            phone: new.phone,
            latitude: new.latitude,
            longitude: new.longitude,
            incident_details: new.incident_details,
            rescuer_id: None,
            rescuer_name: None,
            status: TicketStatus::Active,
            created_at: Utc::now(),
        };
        inner.tickets.insert(ticket.id.as_i64(), ticket.clone());
        Ok(ticket)
    }

    async fn list_open_tickets(&self) -> Result<Vec<Ticket>> {
        let inner = self.inner.lock().await;
        let mut open: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| t.status != TicketStatus::Solved)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(open)
    }

    async fn find_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tickets
            .values()
            .rev()
            .find(|t| t.ticket_number == ticket_number)
            .cloned())
    }

    async fn mark_solved(&self, id: TicketId) -> Result<()> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        if let Some(ticket) = inner.tickets.get_mut(&id.as_i64()) {
            ticket.status = TicketStatus::Solved;
        }
        Ok(())
    }
}

#[async_trait]
impl RescuerStore for MemoryStore {
    async fn insert_rescuer(&self, record: NewRescuerRecord) -> Result<Rescuer> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        if inner
            .rescuers
            .values()
            .any(|r| r.rescuer.badge_id == record.badge_id)
        {
            return Err(DispatchError::Conflict("badge already registered".to_string()));
        }
        inner.next_rescuer_id += 1;
        let rescuer = Rescuer {
            id: RescuerId(inner.next_rescuer_id),
            name: record.name,
            badge_id: record.badge_id,
            callsign: record.callsign,
            phone: record.phone,
            status: RescuerStatus::Available,
            latitude: None,
            longitude: None,
        };
        inner.rescuers.insert(
            rescuer.id.as_i64(),
            RescuerRow {
                rescuer: rescuer.clone(),
                password_hash: record.password_hash,
                image: record.image,
            },
        );
        Ok(rescuer)
    }

    async fn update_rescuer(&self, id: RescuerId, update: RescuerUpdate) -> Result<Rescuer> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        if let Some(new_badge) = update.badge_id.as_deref() {
            let badge_taken = inner
                .rescuers
                .values()
                .any(|r| r.rescuer.id != id && r.rescuer.badge_id == new_badge);
            if badge_taken {
                return Err(DispatchError::Conflict("badge already registered".to_string()));
            }
        }
        let row = inner
            .rescuers
            .get_mut(&id.as_i64())
            .ok_or_else(|| DispatchError::NotFound(format!("rescuer {} not found", id)))?;

        if let Some(name) = update.name {
            row.rescuer.name = name;
        }
        if let Some(badge_id) = update.badge_id {
            row.rescuer.badge_id = badge_id;
        }
        if let Some(callsign) = update.callsign {
            row.rescuer.callsign = callsign;
        }
        if let Some(phone) = update.phone {
            row.rescuer.phone = phone;
        }
        if let Some(image) = update.image {
            row.image = Some(image);
        }
        Ok(row.rescuer.clone())
    }

    async fn delete_rescuer(&self, id: RescuerId) -> Result<()> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        inner
            .rescuers
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or_else(|| DispatchError::NotFound(format!("rescuer {} not found", id)))
    }

    async fn list_on_duty(&self) -> Result<Vec<Rescuer>> {
        let inner = self.inner.lock().await;
        let mut on_duty: Vec<Rescuer> = inner
            .rescuers
            .values()
            .filter(|r| r.rescuer.status.is_on_duty())
            .map(|r| r.rescuer.clone())
            .collect();
        on_duty.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(on_duty)
    }

    async fn list_located(&self) -> Result<Vec<Rescuer>> {
        let inner = self.inner.lock().await;
        let mut located: Vec<Rescuer> = inner
            .rescuers
            .values()
            .filter(|r| {
                r.rescuer.status.is_on_duty()
                    && r.rescuer.latitude.is_some()
                    && r.rescuer.longitude.is_some()
            })
            .map(|r| r.rescuer.clone())
            .collect();
        located.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(located)
    }

    async fn find_by_badge(&self, badge_id: &str) -> Result<Option<RescuerCredentials>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rescuers
            .values()
            .find(|r| r.rescuer.badge_id == badge_id)
            .map(|r| RescuerCredentials {
                rescuer: r.rescuer.clone(),
                password_hash: r.password_hash.clone(),
            }))
    }

    async fn set_status(&self, id: RescuerId, status: RescuerStatus) -> Result<()> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        let row = inner
            .rescuers
            .get_mut(&id.as_i64())
            .ok_or_else(|| DispatchError::NotFound(format!("rescuer {} not found", id)))?;
        row.rescuer.status = status;
        Ok(())
    }

    async fn update_location(&self, id: RescuerId, lat: f64, lon: f64) -> Result<RescuerStatus> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        // Mission check and write happen under the same lock, matching the
        // single-statement derivation in the Postgres adapter.
        let on_mission = inner
            .tickets
            .values()
            .any(|t| t.rescuer_id == Some(id) && t.status == TicketStatus::Dispatched);
        let row = inner
            .rescuers
            .get_mut(&id.as_i64())
            .ok_or_else(|| DispatchError::NotFound(format!("rescuer {} not found", id)))?;
        row.rescuer.latitude = Some(lat);
        row.rescuer.longitude = Some(lon);
        row.rescuer.status = if on_mission {
            RescuerStatus::Responding
        } else {
            RescuerStatus::Available
        };
        Ok(row.rescuer.status)
    }

    async fn image_bytes(&self, id: RescuerId) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rescuers
            .get(&id.as_i64())
            .and_then(|r| r.image.clone()))
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append_message(&self, new: NewMessage) -> Result<ChatMessage> {
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        inner.next_message_id += 1;
        let message = ChatMessage {
            id: MessageId(inner.next_message_id),
            ticket_number: new.ticket_number,
            sender: new.sender,
            message: new.message,
            created_at: Utc::now(),
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, ticket_number: &str) -> Result<Vec<ChatMessage>> {
        let inner = self.inner.lock().await;
        let mut messages: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.ticket_number == ticket_number)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }
}

#[async_trait]
impl DispatchStore for MemoryStore {
    async fn assign_rescuer(
        &self,
        ticket_id: TicketId,
        rescuer_id: RescuerId,
        rescuer_name: &str,
    ) -> Result<()> {
        // The fault check runs before any mutation, so an injected failure
        // leaves both rows exactly as they were.
        self.check_fault()?;
        let mut inner = self.inner.lock().await;
        if let Some(ticket) = inner.tickets.get_mut(&ticket_id.as_i64()) {
            ticket.rescuer_id = Some(rescuer_id);
            ticket.rescuer_name = Some(rescuer_name.to_string());
            ticket.status = TicketStatus::Dispatched;
        }
        if let Some(row) = inner.rescuers.get_mut(&rescuer_id.as_i64()) {
            row.rescuer.status = RescuerStatus::OnMission;
        }
        Ok(())
    }
}
