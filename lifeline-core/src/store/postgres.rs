use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use lifeline_model::{
    ChatMessage, MessageId, NewMessage, NewTicket, Rescuer, RescuerId, RescuerStatus,
    RescuerUpdate, Ticket, TicketId, TicketStatus,
};

use crate::error::{DispatchError, Result};
use crate::store::{
    DispatchStore, MessageStore, NewRescuerRecord, RescuerCredentials, RescuerStore, TicketStore,
};

/// PostgreSQL-backed implementation of the dispatch storage ports.
///
/// The pool is constructed by the caller and injected here; there is no
/// process-wide handle.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| DispatchError::Storage(format!("migration failed: {}", e)))?;
        Ok(())
    }
}

fn parse_ticket_status(raw: &str) -> Result<TicketStatus> {
    raw.parse()
        .map_err(|e: lifeline_model::ParseStatusError| DispatchError::Storage(e.to_string()))
}

fn parse_rescuer_status(raw: &str) -> Result<RescuerStatus> {
    raw.parse()
        .map_err(|e: lifeline_model::ParseStatusError| DispatchError::Storage(e.to_string()))
}

fn map_ticket(row: &PgRow) -> Result<Ticket> {
    let status: String = row.try_get("status")?;
    Ok(Ticket {
        id: TicketId(row.try_get("id")?),
        ticket_number: row.try_get("ticket_number")?,
        service_type: row.try_get("service_type")?,
        user_name: row.try_get("user_name")?,
        phone: row.try_get("phone")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        incident_details: row.try_get("incident_details")?,
        rescuer_id: row
            .try_get::<Option<i64>, _>("rescuer_id")?
            .map(RescuerId),
        rescuer_name: row.try_get("rescuer_name")?,
        status: parse_ticket_status(&status)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn map_rescuer(row: &PgRow) -> Result<Rescuer> {
    let status: String = row.try_get("status")?;
    Ok(Rescuer {
        id: RescuerId(row.try_get("id")?),
        name: row.try_get("name")?,
        badge_id: row.try_get("badge_id")?,
        callsign: row.try_get("callsign")?,
        phone: row.try_get("phone")?,
        status: parse_rescuer_status(&status)?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

fn map_message(row: &PgRow) -> Result<ChatMessage> {
    Ok(ChatMessage {
        id: MessageId(row.try_get("id")?),
        ticket_number: row.try_get("ticket_number")?,
        sender: row.try_get("sender")?,
        message: row.try_get("message")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

const RESCUER_COLUMNS: &str = "id, name, badge_id, callsign, phone, status, latitude, longitude";
const TICKET_COLUMNS: &str = "id, ticket_number, service_type, user_name, phone, latitude, \
                              longitude, incident_details, rescuer_id, rescuer_name, status, \
                              created_at";

#[async_trait]
impl TicketStore for PostgresStore {
    async fn insert_ticket(&self, new: NewTicket) -> Result<Ticket> {
        let row = sqlx::query(&format!(
            "INSERT INTO tickets \
             (ticket_number, service_type, user_name, phone, latitude, longitude, incident_details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(&new.ticket_number)
        .bind(&new.service_type)
        .bind(&new.user_name)
        .bind(&new.phone)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(&new.incident_details)
        .fetch_one(&self.pool)
        .await?;

        map_ticket(&row)
    }

    async fn list_open_tickets(&self) -> Result<Vec<Ticket>> {
        let rows = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE status <> 'SOLVED' \
             ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_ticket).collect()
    }

    async fn find_ticket_by_number(&self, ticket_number: &str) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE ticket_number = $1 \
             ORDER BY id DESC LIMIT 1"
        ))
        .bind(ticket_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_ticket).transpose()
    }

    async fn mark_solved(&self, id: TicketId) -> Result<()> {
        sqlx::query("UPDATE tickets SET status = 'SOLVED' WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RescuerStore for PostgresStore {
    async fn insert_rescuer(&self, record: NewRescuerRecord) -> Result<Rescuer> {
        let row = sqlx::query(&format!(
            "INSERT INTO rescuers (name, badge_id, callsign, phone, password_hash, image) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RESCUER_COLUMNS}"
        ))
        .bind(&record.name)
        .bind(&record.badge_id)
        .bind(&record.callsign)
        .bind(&record.phone)
        .bind(&record.password_hash)
        .bind(&record.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("rescuers_badge_id_key") {
                    return DispatchError::Conflict("badge already registered".to_string());
                }
            }
            DispatchError::Storage(e.to_string())
        })?;

        map_rescuer(&row)
    }

    async fn update_rescuer(&self, id: RescuerId, update: RescuerUpdate) -> Result<Rescuer> {
        // COALESCE keeps the stored value for every field the caller left
        // out, including the image bytes.
        let row = sqlx::query(&format!(
            "UPDATE rescuers SET \
               name = COALESCE($2, name), \
               badge_id = COALESCE($3, badge_id), \
               callsign = COALESCE($4, callsign), \
               phone = COALESCE($5, phone), \
               image = COALESCE($6, image) \
             WHERE id = $1 \
             RETURNING {RESCUER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(&update.name)
        .bind(&update.badge_id)
        .bind(&update.callsign)
        .bind(&update.phone)
        .bind(&update.image)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.constraint() == Some("rescuers_badge_id_key") {
                    return DispatchError::Conflict("badge already registered".to_string());
                }
            }
            DispatchError::Storage(e.to_string())
        })?;

        match row {
            Some(row) => map_rescuer(&row),
            None => Err(DispatchError::NotFound(format!("rescuer {} not found", id))),
        }
    }

    async fn delete_rescuer(&self, id: RescuerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM rescuers WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DispatchError::NotFound(format!("rescuer {} not found", id)));
        }
        Ok(())
    }

    async fn list_on_duty(&self) -> Result<Vec<Rescuer>> {
        let rows = sqlx::query(&format!(
            "SELECT {RESCUER_COLUMNS} FROM rescuers \
             WHERE status <> 'off-duty' \
             ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_rescuer).collect()
    }

    async fn list_located(&self) -> Result<Vec<Rescuer>> {
        let rows = sqlx::query(&format!(
            "SELECT {RESCUER_COLUMNS} FROM rescuers \
             WHERE status <> 'off-duty' \
               AND latitude IS NOT NULL AND longitude IS NOT NULL \
             ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_rescuer).collect()
    }

    async fn find_by_badge(&self, badge_id: &str) -> Result<Option<RescuerCredentials>> {
        let row = sqlx::query(&format!(
            "SELECT {RESCUER_COLUMNS}, password_hash FROM rescuers WHERE badge_id = $1"
        ))
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(RescuerCredentials {
                rescuer: map_rescuer(&row)?,
                password_hash: row.try_get("password_hash")?,
            })),
            None => Ok(None),
        }
    }

    async fn set_status(&self, id: RescuerId, status: RescuerStatus) -> Result<()> {
        let result = sqlx::query("UPDATE rescuers SET status = $2 WHERE id = $1")
            .bind(id.as_i64())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DispatchError::NotFound(format!("rescuer {} not found", id)));
        }
        Ok(())
    }

    async fn update_location(&self, id: RescuerId, lat: f64, lon: f64) -> Result<RescuerStatus> {
        // Coordinates and the derived status land in one statement, so a
        // concurrent assignment cannot interleave between the mission check
        // and the write.
        let row = sqlx::query(
            "UPDATE rescuers SET \
               latitude = $2, \
               longitude = $3, \
               status = CASE WHEN EXISTS ( \
                   SELECT 1 FROM tickets \
                   WHERE rescuer_id = $1 AND status = 'DISPATCHED' \
               ) THEN 'responding' ELSE 'available' END \
             WHERE id = $1 \
             RETURNING status",
        )
        .bind(id.as_i64())
        .bind(lat)
        .bind(lon)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let status: String = row.try_get("status")?;
                parse_rescuer_status(&status)
            }
            None => Err(DispatchError::NotFound(format!("rescuer {} not found", id))),
        }
    }

    async fn image_bytes(&self, id: RescuerId) -> Result<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT image FROM rescuers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|r| r.try_get::<Option<Vec<u8>>, _>("image"))
            .transpose()?
            .flatten())
    }
}

#[async_trait]
impl MessageStore for PostgresStore {
    async fn append_message(&self, new: NewMessage) -> Result<ChatMessage> {
        let row = sqlx::query(
            "INSERT INTO messages (ticket_number, sender, message) \
             VALUES ($1, $2, $3) \
             RETURNING id, ticket_number, sender, message, created_at",
        )
        .bind(&new.ticket_number)
        .bind(&new.sender)
        .bind(&new.message)
        .fetch_one(&self.pool)
        .await?;

        map_message(&row)
    }

    async fn list_messages(&self, ticket_number: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT id, ticket_number, sender, message, created_at \
             FROM messages WHERE ticket_number = $1 \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(ticket_number)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_message).collect()
    }
}

#[async_trait]
impl DispatchStore for PostgresStore {
    async fn assign_rescuer(
        &self,
        ticket_id: TicketId,
        rescuer_id: RescuerId,
        rescuer_name: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE tickets SET rescuer_id = $2, rescuer_name = $3, status = 'DISPATCHED' \
             WHERE id = $1",
        )
        .bind(ticket_id.as_i64())
        .bind(rescuer_id.as_i64())
        .bind(rescuer_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE rescuers SET status = 'on-mission' WHERE id = $1")
            .bind(rescuer_id.as_i64())
            .execute(&mut *tx)
            .await?;

        // Dropping the transaction on any error path above rolls back; only
        // this commit makes either half visible.
        tx.commit().await?;

        info!(
            "Dispatched rescuer {} ({}) to ticket {}",
            rescuer_id, rescuer_name, ticket_id
        );
        Ok(())
    }
}
