use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use lifeline_model::{NewTicket, RescuerId, Ticket, TicketId, TicketStatusView};

use crate::{api_types::ApiResponse, errors::AppResult, AppState};

/// SOS submission payload. Field names match the mobile client's wire
/// format.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub ticket_number: String,
    pub service: String,
    pub name: String,
    pub phone: String,
    pub lat: f64,
    pub lon: f64,
    pub details: String,
}

/// POST /api/ticket — create a ticket.
pub async fn create_ticket_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Ticket>>)> {
    let ticket = state
        .dispatch
        .create_ticket(NewTicket {
            ticket_number: request.ticket_number,
            service_type: request.service,
            user_name: request.name,
            phone: request.phone,
            latitude: request.lat,
            longitude: request.lon,
            incident_details: request.details,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(ticket))))
}

/// GET /api/tickets — non-solved tickets, newest first.
pub async fn list_tickets_handler(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Ticket>>>> {
    let tickets = state.dispatch.list_open_tickets().await?;
    Ok(Json(ApiResponse::success(tickets)))
}

/// GET /api/ticket/status/:ticket_number — poll dispatch status.
pub async fn ticket_status_handler(
    State(state): State<AppState>,
    Path(ticket_number): Path<String>,
) -> AppResult<Json<ApiResponse<TicketStatusView>>> {
    let view = state.dispatch.ticket_status(&ticket_number).await?;
    Ok(Json(ApiResponse::success(view)))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    #[serde(rename = "ticketId")]
    pub ticket_id: TicketId,
    #[serde(rename = "rescuerId")]
    pub rescuer_id: RescuerId,
    #[serde(rename = "rescuerName")]
    pub rescuer_name: String,
}

/// POST /api/ticket/assign — atomic dispatch of a rescuer to a ticket.
pub async fn assign_handler(
    State(state): State<AppState>,
    Json(request): Json<AssignRequest>,
) -> AppResult<StatusCode> {
    state
        .dispatch
        .assign(request.ticket_id, request.rescuer_id, &request.rescuer_name)
        .await?;
    Ok(StatusCode::OK)
}

/// POST /api/ticket/solve/:id — mark solved.
pub async fn solve_ticket_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.dispatch.solve(TicketId(id)).await?;
    Ok(StatusCode::OK)
}
