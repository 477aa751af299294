use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{chat_handlers, rescuer_handlers, ticket_handlers};
use crate::AppState;

/// Assemble the full API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Rescuer accounts
        .route(
            "/api/rescuers",
            post(rescuer_handlers::register_rescuer_handler)
                .get(rescuer_handlers::list_rescuers_handler),
        )
        .route(
            "/api/rescuers/locations",
            get(rescuer_handlers::list_locations_handler),
        )
        .route(
            "/api/rescuers/image/{id}",
            get(rescuer_handlers::rescuer_image_handler),
        )
        .route(
            "/api/rescuers/{id}",
            put(rescuer_handlers::update_rescuer_handler)
                .delete(rescuer_handlers::delete_rescuer_handler),
        )
        // Rescuer session and location
        .route("/api/rescuer/login", post(rescuer_handlers::login_handler))
        .route("/api/rescuer/logout", post(rescuer_handlers::logout_handler))
        .route(
            "/api/rescuer/location",
            post(rescuer_handlers::report_location_handler),
        )
        // Tickets
        .route("/api/ticket", post(ticket_handlers::create_ticket_handler))
        .route("/api/tickets", get(ticket_handlers::list_tickets_handler))
        .route(
            "/api/ticket/status/{ticket_number}",
            get(ticket_handlers::ticket_status_handler),
        )
        .route("/api/ticket/assign", post(ticket_handlers::assign_handler))
        .route(
            "/api/ticket/solve/{id}",
            post(ticket_handlers::solve_ticket_handler),
        )
        // Chat
        .route("/api/chat/send", post(chat_handlers::send_message_handler))
        .route(
            "/api/chat/{ticket_number}",
            get(chat_handlers::list_messages_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
