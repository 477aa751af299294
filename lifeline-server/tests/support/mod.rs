use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use lifeline_core::{AuthCrypto, DispatchService, MemoryStore};
use lifeline_server::{infra::config::Config, routes, AppState};

/// Real router over the in-memory store. The store handle comes back too so
/// tests can inject storage faults.
pub fn build_test_server() -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let crypto = Arc::new(AuthCrypto::new().expect("argon2 parameters"));
    let dispatch = Arc::new(DispatchService::new(store.clone(), crypto));
    let config = Arc::new(Config {
        database_url: "postgres://unused-in-tests".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
    });

    let router = routes::create_router(AppState::new(dispatch, config));
    let server = TestServer::new(router).expect("test server");
    (server, store)
}

pub fn rescuer_form(name: &str, badge: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("badge_id", badge.to_string())
        .add_text("callsign", format!("unit-{badge}"))
        .add_text("phone", "555-0199".to_string())
        .add_text("password", "s3cret".to_string())
}

pub fn rescuer_form_with_image(name: &str, badge: &str, image: Vec<u8>) -> MultipartForm {
    rescuer_form(name, badge).add_part(
        "image",
        Part::bytes(image)
            .file_name("profile.jpg")
            .mime_type("image/jpeg"),
    )
}

pub async fn register_rescuer(server: &TestServer, name: &str, badge: &str) -> i64 {
    let response = server.post("/api/rescuers").multipart(rescuer_form(name, badge)).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_i64().expect("rescuer id")
}

pub async fn create_ticket(server: &TestServer, ticket_number: &str) -> i64 {
    let response = server
        .post("/api/ticket")
        .json(&json!({
            "ticket_number": ticket_number,
            "service": "medical",
            "name": "Jordan Doe",
            "phone": "555-0100",
            "lat": 40.7128,
            "lon": -74.0060,
            "details": "collapsed near the pier"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["id"].as_i64().expect("ticket id")
}

pub async fn assign(server: &TestServer, ticket_id: i64, rescuer_id: i64, rescuer_name: &str) {
    let response = server
        .post("/api/ticket/assign")
        .json(&json!({
            "ticketId": ticket_id,
            "rescuerId": rescuer_id,
            "rescuerName": rescuer_name
        }))
        .await;
    response.assert_status_ok();
}
