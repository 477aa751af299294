use axum::http::StatusCode;
use serde_json::{json, Value};

mod support;

use support::{assign, build_test_server, create_ticket, register_rescuer};

#[tokio::test]
async fn sos_ticket_dispatch_scenario() {
    let (server, _store) = build_test_server();

    let rescuer_id = register_rescuer(&server, "Alex", "B-001").await;
    let ticket_id = create_ticket(&server, "SOS-001").await;
    assign(&server, ticket_id, rescuer_id, "Alex").await;

    let response = server.get("/api/ticket/status/SOS-001").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "DISPATCHED");
    assert_eq!(body["data"]["rescuer_name"], "Alex");

    // The assigned rescuer shows up on-mission in the dispatcher listing.
    let listing: Value = server.get("/api/rescuers").await.json();
    let rescuers = listing["data"].as_array().unwrap();
    assert_eq!(rescuers.len(), 1);
    assert_eq!(rescuers[0]["status"], "on-mission");
}

#[tokio::test]
async fn failed_assignment_leaves_no_partial_state() {
    let (server, store) = build_test_server();

    let rescuer_id = register_rescuer(&server, "Alex", "B-002").await;
    let ticket_id = create_ticket(&server, "SOS-002").await;

    store.fail_next_write();
    let response = server
        .post("/api/ticket/assign")
        .json(&json!({
            "ticketId": ticket_id,
            "rescuerId": rescuer_id,
            "rescuerName": "Alex"
        }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "database error");

    let status: Value = server.get("/api/ticket/status/SOS-002").await.json();
    assert_eq!(status["data"]["status"], "ACTIVE");
    assert!(status["data"].get("rescuer_name").is_none());

    let listing: Value = server.get("/api/rescuers").await.json();
    assert_eq!(listing["data"][0]["status"], "available");
}

#[tokio::test]
async fn solve_is_idempotent_and_hides_the_ticket() {
    let (server, _store) = build_test_server();

    let ticket_id = create_ticket(&server, "SOS-003").await;
    create_ticket(&server, "SOS-004").await;

    server
        .post(&format!("/api/ticket/solve/{ticket_id}"))
        .await
        .assert_status_ok();
    server
        .post(&format!("/api/ticket/solve/{ticket_id}"))
        .await
        .assert_status_ok();

    let status: Value = server.get("/api/ticket/status/SOS-003").await.json();
    assert_eq!(status["data"]["status"], "SOLVED");

    let open: Value = server.get("/api/tickets").await.json();
    let tickets = open["data"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["ticket_number"], "SOS-004");
}

#[tokio::test]
async fn open_tickets_are_listed_newest_first() {
    let (server, _store) = build_test_server();

    create_ticket(&server, "SOS-005").await;
    create_ticket(&server, "SOS-006").await;

    let open: Value = server.get("/api/tickets").await.json();
    let numbers: Vec<&str> = open["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["ticket_number"].as_str().unwrap())
        .collect();
    assert_eq!(numbers, vec!["SOS-006", "SOS-005"]);
}

#[tokio::test]
async fn location_report_derives_status_from_mission_state() {
    let (server, _store) = build_test_server();

    let rescuer_id = register_rescuer(&server, "Sam", "B-003").await;

    let idle: Value = server
        .post("/api/rescuer/location")
        .json(&json!({ "rescuerId": rescuer_id, "lat": 40.0, "lon": -74.0 }))
        .await
        .json();
    assert_eq!(idle["data"]["status"], "available");

    let ticket_id = create_ticket(&server, "SOS-007").await;
    assign(&server, ticket_id, rescuer_id, "Sam").await;

    let responding: Value = server
        .post("/api/rescuer/location")
        .json(&json!({ "rescuerId": rescuer_id, "lat": 40.1, "lon": -74.1 }))
        .await
        .json();
    assert_eq!(responding["data"]["status"], "responding");
}

#[tokio::test]
async fn unknown_ticket_number_is_not_found() {
    let (server, _store) = build_test_server();

    let response = server.get("/api/ticket/status/NOPE-404").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["status"], "error");
}
