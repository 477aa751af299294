use axum::http::StatusCode;
use serde_json::{json, Value};

mod support;

use support::build_test_server;

#[tokio::test]
async fn messages_come_back_in_send_order() {
    let (server, _store) = build_test_server();

    for i in 0..4 {
        let response = server
            .post("/api/chat/send")
            .json(&json!({
                "ticket_number": "SOS-020",
                "sender": if i % 2 == 0 { "dispatcher" } else { "Jordan" },
                "message": format!("message {i}")
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let response = server.get("/api/chat/SOS-020").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message["message"], format!("message {i}"));
    }
}

#[tokio::test]
async fn chat_is_scoped_by_ticket_number() {
    let (server, _store) = build_test_server();

    for number in ["SOS-021", "SOS-022"] {
        server
            .post("/api/chat/send")
            .json(&json!({
                "ticket_number": number,
                "sender": "dispatcher",
                "message": format!("hello {number}")
            }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = server.get("/api/chat/SOS-021").await.json();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["message"], "hello SOS-021");
}

#[tokio::test]
async fn empty_chat_is_an_empty_list() {
    let (server, _store) = build_test_server();

    let body: Value = server.get("/api/chat/SOS-023").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
